use crate::stats::{StatsPayload, parse_stats};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

/// Somewhere a stats snapshot can be fetched from, once per tick.
pub trait StatsSource {
    fn describe(&self) -> String;
    fn fetch(&mut self) -> Result<StatsPayload>;
}

impl<S: StatsSource + ?Sized> StatsSource for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn fetch(&mut self) -> Result<StatsPayload> {
        (**self).fetch()
    }
}

/// `GET` against the stats endpoint with a bounded timeout.
#[cfg(feature = "http")]
pub struct HttpSource {
    endpoint: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[cfg(feature = "http")]
impl StatsSource for HttpSource {
    fn describe(&self) -> String {
        self.endpoint.clone()
    }

    fn fetch(&mut self) -> Result<StatsPayload> {
        self.client
            .get(&self.endpoint)
            .send()?
            .error_for_status()?
            .json::<StatsPayload>()
            .context("invalid stats payload")
    }
}

/// Re-reads a JSON snapshot from disk every tick.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StatsSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&mut self) -> Result<StatsPayload> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        parse_stats(&contents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered,
    FetchFailed,
    RenderFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub ticks: u64,
    pub successes: u64,
    pub failures: u64,
}

/// Fixed-rate refresh loop. Ticks run one after another on the calling
/// thread, so a slow fetch delays the next tick instead of overlapping it.
/// A failed tick is logged and leaves the previous output in place.
pub struct Poller<S> {
    source: S,
    interval: Duration,
    stats: PollStats,
}

impl<S: StatsSource> Poller<S> {
    pub fn new(source: S, interval: Duration) -> Self {
        Self {
            source,
            interval,
            stats: PollStats::default(),
        }
    }

    pub fn stats(&self) -> PollStats {
        self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn tick<F>(&mut self, on_payload: &mut F) -> TickOutcome
    where
        F: FnMut(&StatsPayload) -> Result<()>,
    {
        self.stats.ticks += 1;
        let payload = match self.source.fetch() {
            Ok(payload) => payload,
            Err(err) => {
                self.stats.failures += 1;
                tracing::warn!(
                    source = %self.source.describe(),
                    error = %format!("{err:#}"),
                    "failed to fetch stats"
                );
                return TickOutcome::FetchFailed;
            }
        };

        match on_payload(&payload) {
            Ok(()) => {
                self.stats.successes += 1;
                tracing::debug!(
                    tick = self.stats.ticks,
                    total_packets = payload.total_packets,
                    "dashboard refreshed"
                );
                TickOutcome::Rendered
            }
            Err(err) => {
                self.stats.failures += 1;
                tracing::warn!(error = %format!("{err:#}"), "failed to render dashboard");
                TickOutcome::RenderFailed
            }
        }
    }

    /// Tick until `max_ticks` have run, or forever when `None`.
    pub fn run<F>(&mut self, max_ticks: Option<u64>, mut on_payload: F) -> PollStats
    where
        F: FnMut(&StatsPayload) -> Result<()>,
    {
        tracing::info!(
            source = %self.source.describe(),
            interval_ms = self.interval.as_millis() as u64,
            "polling started"
        );
        let mut next = Instant::now();
        loop {
            self.tick(&mut on_payload);
            if max_ticks.is_some_and(|max| self.stats.ticks >= max) {
                break;
            }
            next += self.interval;
            let now = Instant::now();
            if next > now {
                thread::sleep(next - now);
            } else {
                // Fell behind; restart the schedule rather than bursting.
                next = now;
            }
        }
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct ScriptedSource {
        script: VecDeque<Result<StatsPayload, String>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<u64, &str>>) -> Self {
            let script = script
                .into_iter()
                .map(|step| {
                    step.map(|total| StatsPayload {
                        duration: 1.0,
                        total_packets: total,
                        protocols: None,
                        top_connections: None,
                        recent_packets: None,
                    })
                    .map_err(str::to_string)
                })
                .collect();
            Self { script }
        }
    }

    impl StatsSource for ScriptedSource {
        fn describe(&self) -> String {
            "scripted".to_string()
        }

        fn fetch(&mut self) -> Result<StatsPayload> {
            match self.script.pop_front() {
                Some(Ok(payload)) => Ok(payload),
                Some(Err(message)) => Err(anyhow::anyhow!(message)),
                None => Err(anyhow::anyhow!("script exhausted")),
            }
        }
    }

    #[test]
    fn failures_do_not_stop_the_loop() {
        let source = ScriptedSource::new(vec![Err("refused"), Err("timeout"), Ok(42)]);
        let mut poller = Poller::new(source, Duration::ZERO);
        let mut rendered = Vec::new();
        let stats = poller.run(Some(3), |payload| {
            rendered.push(payload.total_packets);
            Ok(())
        });
        assert_eq!(stats, PollStats {
            ticks: 3,
            successes: 1,
            failures: 2
        });
        assert_eq!(rendered, vec![42]);
    }

    #[test]
    fn last_output_reflects_last_success() {
        let source = ScriptedSource::new(vec![Ok(1), Err("boom"), Ok(3), Err("boom")]);
        let mut poller = Poller::new(source, Duration::ZERO);
        let mut output = None;
        poller.run(Some(4), |payload| {
            output = Some(payload.total_packets);
            Ok(())
        });
        assert_eq!(output, Some(3));
    }

    #[test]
    fn render_errors_are_counted() {
        let source = ScriptedSource::new(vec![Ok(1)]);
        let mut poller = Poller::new(source, Duration::ZERO);
        let outcome = poller.tick(&mut |_: &StatsPayload| Err(anyhow::anyhow!("disk full")));
        assert_eq!(outcome, TickOutcome::RenderFailed);
        assert_eq!(poller.stats().failures, 1);
        let outcome = poller.tick(&mut |_: &StatsPayload| Ok(()));
        assert_eq!(outcome, TickOutcome::FetchFailed);
    }

    #[test]
    fn file_source_rereads_each_tick() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let mut source = FileSource::new(&path);
        assert!(source.fetch().is_err());

        std::fs::write(&path, r#"{"duration": 1, "total_packets": 5}"#).unwrap();
        assert_eq!(source.fetch().unwrap().total_packets, 5);
        std::fs::write(&path, r#"{"duration": 2, "total_packets": 9}"#).unwrap();
        assert_eq!(source.fetch().unwrap().total_packets, 9);
        std::fs::write(&path, "not json").unwrap();
        assert!(source.fetch().is_err());
    }

    /// Serves one canned HTTP/1.1 response per entry, then stops.
    #[cfg(feature = "http")]
    fn serve(responses: Vec<(&'static str, &'static str)>) -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });
        format!("http://{addr}/api/stats")
    }

    #[cfg(feature = "http")]
    #[test]
    fn http_source_decodes_json_and_rejects_errors() {
        let endpoint = serve(vec![
            ("200 OK", r#"{"duration": 3, "total_packets": 7, "protocols": {"6": 7}}"#),
            ("500 Internal Server Error", r#"{"error": "capture stopped"}"#),
            ("200 OK", "not json"),
        ]);
        let mut source = HttpSource::new(&endpoint, Duration::from_secs(5)).unwrap();
        assert_eq!(source.describe(), endpoint);

        let payload = source.fetch().unwrap();
        assert_eq!(payload.total_packets, 7);
        assert_eq!(payload.protocol_categories()[0].label, "TCP (6)");

        assert!(source.fetch().is_err());
        let err = source.fetch().unwrap_err();
        assert!(format!("{err:#}").contains("invalid stats payload"));
    }
}
