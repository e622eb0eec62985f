use std::cmp::Ordering;
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::layout::Category;
use crate::protocol::{parse_port, protocol_label_for_key};

/// One poll response from the statistics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    /// Capture duration in seconds.
    pub duration: f64,
    pub total_packets: u64,
    /// Packet counts keyed by port / protocol number.
    #[serde(default)]
    pub protocols: Option<BTreeMap<String, f64>>,
    /// Packet counts keyed by `"<src> → <dst>"`.
    #[serde(default)]
    pub top_connections: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub recent_packets: Option<Vec<RecentPacket>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentPacket {
    pub src_ip: String,
    pub dst_ip: String,
    pub protocol: ProtocolKey,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProtocolKey {
    Number(u64),
    Text(String),
}

impl ProtocolKey {
    pub fn label(&self) -> String {
        match self {
            ProtocolKey::Number(value) => match u32::try_from(*value) {
                Ok(port) => crate::protocol::protocol_label(port),
                Err(_) => format!("Port {value}"),
            },
            ProtocolKey::Text(raw) => protocol_label_for_key(raw),
        }
    }
}

pub fn parse_stats(input: &str) -> Result<StatsPayload> {
    serde_json::from_str(input).context("invalid stats payload")
}

impl StatsPayload {
    /// Protocol shares as chart categories, largest first.
    ///
    /// Ties keep ascending numeric port order; non-numeric keys sort after
    /// numeric ones in key order.
    pub fn protocol_categories(&self) -> Vec<Category> {
        let Some(protocols) = &self.protocols else {
            return Vec::new();
        };
        let mut entries: Vec<(Option<u32>, &String, f64)> = protocols
            .iter()
            .map(|(key, count)| (parse_port(key), key, *count))
            .collect();
        entries.sort_by(|a, b| port_order(a.0, b.0).then_with(|| a.1.cmp(b.1)));
        entries.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
        entries
            .into_iter()
            .map(|(_, key, count)| Category::new(protocol_label_for_key(key), count))
            .collect()
    }

    /// Busiest connections first, at most `limit` of them.
    pub fn connection_entries(&self, limit: usize) -> Vec<(String, f64)> {
        let Some(connections) = &self.top_connections else {
            return Vec::new();
        };
        let mut entries: Vec<(String, f64)> = connections
            .iter()
            .map(|(key, count)| (key.clone(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        entries.truncate(limit);
        entries
    }
}

fn port_order(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
