mod bars;
mod error;
pub mod geometry;
pub mod label_placement;
mod pie;
mod table;
mod text;
pub(crate) mod types;
pub use error::LayoutError;
pub use geometry::{Category, DonutGeometry, GeometryProvider, WedgeDescriptor};
pub use label_placement::{LabelParams, layout_labels};
pub use pie::format_count;
pub use table::{format_timestamp, group_thousands};
pub use types::*;
use bars::*;
use error::*;
use pie::*;
use table::*;

use crate::config::LayoutConfig;
use crate::stats::StatsPayload;
use crate::theme::Theme;

/// Lay out every panel of the dashboard for one poll tick.
///
/// The protocol donut falls back to a notice when its categories are
/// rejected; the other panels always render.
pub fn compute_dashboard_layout(
    payload: &StatsPayload,
    theme: &Theme,
    config: &LayoutConfig,
) -> DashboardLayout {
    let rows = payload
        .recent_packets
        .as_deref()
        .map(|packets| local_packet_rows(packets, &config.packets));
    assemble_dashboard(payload, rows, theme, config)
}

/// Same as [`compute_dashboard_layout`] with packet times rendered in `tz`.
pub fn compute_dashboard_layout_in<Tz: chrono::TimeZone>(
    payload: &StatsPayload,
    tz: &Tz,
    theme: &Theme,
    config: &LayoutConfig,
) -> DashboardLayout
where
    Tz::Offset: std::fmt::Display,
{
    let rows = payload
        .recent_packets
        .as_deref()
        .map(|packets| packet_rows(packets, tz, &config.packets));
    assemble_dashboard(payload, rows, theme, config)
}

/// Protocol donut on its own, for callers that only want the chart.
pub fn compute_protocol_layout(
    categories: &[Category],
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<DonutLayout, LayoutError> {
    compute_donut_layout(categories, theme, &config.donut)
}

fn assemble_dashboard(
    payload: &StatsPayload,
    rows: Option<Vec<PacketRow>>,
    theme: &Theme,
    config: &LayoutConfig,
) -> DashboardLayout {
    let summary = compute_summary(payload, config.summary_height, config.summary_font_size);

    let categories = payload.protocol_categories();
    let protocols = match compute_donut_layout(&categories, theme, &config.donut) {
        Ok(chart) => DonutPanel::Chart(chart),
        Err(err) => {
            match err {
                LayoutError::Empty | LayoutError::ZeroTotal => {
                    tracing::debug!(error = %err, "no protocol data to chart");
                }
                _ => tracing::warn!(error = %err, "protocol chart rejected"),
            }
            DonutPanel::Notice(compute_notice_layout(&err, &config.donut))
        }
    };

    let entries = payload.connection_entries(config.connections.max_bars);
    let connections = compute_connections_layout(&entries, &config.connections);
    let packets = rows.map(|rows| compute_packet_table(rows, &config.packets));

    let pad = config.padding;
    let spacing = config.panel_spacing;
    let mut cursor = pad;
    let summary = Placed {
        origin: Point::new(pad, cursor),
        panel: summary,
    };
    cursor += summary.panel.height + spacing;
    let protocols = Placed {
        origin: Point::new(pad, cursor),
        panel: protocols,
    };
    cursor += protocols.panel.height() + spacing;
    let connections = Placed {
        origin: Point::new(pad, cursor),
        panel: connections,
    };
    cursor += connections.panel.height;
    let packets = packets.map(|table| {
        cursor += spacing;
        let placed = Placed {
            origin: Point::new(pad, cursor),
            panel: table,
        };
        cursor += placed.panel.height;
        placed
    });

    let content_width = [
        summary.panel.width,
        protocols.panel.width(),
        connections.panel.width,
        packets.as_ref().map(|p| p.panel.width).unwrap_or(0.0),
    ]
    .into_iter()
    .fold(0.0_f32, f32::max);

    DashboardLayout {
        width: content_width + pad * 2.0,
        height: cursor + pad,
        summary,
        protocols,
        connections,
        packets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::parse_stats;
    use chrono::Utc;

    fn payload(json: &str) -> StatsPayload {
        parse_stats(json).unwrap()
    }

    #[test]
    fn panels_stack_vertically() {
        let payload = payload(
            r#"{"duration": 3.2, "total_packets": 10,
                "protocols": {"6": 7, "17": 3},
                "top_connections": {"a → b": 4},
                "recent_packets": [{"src_ip": "a", "dst_ip": "b", "protocol": 6, "timestamp": 0}]}"#,
        );
        let config = LayoutConfig::default();
        let layout =
            compute_dashboard_layout_in(&payload, &Utc, &Theme::dashboard_default(), &config);
        assert!(layout.protocols.panel.chart().is_some());
        assert!(layout.protocols.origin.y > layout.summary.origin.y);
        assert!(layout.connections.origin.y > layout.protocols.origin.y);
        let packets = layout.packets.as_ref().unwrap();
        assert!(packets.origin.y > layout.connections.origin.y);
        assert_eq!(packets.panel.rows[0].time, "00:00:00");
        assert!(layout.height >= packets.origin.y + packets.panel.height);
        assert!(layout.width >= 600.0 + config.padding * 2.0);
    }

    #[test]
    fn empty_protocols_render_notice() {
        let payload = payload(r#"{"duration": 0, "total_packets": 0, "protocols": {}}"#);
        let layout = compute_dashboard_layout(
            &payload,
            &Theme::dashboard_default(),
            &LayoutConfig::default(),
        );
        match &layout.protocols.panel {
            DonutPanel::Notice(notice) => assert_eq!(notice.message, "No protocol data"),
            DonutPanel::Chart(_) => panic!("expected notice"),
        }
        assert!(layout.packets.is_none());
    }

    #[test]
    fn zero_counts_render_notice() {
        let payload = payload(r#"{"duration": 1, "total_packets": 0, "protocols": {"6": 0}}"#);
        let layout = compute_dashboard_layout(
            &payload,
            &Theme::dashboard_default(),
            &LayoutConfig::default(),
        );
        assert!(layout.protocols.panel.chart().is_none());
    }
}
