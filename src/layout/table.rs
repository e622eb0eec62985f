use std::fmt::Write;

use chrono::{DateTime, Local, TimeZone};

use crate::config::PacketTableConfig;
use crate::stats::{RecentPacket, StatsPayload};

use super::text::text_width;
use super::{PacketRow, PacketTableLayout, SummaryLayout};

const HEADERS: [&str; 4] = ["Source", "Destination", "Protocol", "Time"];

/// Epoch seconds rendered in `tz`. Out-of-range timestamps and unusable
/// format strings print as `-`.
pub fn format_timestamp<Tz: TimeZone>(timestamp: f64, tz: &Tz, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if !timestamp.is_finite() {
        return "-".to_string();
    }
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9).round().min(999_999_999.0) as u32;
    let Some(utc) = DateTime::from_timestamp(secs as i64, nanos) else {
        return "-".to_string();
    };
    let mut out = String::new();
    match write!(out, "{}", utc.with_timezone(tz).format(format)) {
        Ok(()) => out,
        Err(_) => "-".to_string(),
    }
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub(super) fn packet_rows<Tz: TimeZone>(
    packets: &[RecentPacket],
    tz: &Tz,
    config: &PacketTableConfig,
) -> Vec<PacketRow>
where
    Tz::Offset: std::fmt::Display,
{
    packets
        .iter()
        .take(config.max_rows)
        .map(|packet| PacketRow {
            source: packet.src_ip.clone(),
            destination: packet.dst_ip.clone(),
            protocol: packet.protocol.label(),
            time: format_timestamp(packet.timestamp, tz, &config.time_format),
        })
        .collect()
}

pub(super) fn compute_packet_table(
    rows: Vec<PacketRow>,
    config: &PacketTableConfig,
) -> PacketTableLayout {
    let mut widths = HEADERS.map(|header| text_width(header, config.font_size));
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = width.max(text_width(cell, config.font_size));
        }
    }

    let mut column_x = [0.0_f32; 4];
    let mut cursor = config.column_padding / 2.0;
    for (x, width) in column_x.iter_mut().zip(widths) {
        *x = cursor;
        cursor += width + config.column_padding;
    }

    PacketTableLayout {
        width: cursor - config.column_padding / 2.0,
        height: config.row_height * (rows.len() + 1) as f32,
        headers: HEADERS,
        column_x,
        row_height: config.row_height,
        font_size: config.font_size,
        rows,
    }
}

pub(super) fn compute_summary(payload: &StatsPayload, height: f32, font_size: f32) -> SummaryLayout {
    let duration = if payload.duration.is_finite() && payload.duration > 0.0 {
        format!("{}s", payload.duration.floor() as u64)
    } else {
        "0s".to_string()
    };
    let total_packets = group_thousands(payload.total_packets);
    let width = text_width(&format!("Duration: {duration}"), font_size)
        + text_width(&format!("Total packets: {total_packets}"), font_size)
        + font_size * 3.0;
    SummaryLayout {
        width,
        height,
        duration,
        total_packets,
        font_size,
    }
}

/// Rows for the local timezone, as the dashboard shows them.
pub(super) fn local_packet_rows(packets: &[RecentPacket], config: &PacketTableConfig) -> Vec<PacketRow> {
    packet_rows(packets, &Local, config)
}
