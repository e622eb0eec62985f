use crate::layout::{DashboardLayout, DonutPanel, Placement, Side, TextAnchor};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub donut: Option<DonutDump>,
    pub notice: Option<String>,
    pub bars: Vec<BarDump>,
    pub packet_rows: usize,
}

#[derive(Debug, Serialize)]
pub struct DonutDump {
    pub center: [f32; 2],
    pub radius: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub labels: Vec<LabelDump>,
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub index: usize,
    pub text: String,
    pub percent: String,
    pub side: Side,
    pub anchor: TextAnchor,
    pub x: f32,
    pub y: f32,
    pub placement: Placement,
    pub overflow: bool,
    pub connector: Vec<[f32; 2]>,
    pub start_angle: f32,
    pub end_angle: f32,
}

#[derive(Debug, Serialize)]
pub struct BarDump {
    pub key: String,
    pub value: f64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutDump {
    pub fn from_layout(layout: &DashboardLayout) -> Self {
        let (donut, notice) = match &layout.protocols.panel {
            DonutPanel::Chart(chart) => {
                let labels = chart
                    .slices
                    .iter()
                    .map(|slice| LabelDump {
                        index: slice.label.index,
                        text: slice.label.text.clone(),
                        percent: slice.label.percent.clone(),
                        side: slice.label.side,
                        anchor: slice.label.anchor,
                        x: slice.label.position.x,
                        y: slice.label.position.y,
                        placement: slice.label.placement,
                        overflow: slice.label.placement.is_overflow(),
                        connector: slice.label.connector.iter().map(|p| [p.x, p.y]).collect(),
                        start_angle: slice.wedge.start_angle,
                        end_angle: slice.wedge.end_angle,
                    })
                    .collect();
                let donut = DonutDump {
                    center: [chart.center.x, chart.center.y],
                    radius: chart.radius,
                    inner_radius: chart.inner_radius,
                    outer_radius: chart.outer_radius,
                    labels,
                };
                (Some(donut), None)
            }
            DonutPanel::Notice(notice) => (None, Some(notice.message.clone())),
        };

        let bars = layout
            .connections
            .panel
            .bars
            .iter()
            .map(|bar| BarDump {
                key: bar.key.clone(),
                value: bar.value,
                x: bar.x,
                y: bar.y,
                width: bar.width,
                height: bar.height,
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            donut,
            notice,
            bars,
            packet_rows: layout
                .packets
                .as_ref()
                .map(|table| table.panel.rows.len())
                .unwrap_or(0),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &DashboardLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
