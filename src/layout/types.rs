use serde::Serialize;

use super::geometry::WedgeDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Which vertical band of the donut a label lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Right half for mid-angles in `[0, π)`, left half otherwise.
    pub fn from_mid_angle(angle: f32) -> Self {
        if angle < std::f32::consts::PI {
            Side::Right
        } else {
            Side::Left
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Side::Right => 1.0,
            Side::Left => -1.0,
        }
    }

    /// Text grows away from the pie.
    pub fn text_anchor(self) -> TextAnchor {
        match self {
            Side::Right => TextAnchor::Start,
            Side::Left => TextAnchor::End,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Resolved vertical position of a label.
///
/// `Overflowed` marks labels that found no free slot in their band and
/// were stacked below everything already placed on that side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "y", rename_all = "lowercase")]
pub enum Placement {
    Placed(f32),
    Overflowed(f32),
}

impl Placement {
    pub fn y(self) -> f32 {
        match self {
            Placement::Placed(y) | Placement::Overflowed(y) => y,
        }
    }

    pub fn is_overflow(self) -> bool {
        matches!(self, Placement::Overflowed(_))
    }
}

/// A label after collision resolution. Coordinates are relative to the
/// donut centre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLabel {
    pub index: usize,
    pub text: String,
    pub value: f64,
    /// Share of the total, one decimal place.
    pub percent: String,
    pub side: Side,
    pub position: Point,
    pub anchor: TextAnchor,
    /// Anchor point, guide point, final label point.
    pub connector: [Point; 3],
    pub placement: Placement,
}

#[derive(Debug, Clone)]
pub struct DonutSlice {
    pub wedge: WedgeDescriptor,
    pub color: String,
    pub label: PlacedLabel,
    /// `" (70.0%)"`, drawn after the name.
    pub share_text: String,
    /// `" 700 pkts"`, drawn on the second line.
    pub count_text: String,
}

#[derive(Debug, Clone)]
pub struct DonutLayout {
    pub width: f32,
    pub height: f32,
    /// Centre of the donut inside the panel.
    pub center: Point,
    pub radius: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub font_size: f32,
    pub detail_font_size: f32,
    pub slices: Vec<DonutSlice>,
}

impl DonutLayout {
    pub fn labels(&self) -> impl Iterator<Item = &PlacedLabel> {
        self.slices.iter().map(|slice| &slice.label)
    }
}

#[derive(Debug, Clone)]
pub struct NoticeLayout {
    pub width: f32,
    pub height: f32,
    pub message: String,
    pub detail: Option<String>,
    pub font_size: f32,
}

#[derive(Debug, Clone)]
pub enum DonutPanel {
    Chart(DonutLayout),
    Notice(NoticeLayout),
}

impl DonutPanel {
    pub fn width(&self) -> f32 {
        match self {
            DonutPanel::Chart(chart) => chart.width,
            DonutPanel::Notice(notice) => notice.width,
        }
    }

    pub fn height(&self) -> f32 {
        match self {
            DonutPanel::Chart(chart) => chart.height,
            DonutPanel::Notice(notice) => notice.height,
        }
    }

    pub fn chart(&self) -> Option<&DonutLayout> {
        match self {
            DonutPanel::Chart(chart) => Some(chart),
            DonutPanel::Notice(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BarLayout {
    pub key: String,
    pub value: f64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
pub struct AxisTick {
    pub position: f32,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct ConnectionsLayout {
    pub width: f32,
    pub height: f32,
    /// Top-left corner of the plot area inside the panel.
    pub plot_origin: Point,
    pub plot_width: f32,
    pub plot_height: f32,
    pub bars: Vec<BarLayout>,
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
    pub color: String,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PacketRow {
    pub source: String,
    pub destination: String,
    pub protocol: String,
    pub time: String,
}

impl PacketRow {
    pub fn cells(&self) -> [&str; 4] {
        [
            self.source.as_str(),
            self.destination.as_str(),
            self.protocol.as_str(),
            self.time.as_str(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct PacketTableLayout {
    pub width: f32,
    pub height: f32,
    pub headers: [&'static str; 4],
    pub column_x: [f32; 4],
    pub row_height: f32,
    pub font_size: f32,
    pub rows: Vec<PacketRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLayout {
    pub width: f32,
    pub height: f32,
    pub duration: String,
    pub total_packets: String,
    pub font_size: f32,
}

/// A panel and where its top-left corner sits in the dashboard.
#[derive(Debug, Clone)]
pub struct Placed<T> {
    pub origin: Point,
    pub panel: T,
}

#[derive(Debug, Clone)]
pub struct DashboardLayout {
    pub width: f32,
    pub height: f32,
    pub summary: Placed<SummaryLayout>,
    pub protocols: Placed<DonutPanel>,
    pub connections: Placed<ConnectionsLayout>,
    pub packets: Option<Placed<PacketTableLayout>>,
}
