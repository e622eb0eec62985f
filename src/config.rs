use crate::theme::Theme;
use anyhow::bail;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonutConfig {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub inner_ratio: f32,
    pub outer_ratio: f32,
    pub guide_ratio: f32,
    pub label_height: f32,
    pub label_gap: f32,
    pub label_offset_ratio: f32,
    pub font_size: f32,
    pub detail_font_size: f32,
    pub detail_offset_x: f32,
    pub connector_color: String,
    pub connector_width: f32,
    pub wedge_stroke: String,
    pub wedge_stroke_width: f32,
    pub empty_message: String,
}

impl DonutConfig {
    pub fn radius(&self) -> f32 {
        let usable = (self.width - self.margin * 2.0).min(self.height - self.margin * 2.0);
        (usable / 2.0).max(1.0)
    }
}

impl Default for DonutConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 500.0,
            margin: 100.0,
            inner_ratio: 0.5,
            outer_ratio: 0.8,
            guide_ratio: 0.9,
            label_height: 40.0,
            label_gap: 10.0,
            label_offset_ratio: 0.85,
            font_size: 12.0,
            detail_font_size: 10.0,
            detail_offset_x: 5.0,
            connector_color: "#666".to_string(),
            connector_width: 1.0,
            wedge_stroke: "white".to_string(),
            wedge_stroke_width: 2.0,
            empty_message: "No protocol data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsConfig {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub band_padding: f32,
    pub max_bars: usize,
    pub tick_count: usize,
    pub bar_color: String,
    pub axis_color: String,
    pub font_size: f32,
    pub label_rotation: f32,
}

impl Default for ConnectionsConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 300.0,
            margin_top: 20.0,
            margin_right: 20.0,
            margin_bottom: 60.0,
            margin_left: 60.0,
            band_padding: 0.1,
            max_bars: 10,
            tick_count: 10,
            bar_color: "#4f46e5".to_string(),
            axis_color: "#333333".to_string(),
            font_size: 10.0,
            label_rotation: -45.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketTableConfig {
    pub row_height: f32,
    pub font_size: f32,
    pub column_padding: f32,
    pub max_rows: usize,
    pub time_format: String,
    pub header_fill: String,
}

impl Default for PacketTableConfig {
    fn default() -> Self {
        Self {
            row_height: 22.0,
            font_size: 12.0,
            column_padding: 24.0,
            max_rows: 50,
            time_format: "%H:%M:%S".to_string(),
            header_fill: "#F3F4F6".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub padding: f32,
    pub panel_spacing: f32,
    pub summary_height: f32,
    pub summary_font_size: f32,
    pub donut: DonutConfig,
    pub connections: ConnectionsConfig,
    pub packets: PacketTableConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 16.0,
            panel_spacing: 24.0,
            summary_height: 40.0,
            summary_font_size: 16.0,
            donut: DonutConfig::default(),
            connections: ConnectionsConfig::default(),
            packets: PacketTableConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    pub endpoint: String,
    pub interval_ms: u64,
    pub timeout_ms: u64,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/api/stats".to_string(),
            interval_ms: 1000,
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub poll: PollConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::dashboard_default();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
            poll: PollConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    text_color: Option<String>,
    muted_text_color: Option<String>,
    line_color: Option<String>,
    panel_background: Option<String>,
    panel_border: Option<String>,
    background: Option<String>,
    pie_colors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DonutConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<f32>,
    inner_ratio: Option<f32>,
    outer_ratio: Option<f32>,
    guide_ratio: Option<f32>,
    label_height: Option<f32>,
    label_gap: Option<f32>,
    label_offset_ratio: Option<f32>,
    font_size: Option<f32>,
    detail_font_size: Option<f32>,
    connector_color: Option<String>,
    empty_message: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConnectionsConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    band_padding: Option<f32>,
    max_bars: Option<usize>,
    tick_count: Option<usize>,
    bar_color: Option<String>,
    font_size: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PacketTableConfigFile {
    row_height: Option<f32>,
    font_size: Option<f32>,
    max_rows: Option<usize>,
    time_format: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PollConfigFile {
    endpoint: Option<String>,
    interval_ms: Option<u64>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    donut: Option<DonutConfigFile>,
    connections: Option<ConnectionsConfigFile>,
    packets: Option<PacketTableConfigFile>,
    poll: Option<PollConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "default" || theme_name == "dashboard" {
            config.theme = Theme::dashboard_default();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.muted_text_color {
            config.theme.muted_text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.panel_background {
            config.theme.panel_background = v;
        }
        if let Some(v) = vars.panel_border {
            config.theme.panel_border = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.pie_colors.filter(|colors| !colors.is_empty()) {
            config.theme.pie_colors = v;
        }
    }

    if let Some(donut) = parsed.donut {
        let cfg = &mut config.layout.donut;
        if let Some(v) = donut.width {
            cfg.width = v;
        }
        if let Some(v) = donut.height {
            cfg.height = v;
        }
        if let Some(v) = donut.margin {
            cfg.margin = v;
        }
        if let Some(v) = donut.inner_ratio {
            cfg.inner_ratio = v;
        }
        if let Some(v) = donut.outer_ratio {
            cfg.outer_ratio = v;
        }
        if let Some(v) = donut.guide_ratio {
            cfg.guide_ratio = v;
        }
        if let Some(v) = donut.label_height {
            cfg.label_height = v;
        }
        if let Some(v) = donut.label_gap {
            cfg.label_gap = v;
        }
        if let Some(v) = donut.label_offset_ratio {
            cfg.label_offset_ratio = v;
        }
        if let Some(v) = donut.font_size {
            cfg.font_size = v;
        }
        if let Some(v) = donut.detail_font_size {
            cfg.detail_font_size = v;
        }
        if let Some(v) = donut.connector_color {
            cfg.connector_color = v;
        }
        if let Some(v) = donut.empty_message {
            cfg.empty_message = v;
        }
    }

    if let Some(connections) = parsed.connections {
        let cfg = &mut config.layout.connections;
        if let Some(v) = connections.width {
            cfg.width = v;
        }
        if let Some(v) = connections.height {
            cfg.height = v;
        }
        if let Some(v) = connections.band_padding {
            cfg.band_padding = v.clamp(0.0, 0.99);
        }
        if let Some(v) = connections.max_bars {
            cfg.max_bars = v;
        }
        if let Some(v) = connections.tick_count {
            cfg.tick_count = v.max(1);
        }
        if let Some(v) = connections.bar_color {
            cfg.bar_color = v;
        }
        if let Some(v) = connections.font_size {
            cfg.font_size = v;
        }
    }

    if let Some(packets) = parsed.packets {
        let cfg = &mut config.layout.packets;
        if let Some(v) = packets.row_height {
            cfg.row_height = v;
        }
        if let Some(v) = packets.font_size {
            cfg.font_size = v;
        }
        if let Some(v) = packets.max_rows {
            cfg.max_rows = v;
        }
        if let Some(v) = packets.time_format {
            cfg.time_format = v;
        }
    }

    if let Some(poll) = parsed.poll {
        if let Some(v) = poll.endpoint {
            config.poll.endpoint = v;
        }
        if let Some(v) = poll.interval_ms {
            config.poll.interval_ms = v;
        }
        if let Some(v) = poll.timeout_ms {
            config.poll.timeout_ms = v;
        }
    }

    config.render.background = config.theme.background.clone();

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> anyhow::Result<()> {
    let donut = &config.layout.donut;
    let step = donut.label_height + donut.label_gap;
    if !(step > 0.0) {
        bail!(
            "labelHeight + labelGap must be positive, got {} + {}",
            donut.label_height,
            donut.label_gap
        );
    }
    let time_format = &config.layout.packets.time_format;
    if StrftimeItems::new(time_format).any(|item| matches!(item, Item::Error)) {
        bail!("invalid packets.timeFormat {time_format:?}");
    }
    Ok(())
}
