use crate::config::{Config, LayoutConfig, RenderConfig};
use crate::layout::geometry::polar;
use crate::layout::{
    ConnectionsLayout, DashboardLayout, DonutLayout, DonutPanel, NoticeLayout, PacketTableLayout,
    SummaryLayout, compute_dashboard_layout,
};
use crate::stats::StatsPayload;
use crate::theme::Theme;
use anyhow::Result;
use std::f32::consts::{PI, TAU};
use std::io::Write;
use std::path::Path;

const FULL_TURN_EPS: f32 = 1e-4;
const PANEL_INSET: f32 = 8.0;
const PANEL_RADIUS: f32 = 8.0;

/// Lay out and render one payload as a complete SVG document.
pub fn render_dashboard(payload: &StatsPayload, config: &Config) -> String {
    let layout = compute_dashboard_layout(payload, &config.theme, &config.layout);
    render_svg(&layout, &config.theme, &config.layout)
}

/// Render a complete document. Output depends only on the arguments, so
/// rendering the same layout twice yields identical bytes.
pub fn render_svg(layout: &DashboardLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width.max(200.0);
    let height = layout.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    let mut frames = vec![
        (layout.protocols.origin, layout.protocols.panel.width(), layout.protocols.panel.height()),
        (
            layout.connections.origin,
            layout.connections.panel.width,
            layout.connections.panel.height,
        ),
    ];
    if let Some(packets) = &layout.packets {
        frames.push((packets.origin, packets.panel.width, packets.panel.height));
    }
    for (origin, w, h) in frames {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{PANEL_RADIUS}\" fill=\"{}\" stroke=\"{}\"/>",
            origin.x - PANEL_INSET,
            origin.y - PANEL_INSET,
            w + PANEL_INSET * 2.0,
            h + PANEL_INSET * 2.0,
            theme.panel_background,
            theme.panel_border
        ));
    }

    let origin = layout.summary.origin;
    svg.push_str(&format!(
        "<g class=\"summary\" transform=\"translate({:.2},{:.2})\">",
        origin.x, origin.y
    ));
    svg.push_str(&summary_svg(&layout.summary.panel, theme));
    svg.push_str("</g>");

    let origin = layout.protocols.origin;
    svg.push_str(&format!(
        "<g class=\"protocol-chart\" transform=\"translate({:.2},{:.2})\">",
        origin.x, origin.y
    ));
    match &layout.protocols.panel {
        DonutPanel::Chart(chart) => svg.push_str(&donut_svg(chart, theme, config)),
        DonutPanel::Notice(notice) => svg.push_str(&notice_svg(notice, theme)),
    }
    svg.push_str("</g>");

    let origin = layout.connections.origin;
    svg.push_str(&format!(
        "<g class=\"connections-chart\" transform=\"translate({:.2},{:.2})\">",
        origin.x, origin.y
    ));
    svg.push_str(&connections_svg(&layout.connections.panel, theme, config));
    svg.push_str("</g>");

    if let Some(packets) = &layout.packets {
        svg.push_str(&format!(
            "<g class=\"packet-table\" transform=\"translate({:.2},{:.2})\">",
            packets.origin.x, packets.origin.y
        ));
        svg.push_str(&table_svg(&packets.panel, theme, config));
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

fn summary_svg(summary: &SummaryLayout, theme: &Theme) -> String {
    let baseline = summary.height / 2.0 + summary.font_size * 0.35;
    format!(
        "<text x=\"0\" y=\"{baseline:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\"><tspan font-weight=\"bold\">Duration:</tspan><tspan> {}</tspan><tspan dx=\"{:.2}\" font-weight=\"bold\">Total packets:</tspan><tspan> {}</tspan></text>",
        escape_xml(&theme.font_family),
        summary.font_size,
        theme.text_color,
        escape_xml(&summary.duration),
        summary.font_size * 2.0,
        escape_xml(&summary.total_packets),
    )
}

fn donut_svg(chart: &DonutLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let donut = &config.donut;
    let mut svg = String::new();
    svg.push_str(&format!(
        "<g transform=\"translate({:.2},{:.2})\">",
        chart.center.x, chart.center.y
    ));

    for slice in &chart.slices {
        svg.push_str("<g>");
        if let Some(d) = ring_segment_path(
            slice.wedge.start_angle,
            slice.wedge.end_angle,
            chart.inner_radius,
            chart.outer_radius,
        ) {
            svg.push_str(&format!(
                "<path d=\"{d}\" fill=\"{}\" fill-rule=\"evenodd\" stroke=\"{}\" stroke-width=\"{}\"/>",
                slice.color, donut.wedge_stroke, donut.wedge_stroke_width
            ));
        }

        let label = &slice.label;
        svg.push_str(&format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            points_attr(&label.connector.map(|p| (p.x, p.y))),
            donut.connector_color,
            donut.connector_width
        ));

        let detail_x = donut.detail_offset_x * label.side.sign();
        svg.push_str(&format!(
            "<text transform=\"translate({:.2},{:.2})\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
            label.position.x,
            label.position.y,
            label.anchor.as_str(),
            escape_xml(&theme.font_family),
            chart.font_size,
            theme.text_color
        ));
        svg.push_str(&format!(
            "<tspan font-weight=\"bold\">{}</tspan>",
            escape_xml(&label.text)
        ));
        svg.push_str(&format!(
            "<tspan font-size=\"{}\">{}</tspan>",
            chart.detail_font_size,
            escape_xml(&slice.share_text)
        ));
        svg.push_str(&format!(
            "<tspan x=\"{detail_x:.2}\" dy=\"1.2em\" font-size=\"{}\">{}</tspan>",
            chart.detail_font_size,
            escape_xml(&slice.count_text)
        ));
        svg.push_str("</text>");
        svg.push_str("</g>");
    }

    svg.push_str("</g>");
    svg
}

fn notice_svg(notice: &NoticeLayout, theme: &Theme) -> String {
    let cx = notice.width / 2.0;
    let cy = notice.height / 2.0;
    let mut svg = format!(
        "<text x=\"{cx:.2}\" y=\"{cy:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        escape_xml(&theme.font_family),
        notice.font_size,
        theme.muted_text_color,
        escape_xml(&notice.message)
    );
    if let Some(detail) = &notice.detail {
        let y = cy + notice.font_size * 1.5;
        svg.push_str(&format!(
            "<text x=\"{cx:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            notice.font_size * 0.85,
            theme.muted_text_color,
            escape_xml(detail)
        ));
    }
    svg
}

fn connections_svg(chart: &ConnectionsLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let axis_color = &config.connections.axis_color;
    let rotation = config.connections.label_rotation;
    let font = escape_xml(&theme.font_family);
    let mut svg = String::new();
    svg.push_str(&format!(
        "<g transform=\"translate({:.2},{:.2})\">",
        chart.plot_origin.x, chart.plot_origin.y
    ));

    for bar in &chart.bars {
        svg.push_str(&format!(
            "<rect class=\"bar\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"><title>{}: {}</title></rect>",
            bar.x,
            bar.y,
            bar.width,
            bar.height,
            chart.color,
            escape_xml(&bar.key),
            crate::layout::format_count(bar.value)
        ));
    }

    // Bottom axis.
    svg.push_str(&format!(
        "<g transform=\"translate(0,{:.2})\"><path d=\"M 0 0.5 H {:.2}\" stroke=\"{axis_color}\" fill=\"none\"/>",
        chart.plot_height, chart.plot_width
    ));
    for tick in &chart.x_ticks {
        svg.push_str(&format!(
            "<line x1=\"{x:.2}\" x2=\"{x:.2}\" y1=\"0\" y2=\"6\" stroke=\"{axis_color}\"/><text transform=\"translate({x:.2},9) rotate({rotation})\" dy=\"0.71em\" text-anchor=\"end\" font-family=\"{font}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            chart.font_size,
            theme.text_color,
            escape_xml(&tick.label),
            x = tick.position,
        ));
    }
    svg.push_str("</g>");

    // Left axis.
    svg.push_str(&format!(
        "<g><path d=\"M -0.5 0 V {:.2}\" stroke=\"{axis_color}\" fill=\"none\"/>",
        chart.plot_height
    ));
    for tick in &chart.y_ticks {
        svg.push_str(&format!(
            "<line x1=\"-6\" x2=\"0\" y1=\"{y:.2}\" y2=\"{y:.2}\" stroke=\"{axis_color}\"/><text x=\"-9\" y=\"{y:.2}\" dy=\"0.32em\" text-anchor=\"end\" font-family=\"{font}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            chart.font_size,
            theme.text_color,
            escape_xml(&tick.label),
            y = tick.position,
        ));
    }
    svg.push_str("</g>");

    svg.push_str("</g>");
    svg
}

fn table_svg(table: &PacketTableLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let font = escape_xml(&theme.font_family);
    let baseline = table.row_height / 2.0 + table.font_size * 0.35;
    let mut svg = String::new();
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
        table.width, table.row_height, config.packets.header_fill
    ));
    for (x, header) in table.column_x.iter().zip(table.headers) {
        svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{baseline:.2}\" font-family=\"{font}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            table.font_size,
            theme.text_color,
            escape_xml(header)
        ));
    }
    for (idx, row) in table.rows.iter().enumerate() {
        let top = table.row_height * (idx + 1) as f32;
        svg.push_str(&format!(
            "<line x1=\"0\" x2=\"{:.2}\" y1=\"{top:.2}\" y2=\"{top:.2}\" stroke=\"{}\"/>",
            table.width, theme.panel_border
        ));
        let y = top + baseline;
        for (x, cell) in table.column_x.iter().zip(row.cells()) {
            svg.push_str(&format!(
                "<text x=\"{x:.2}\" y=\"{y:.2}\" font-family=\"{font}\" font-size=\"{}\" fill=\"{}\">{}</text>",
                table.font_size,
                theme.text_color,
                escape_xml(cell)
            ));
        }
    }
    svg
}

/// Path for the ring segment between two angles. `None` for empty wedges.
fn ring_segment_path(start: f32, end: f32, inner: f32, outer: f32) -> Option<String> {
    let span = end - start;
    if span <= 0.0 {
        return None;
    }
    if span >= TAU - FULL_TURN_EPS {
        let mut d = circle_path(outer, 1);
        if inner > 0.0 {
            d.push(' ');
            d.push_str(&circle_path(inner, 0));
        }
        return Some(d);
    }

    let large_arc = if span > PI { 1 } else { 0 };
    let outer_start = polar(start, outer);
    let outer_end = polar(end, outer);
    let mut d = format!(
        "M {:.2} {:.2} A {outer:.2} {outer:.2} 0 {large_arc} 1 {:.2} {:.2}",
        outer_start.x, outer_start.y, outer_end.x, outer_end.y
    );
    if inner > 0.0 {
        let inner_end = polar(end, inner);
        let inner_start = polar(start, inner);
        d.push_str(&format!(
            " L {:.2} {:.2} A {inner:.2} {inner:.2} 0 {large_arc} 0 {:.2} {:.2} Z",
            inner_end.x, inner_end.y, inner_start.x, inner_start.y
        ));
    } else {
        d.push_str(" L 0 0 Z");
    }
    Some(d)
}

/// Closed circle as two half arcs; `sweep` picks the winding.
fn circle_path(radius: f32, sweep: u8) -> String {
    format!(
        "M 0 {top:.2} A {radius:.2} {radius:.2} 0 1 {sweep} 0 {bottom:.2} A {radius:.2} {radius:.2} 0 1 {sweep} 0 {top:.2} Z",
        top = -radius,
        bottom = radius
    )
}

fn points_attr(points: &[(f32, f32)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace `path` in one step so readers never see a half-written chart.
fn write_replacing(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.persist(path)?;
    Ok(())
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            write_replacing(path, svg.as_bytes())?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    let png = pixmap.encode_png()?;
    write_replacing(output, &png)
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the `png` feature"
    ))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::parse_stats;

    const PAYLOAD: &str = r#"{
        "duration": 42.8,
        "total_packets": 1000,
        "protocols": {"80": 700, "443": 250, "53": 50, "123": 0},
        "top_connections": {"10.0.0.1 → 10.0.0.2": 12, "10.0.0.3 → <ext>": 3},
        "recent_packets": [
            {"src_ip": "10.0.0.1", "dst_ip": "10.0.0.2", "protocol": 80, "timestamp": 1700000000}
        ]
    }"#;

    #[test]
    fn render_dashboard_basic() {
        let payload = parse_stats(PAYLOAD).unwrap();
        let svg = render_dashboard(&payload, &Config::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("HTTP (80)"));
        assert!(svg.contains(" (70.0%)"));
        assert!(svg.contains(" 700 pkts"));
        assert!(svg.contains(" (0.0%)"));
        assert!(svg.contains("42s"));
        assert!(svg.contains("1,000"));
        assert!(svg.contains("class=\"bar\""));
        assert!(svg.contains("&lt;ext&gt;"));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let payload = parse_stats(PAYLOAD).unwrap();
        let config = Config::default();
        assert_eq!(
            render_dashboard(&payload, &config),
            render_dashboard(&payload, &config)
        );
    }

    #[test]
    fn empty_protocols_render_notice_text() {
        let payload = parse_stats(r#"{"duration": 0, "total_packets": 0}"#).unwrap();
        let svg = render_dashboard(&payload, &Config::default());
        assert!(svg.contains("No protocol data"));
        assert!(!svg.contains("<polyline"));
        assert!(!svg.contains("class=\"packet-table\""));
    }

    #[test]
    fn ring_segment_paths() {
        assert!(ring_segment_path(1.0, 1.0, 50.0, 80.0).is_none());
        let full = ring_segment_path(0.0, TAU, 50.0, 80.0).unwrap();
        assert_eq!(full.matches(" A ").count(), 4);
        let quarter = ring_segment_path(0.0, PI / 2.0, 50.0, 80.0).unwrap();
        assert!(quarter.starts_with("M 0.00 -80.00 A 80.00 80.00 0 0 1 80.00"));
        assert!(quarter.ends_with("Z"));
        let wide = ring_segment_path(0.0, 1.5 * PI, 50.0, 80.0).unwrap();
        assert!(wide.contains("0 1 1"));
    }

    #[test]
    fn escape_xml_handles_markup() {
        assert_eq!(escape_xml("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
    }

    #[test]
    fn svg_output_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.svg");
        write_output_svg("<svg>first</svg>", Some(&path)).unwrap();
        write_output_svg("<svg/>", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<svg/>");
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("dashboard.svg")]);
    }

    #[test]
    fn concurrent_writers_never_share_a_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.svg");
        std::thread::scope(|scope| {
            for idx in 0..4 {
                let path = &path;
                scope.spawn(move || {
                    for _ in 0..10 {
                        write_output_svg(&format!("<svg>{idx}</svg>"), Some(path)).unwrap();
                    }
                });
            }
        });
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg>") && svg.ends_with("</svg>"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
