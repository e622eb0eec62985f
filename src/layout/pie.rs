use crate::config::DonutConfig;
use crate::theme::Theme;

use super::error::LayoutError;
use super::geometry::{Category, DonutGeometry, GeometryProvider};
use super::label_placement::{LabelParams, layout_labels};
use super::text::{spans_width, text_width};
use super::{DonutLayout, DonutSlice, Point, Side};

const DETAIL_LINE_EM: f32 = 1.2;
const PANEL_PAD: f32 = 12.0;

/// Packet counts print without a trailing `.0`.
pub fn format_count(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

pub(super) fn compute_donut_layout(
    categories: &[Category],
    theme: &Theme,
    config: &DonutConfig,
) -> Result<DonutLayout, LayoutError> {
    let geometry = DonutGeometry::from_config(config);
    compute_donut_layout_with(&geometry, categories, theme, config)
}

/// Donut layout over any wedge provider; ring radii come from the config.
pub(super) fn compute_donut_layout_with<G: GeometryProvider>(
    geometry: &G,
    categories: &[Category],
    theme: &Theme,
    config: &DonutConfig,
) -> Result<DonutLayout, LayoutError> {
    let wedges = geometry.wedges(categories)?;
    let mut params = LabelParams::from_config(config);
    params.radius = geometry.radius();
    let labels = layout_labels(&wedges, &params)?;

    let half_height = config.height / 2.0;
    let outer_radius = geometry.radius() * config.outer_ratio;
    let mut min_x = -config.width / 2.0;
    let mut max_x = config.width / 2.0;
    let mut min_y = -half_height;
    let mut max_y = half_height;

    let mut slices = Vec::with_capacity(labels.len());
    for (idx, (wedge, label)) in wedges.into_iter().zip(labels).enumerate() {
        let share_text = format!(" ({}%)", label.percent);
        let count_text = format!(" {} pkts", format_count(label.value));

        let first_line = spans_width(&[
            (label.text.as_str(), config.font_size),
            (share_text.as_str(), config.detail_font_size),
        ]);
        let second_line = config.detail_offset_x + text_width(&count_text, config.detail_font_size);
        let extent = first_line.max(second_line);
        match label.side {
            Side::Right => max_x = max_x.max(label.position.x + extent + PANEL_PAD),
            Side::Left => min_x = min_x.min(label.position.x - extent - PANEL_PAD),
        }
        min_y = min_y.min(label.position.y - config.font_size - PANEL_PAD);
        max_y = max_y
            .max(label.position.y + config.detail_font_size * (DETAIL_LINE_EM + 0.4) + PANEL_PAD);

        slices.push(DonutSlice {
            wedge,
            color: theme.pie_color(idx).to_string(),
            label,
            share_text,
            count_text,
        });
    }

    let half_width = min_x.abs().max(max_x).max(outer_radius + PANEL_PAD);
    let width = half_width * 2.0;
    let height = max_y - min_y;

    Ok(DonutLayout {
        width,
        height,
        center: Point::new(half_width, -min_y),
        radius: geometry.radius(),
        inner_radius: geometry.radius() * config.inner_ratio,
        outer_radius,
        font_size: config.font_size,
        detail_font_size: config.detail_font_size,
        slices,
    })
}
