// Label placement and collision avoidance for donut wedge labels.
// Pure geometry over wedge descriptors; no SVG dependency and no state
// carried between calls.

use crate::config::DonutConfig;

use super::error::LayoutError;
use super::geometry::{WedgeDescriptor, total_weight};
use super::types::{PlacedLabel, Placement, Point, Side};

const ANGLE_ORDER_EPS: f32 = 1e-4;

/// Band geometry the engine stacks labels into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelParams {
    /// Outer radius of the donut; labels sit at `radius * offset_ratio`.
    pub radius: f32,
    /// Half the chart height. Each side's band spans `[-half_height, half_height)`.
    pub half_height: f32,
    pub label_height: f32,
    pub gap: f32,
    pub offset_ratio: f32,
}

impl LabelParams {
    pub fn from_config(config: &DonutConfig) -> Self {
        Self {
            radius: config.radius(),
            half_height: config.height / 2.0,
            label_height: config.label_height,
            gap: config.label_gap,
            offset_ratio: config.label_offset_ratio,
        }
    }

    /// Minimum centre-to-centre distance between two labels on one side.
    pub fn step(&self) -> f32 {
        self.label_height + self.gap
    }
}

/// Place one label per wedge, in input order.
///
/// Wedges must be in angular order around the pie: every placement
/// depends on the labels already accepted on its side.
pub fn layout_labels(
    wedges: &[WedgeDescriptor],
    params: &LabelParams,
) -> Result<Vec<PlacedLabel>, LayoutError> {
    let total = total_weight(wedges.iter().map(|wedge| wedge.weight))?;
    check_wedge_order(wedges)?;

    let mut left = SideStack::default();
    let mut right = SideStack::default();
    let mut labels = Vec::with_capacity(wedges.len());

    for wedge in wedges {
        let side = wedge.side();
        let stack = match side {
            Side::Left => &mut left,
            Side::Right => &mut right,
        };
        let placement = stack.place(wedge.guide.y, params);
        let position = Point::new(
            params.radius * params.offset_ratio * side.sign(),
            placement.y(),
        );
        labels.push(PlacedLabel {
            index: wedge.index,
            text: wedge.label.clone(),
            value: wedge.weight,
            percent: format_percent(wedge.weight, total),
            side,
            position,
            anchor: side.text_anchor(),
            connector: [wedge.anchor, wedge.guide, position],
            placement,
        });
    }

    Ok(labels)
}

pub fn format_percent(weight: f64, total: f64) -> String {
    format!("{:.1}", weight / total * 100.0)
}

fn check_wedge_order(wedges: &[WedgeDescriptor]) -> Result<(), LayoutError> {
    let full_turn = std::f32::consts::TAU + ANGLE_ORDER_EPS;
    let mut previous_end = 0.0_f32;
    for (index, wedge) in wedges.iter().enumerate() {
        let in_range = wedge.start_angle >= -ANGLE_ORDER_EPS
            && wedge.end_angle <= full_turn
            && wedge.start_angle <= wedge.end_angle;
        if !in_range || wedge.start_angle + ANGLE_ORDER_EPS < previous_end {
            return Err(LayoutError::UnorderedWedges { index });
        }
        previous_end = wedge.end_angle;
    }
    Ok(())
}

/// Labels already accepted on one side, in placement order.
#[derive(Debug, Default)]
struct SideStack {
    placed: Vec<f32>,
}

impl SideStack {
    fn place(&mut self, candidate: f32, params: &LabelParams) -> Placement {
        let placement = self.resolve(candidate, params);
        self.placed.push(placement.y());
        placement
    }

    fn resolve(&self, candidate: f32, params: &LabelParams) -> Placement {
        if self.placed.is_empty() {
            return Placement::Placed(candidate);
        }

        let step = params.step();
        let mut sorted = self.placed.clone();
        sorted.sort_by(f32::total_cmp);

        for (idx, current) in sorted.iter().enumerate() {
            let fits = match sorted.get(idx + 1) {
                // The new label needs a full step of clearance from both neighbours.
                Some(next) => next - current >= 2.0 * step,
                None => current + step < params.half_height,
            };
            if fits {
                return Placement::Placed(current + step);
            }
        }

        // No gap left: restart from the top of the band in placement order,
        // stepping down past any slot that would touch an accepted label.
        let mut slot = -params.half_height + params.label_height * self.placed.len() as f32;
        // Each accepted label blocks at most two consecutive slots.
        for _ in 0..=2 * sorted.len() {
            if sorted.iter().all(|y| (y - slot).abs() >= step) {
                break;
            }
            slot += step;
        }
        Placement::Overflowed(slot)
    }
}
