// Wedge geometry for the donut chart. Angles are radians measured
// clockwise from 12 o'clock; points are relative to the chart centre with
// y growing downwards, matching SVG.

use std::f64::consts::TAU;

use serde::Serialize;

use crate::config::DonutConfig;

use super::error::LayoutError;
use super::types::{Point, Side};

/// A labelled weight. Duplicate labels are kept as separate categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub label: String,
    pub weight: f64,
}

impl Category {
    pub fn new(label: impl Into<String>, weight: f64) -> Self {
        Self {
            label: label.into(),
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WedgeDescriptor {
    pub index: usize,
    pub label: String,
    pub weight: f64,
    pub start_angle: f32,
    pub end_angle: f32,
    /// Centroid of the drawn ring segment.
    pub anchor: Point,
    /// Centroid on the outer guide circle.
    pub guide: Point,
}

impl WedgeDescriptor {
    pub fn mid_angle(&self) -> f32 {
        self.start_angle + (self.end_angle - self.start_angle) / 2.0
    }

    pub fn side(&self) -> Side {
        Side::from_mid_angle(self.mid_angle())
    }

    pub fn span(&self) -> f32 {
        self.end_angle - self.start_angle
    }
}

/// Turns weighted categories into wedge descriptors.
///
/// Implementations must emit one wedge per category, in input order, with
/// angles cumulatively covering `[0, 2π]`.
pub trait GeometryProvider {
    fn radius(&self) -> f32;

    fn wedges(&self, categories: &[Category]) -> Result<Vec<WedgeDescriptor>, LayoutError>;
}

/// Ring geometry: wedges drawn between `inner_ratio` and `outer_ratio` of
/// the radius, labels guided along a circle at `guide_ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonutGeometry {
    pub radius: f32,
    pub inner_ratio: f32,
    pub outer_ratio: f32,
    pub guide_ratio: f32,
}

impl DonutGeometry {
    pub fn from_config(config: &DonutConfig) -> Self {
        Self {
            radius: config.radius(),
            inner_ratio: config.inner_ratio,
            outer_ratio: config.outer_ratio,
            guide_ratio: config.guide_ratio,
        }
    }

    pub fn inner_radius(&self) -> f32 {
        self.radius * self.inner_ratio
    }

    pub fn outer_radius(&self) -> f32 {
        self.radius * self.outer_ratio
    }

    pub fn guide_radius(&self) -> f32 {
        self.radius * self.guide_ratio
    }
}

impl GeometryProvider for DonutGeometry {
    fn radius(&self) -> f32 {
        self.radius
    }

    fn wedges(&self, categories: &[Category]) -> Result<Vec<WedgeDescriptor>, LayoutError> {
        let total = total_weight(categories.iter().map(|category| category.weight))?;
        let mut wedges = Vec::with_capacity(categories.len());
        let mut cumulative = 0.0_f64;
        for (index, category) in categories.iter().enumerate() {
            let start_angle = (cumulative / total * TAU) as f32;
            cumulative += category.weight;
            let end_angle = (cumulative / total * TAU) as f32;
            wedges.push(WedgeDescriptor {
                index,
                label: category.label.clone(),
                weight: category.weight,
                start_angle,
                end_angle,
                anchor: arc_centroid(
                    start_angle,
                    end_angle,
                    self.inner_radius(),
                    self.outer_radius(),
                ),
                guide: arc_centroid(
                    start_angle,
                    end_angle,
                    self.guide_radius(),
                    self.guide_radius(),
                ),
            });
        }
        Ok(wedges)
    }
}

/// Sum of weights, rejecting empty, negative, non-finite and zero-sum sets.
pub(crate) fn total_weight(weights: impl Iterator<Item = f64>) -> Result<f64, LayoutError> {
    let mut total = 0.0_f64;
    let mut count = 0usize;
    for (index, weight) in weights.enumerate() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(LayoutError::InvalidWeight { index, weight });
        }
        total += weight;
        count += 1;
    }
    if count == 0 {
        return Err(LayoutError::Empty);
    }
    if total <= 0.0 {
        return Err(LayoutError::ZeroTotal);
    }
    Ok(total)
}

/// Point at `radius` along `angle`.
pub fn polar(angle: f32, radius: f32) -> Point {
    Point::new(radius * angle.sin(), -radius * angle.cos())
}

/// Centroid of the ring segment between two angles and two radii.
pub fn arc_centroid(start_angle: f32, end_angle: f32, inner: f32, outer: f32) -> Point {
    polar((start_angle + end_angle) / 2.0, (inner + outer) / 2.0)
}
