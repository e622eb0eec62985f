use crate::config::ConnectionsConfig;

use super::text::text_width;
use super::{AxisTick, BarLayout, ConnectionsLayout, Point};

/// Ordinal band scale: `n` bands across `[0, range]` with equal inner and
/// outer padding, centred.
#[derive(Debug, Clone, Copy)]
struct BandScale {
    start: f32,
    step: f32,
    bandwidth: f32,
}

impl BandScale {
    fn new(count: usize, range: f32, padding: f32) -> Self {
        let n = count as f32;
        let step = range / (n - padding + padding * 2.0).max(1.0);
        let start = (range - step * (n - padding)) * 0.5;
        Self {
            start,
            step,
            bandwidth: step * (1.0 - padding),
        }
    }

    fn position(&self, idx: usize) -> f32 {
        self.start + self.step * idx as f32
    }
}

/// Round tick step covering `[0, max]` with roughly `count` ticks.
fn tick_step(max: f64, count: usize) -> f64 {
    let raw = max / count.max(1) as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    power * factor
}

fn tick_values(max: f64, count: usize) -> Vec<f64> {
    let step = tick_step(max, count);
    let last = (max / step + 1e-9).floor() as i64;
    (0..=last).map(|idx| idx as f64 * step).collect()
}

fn format_tick(value: f64, step: f64) -> String {
    if step >= 1.0 {
        return format!("{:.0}", value);
    }
    let decimals = (-step.log10() - 1e-9).ceil().max(0.0) as usize;
    format!("{:.*}", decimals, value)
}

pub(super) fn compute_connections_layout(
    entries: &[(String, f64)],
    config: &ConnectionsConfig,
) -> ConnectionsLayout {
    let plot_width = (config.width - config.margin_left - config.margin_right).max(1.0);
    let plot_height = (config.height - config.margin_top - config.margin_bottom).max(1.0);

    let max_value = entries
        .iter()
        .map(|(_, value)| *value)
        .filter(|value| value.is_finite())
        .fold(0.0_f64, f64::max);
    // An all-zero domain would collapse the scale.
    let domain_max = if max_value > 0.0 { max_value } else { 1.0 };
    let y_of = |value: f64| -> f32 {
        plot_height - (value.clamp(0.0, domain_max) / domain_max) as f32 * plot_height
    };

    let band = BandScale::new(entries.len(), plot_width, config.band_padding);
    let mut bars = Vec::with_capacity(entries.len());
    let mut x_ticks = Vec::with_capacity(entries.len());
    for (idx, (key, value)) in entries.iter().enumerate() {
        let x = band.position(idx);
        let y = y_of(*value);
        bars.push(BarLayout {
            key: key.clone(),
            value: *value,
            x,
            y,
            width: band.bandwidth,
            height: plot_height - y,
        });
        x_ticks.push(AxisTick {
            position: x + band.bandwidth / 2.0,
            label: key.clone(),
        });
    }

    let step = tick_step(domain_max, config.tick_count);
    let y_ticks = tick_values(domain_max, config.tick_count)
        .into_iter()
        .map(|value| AxisTick {
            position: y_of(value),
            label: format_tick(value, step),
        })
        .collect();

    // Rotated key labels hang below the axis; grow the panel if they are long.
    let longest = x_ticks
        .iter()
        .map(|tick| text_width(&tick.label, config.font_size))
        .fold(0.0_f32, f32::max);
    let rotation = config.label_rotation.to_radians().abs();
    let hang = longest * rotation.sin() + config.font_size * 2.0;
    let bottom = config.margin_bottom.max(hang);

    ConnectionsLayout {
        width: config.width,
        height: config.margin_top + plot_height + bottom,
        plot_origin: Point::new(config.margin_left, config.margin_top),
        plot_width,
        plot_height,
        bars,
        x_ticks,
        y_ticks,
        color: config.bar_color.clone(),
        font_size: config.font_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<(String, f64)> {
        vec![
            ("a → b".to_string(), 40.0),
            ("c → d".to_string(), 20.0),
            ("e → f".to_string(), 10.0),
        ]
    }

    #[test]
    fn band_scale_matches_padded_bands() {
        let band = BandScale::new(3, 520.0, 0.1);
        // step = 520 / (3 - 0.1 + 0.2)
        assert!((band.step - 167.741_94).abs() < 1e-3);
        assert!((band.bandwidth - band.step * 0.9).abs() < 1e-4);
        assert!((band.position(0) - band.step * 0.1).abs() < 1e-3);
        let end = band.position(2) + band.bandwidth;
        assert!((520.0 - end - band.step * 0.1).abs() < 1e-3);
    }

    #[test]
    fn tallest_bar_fills_plot() {
        let layout = compute_connections_layout(&entries(), &ConnectionsConfig::default());
        assert_eq!(layout.plot_width, 520.0);
        assert_eq!(layout.plot_height, 220.0);
        assert_eq!(layout.bars[0].y, 0.0);
        assert_eq!(layout.bars[0].height, 220.0);
        assert!((layout.bars[1].height - 110.0).abs() < 1e-3);
        assert_eq!(layout.x_ticks[2].label, "e → f");
    }

    #[test]
    fn ticks_are_round_numbers() {
        assert_eq!(tick_values(40.0, 10), vec![
            0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0
        ]);
        assert_eq!(tick_step(1000.0, 10), 100.0);
        assert_eq!(tick_step(7.0, 10), 0.5);
        assert_eq!(format_tick(0.5, 0.1), "0.5");
        assert_eq!(format_tick(300.0, 100.0), "300");
    }

    #[test]
    fn empty_and_zero_data_still_produce_axes() {
        let layout = compute_connections_layout(&[], &ConnectionsConfig::default());
        assert!(layout.bars.is_empty());
        assert!(!layout.y_ticks.is_empty());

        let zeros = vec![("x".to_string(), 0.0)];
        let layout = compute_connections_layout(&zeros, &ConnectionsConfig::default());
        assert_eq!(layout.bars[0].height, 0.0);
    }
}
