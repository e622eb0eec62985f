use std::path::Path;

use chrono::Utc;
use netstat_dash::config::{DonutConfig, LayoutConfig};
use netstat_dash::layout::{
    Category, DonutGeometry, DonutPanel, GeometryProvider, LabelParams, LayoutError, Side,
    compute_dashboard_layout_in, layout_labels,
};
use netstat_dash::theme::Theme;
use netstat_dash::{parse_stats, render_svg};

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
    assert!(!svg.contains("NaN"), "{fixture}: NaN coordinate");
}

fn load_fixture(rel: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel);
    assert!(path.exists(), "fixture missing: {}", rel);
    std::fs::read_to_string(path).expect("fixture read failed")
}

fn render_fixture(rel: &str) -> String {
    let payload = parse_stats(&load_fixture(rel)).expect("parse failed");
    let theme = Theme::dashboard_default();
    let layout_config = LayoutConfig::default();
    let layout = compute_dashboard_layout_in(&payload, &Utc, &theme, &layout_config);
    render_svg(&layout, &theme, &layout_config)
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let fixtures = [
        "basic.json",
        "crowded.json",
        "empty.json",
        "single.json",
        "zero_counts.json",
    ];
    for rel in fixtures {
        let svg = render_fixture(rel);
        assert_valid_svg(&svg, rel);
    }
}

#[test]
fn basic_fixture_shows_every_panel() {
    let svg = render_fixture("basic.json");
    assert!(svg.contains("TCP (6)"));
    assert!(svg.contains("UDP (17)"));
    assert!(svg.contains("HTTPS (443)"));
    assert!(svg.contains(" 9000 pkts"));
    assert!(svg.contains("15,234"));
    assert!(svg.contains("65s"));
    assert!(svg.contains("192.168.1.10 → 93.184.216.34"));
    assert!(svg.contains("22:13:20"));
    assert_eq!(svg.matches("<polyline").count(), 5);
}

#[test]
fn empty_and_zero_fixtures_show_notice() {
    for rel in ["empty.json", "zero_counts.json"] {
        let svg = render_fixture(rel);
        assert!(svg.contains("No protocol data"), "{rel}: notice missing");
        assert!(!svg.contains("<polyline"), "{rel}: unexpected labels");
    }
}

#[test]
fn single_category_draws_full_ring() {
    let payload = parse_stats(&load_fixture("single.json")).unwrap();
    let layout = compute_dashboard_layout_in(
        &payload,
        &Utc,
        &Theme::dashboard_default(),
        &LayoutConfig::default(),
    );
    let chart = layout.protocols.panel.chart().expect("chart expected");
    assert_eq!(chart.slices.len(), 1);
    let label = &chart.slices[0].label;
    assert_eq!(label.percent, "100.0");
    // Mid-angle of a full turn is exactly pi, which falls on the left.
    assert_eq!(label.side, Side::Left);
    assert!(label.position.x < 0.0);
}

#[test]
fn crowded_fixture_labels_never_collide() {
    let payload = parse_stats(&load_fixture("crowded.json")).unwrap();
    let config = LayoutConfig::default();
    let layout = compute_dashboard_layout_in(&payload, &Utc, &Theme::dashboard_default(), &config);
    let DonutPanel::Chart(chart) = &layout.protocols.panel else {
        panic!("chart expected");
    };
    let step = config.donut.label_height + config.donut.label_gap;

    for side in [Side::Left, Side::Right] {
        let mut ys: Vec<f32> = chart
            .labels()
            .filter(|label| label.side == side)
            .map(|label| label.position.y)
            .collect();
        ys.sort_by(f32::total_cmp);
        for pair in ys.windows(2) {
            assert!(
                pair[1] - pair[0] >= step - 1e-3,
                "{side:?} labels at {} and {} overlap",
                pair[0],
                pair[1]
            );
        }
    }
    assert!(chart.labels().any(|label| label.placement.is_overflow()));
    assert_eq!(layout.connections.panel.bars.len(), config.connections.max_bars);
}

#[test]
fn labels_follow_wedge_geometry() {
    let config = DonutConfig::default();
    let geometry = DonutGeometry::from_config(&config);
    let categories = vec![
        Category::new("TCP (6)", 60.0),
        Category::new("UDP (17)", 25.0),
        Category::new("ICMP (1)", 10.0),
        Category::new("Port 9999", 5.0),
    ];
    let wedges = geometry.wedges(&categories).unwrap();
    let labels = layout_labels(&wedges, &LabelParams::from_config(&config)).unwrap();

    assert_eq!(labels.len(), categories.len());
    let offset = config.radius() * config.label_offset_ratio;
    for (idx, (wedge, label)) in wedges.iter().zip(&labels).enumerate() {
        assert_eq!(label.index, idx);
        assert_eq!(label.text, categories[idx].label);
        assert_eq!(label.side, wedge.side());
        assert!((label.position.x.abs() - offset).abs() < 1e-3);
        assert_eq!(label.connector[0], wedge.anchor);
        assert_eq!(label.connector[1], wedge.guide);
        assert_eq!(label.connector[2], label.position);
    }
    assert_eq!(labels[0].side, Side::Right);
    assert_eq!(labels[0].percent, "60.0");
    assert_eq!(labels[3].percent, "5.0");
}

#[test]
fn out_of_order_wedges_are_rejected() {
    let config = DonutConfig::default();
    let geometry = DonutGeometry::from_config(&config);
    let mut wedges = geometry
        .wedges(&[Category::new("a", 1.0), Category::new("b", 3.0)])
        .unwrap();
    wedges.swap(0, 1);
    let err = layout_labels(&wedges, &LabelParams::from_config(&config)).unwrap_err();
    assert_eq!(err, LayoutError::UnorderedWedges { index: 1 });
}
