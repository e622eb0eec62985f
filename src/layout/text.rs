// Text extents are estimated from per-character width factors calibrated
// for a sans-serif stack; exact glyph metrics are not needed to size panels.

pub(super) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' => 0.321,
        'I' | 'i' | 'j' | 'l' => 0.25,
        'f' | 't' | 'r' => 0.34,
        'M' | 'W' | 'm' | 'w' => 0.88,
        'A'..='Z' => 0.66,
        'a'..='z' => 0.56,
        '1' => 0.396,
        '0'..='9' => 0.6,
        '%' | '@' | '#' | '&' => 0.946,
        '→' => 1.0,
        _ => 0.568,
    }
}

pub(super) fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Width of a run of spans rendered on one line at different sizes.
pub(super) fn spans_width(spans: &[(&str, f32)]) -> f32 {
    spans
        .iter()
        .map(|(text, font_size)| text_width(text, *font_size))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_width_factor_returns_positive_values() {
        for ch in ['a', 'Z', ' ', '0', '@', '\u{4e2d}', '→'] {
            assert!(char_width_factor(ch) > 0.0, "char {:?} has zero width", ch);
        }
    }

    #[test]
    fn text_width_scales_with_font_size() {
        let w12 = text_width("HTTP (80)", 12.0);
        let w24 = text_width("HTTP (80)", 24.0);
        assert!((w24 - w12 * 2.0).abs() < 0.01, "width should double with font size");
    }

    #[test]
    fn spans_add_up() {
        let joined = spans_width(&[("DNS", 12.0), (" (5.0%)", 10.0)]);
        let separate = text_width("DNS", 12.0) + text_width(" (5.0%)", 10.0);
        assert!((joined - separate).abs() < 1e-4);
        assert_eq!(text_width("", 12.0), 0.0);
    }
}
