use serde::{Deserialize, Serialize};

/// `d3.schemeCategory10`.
const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub line_color: String,
    pub panel_background: String,
    pub panel_border: String,
    pub background: String,
    pub pie_colors: Vec<String>,
}

impl Theme {
    pub fn dashboard_default() -> Self {
        Self {
            font_family: "system-ui, -apple-system, \"Segoe UI\", Roboto, sans-serif".to_string(),
            text_color: "#111827".to_string(),
            muted_text_color: "#6B7280".to_string(),
            line_color: "#333333".to_string(),
            panel_background: "#FFFFFF".to_string(),
            panel_border: "#E5E7EB".to_string(),
            background: "#F9FAFB".to_string(),
            pie_colors: CATEGORY10.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            text_color: "#1C2430".to_string(),
            muted_text_color: "#7A8AA6".to_string(),
            line_color: "#7A8AA6".to_string(),
            panel_background: "#F8FAFF".to_string(),
            panel_border: "#C7D2E5".to_string(),
            background: "#FFFFFF".to_string(),
            pie_colors: CATEGORY10.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Ordinal colour for the `idx`-th wedge.
    pub fn pie_color(&self, idx: usize) -> &str {
        if self.pie_colors.is_empty() {
            return CATEGORY10[idx % CATEGORY10.len()];
        }
        &self.pie_colors[idx % self.pie_colors.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pie_colors_cycle() {
        let theme = Theme::dashboard_default();
        assert_eq!(theme.pie_color(0), "#1f77b4");
        assert_eq!(theme.pie_color(10), "#1f77b4");
        assert_eq!(theme.pie_color(3), "#d62728");
    }
}
