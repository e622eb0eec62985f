use thiserror::Error;

use crate::config::DonutConfig;

use super::NoticeLayout;

/// Reasons the label engine refuses an input set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("no categories to lay out")]
    Empty,
    #[error("category weights sum to zero")]
    ZeroTotal,
    #[error("category {index} has invalid weight {weight}")]
    InvalidWeight { index: usize, weight: f64 },
    #[error("wedge {index} is out of angular order")]
    UnorderedWedges { index: usize },
}

/// Placeholder drawn in the donut slot when there is nothing to chart.
pub(super) fn compute_notice_layout(err: &LayoutError, config: &DonutConfig) -> NoticeLayout {
    let detail = match err {
        LayoutError::Empty | LayoutError::ZeroTotal => None,
        other => Some(other.to_string()),
    };
    NoticeLayout {
        width: config.width.max(1.0),
        height: config.height.max(1.0),
        message: config.empty_message.clone(),
        detail,
        font_size: config.font_size,
    }
}
