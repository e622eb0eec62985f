#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod layout;
pub mod layout_dump;
pub mod poll;
pub mod protocol;
pub mod render;
pub mod stats;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use layout::{LayoutError, compute_dashboard_layout};
pub use render::{render_dashboard, render_svg};
pub use stats::{StatsPayload, parse_stats};
