// UI and formatting module

pub mod formatters;
pub mod health_report;

pub use formatters::{format_bytes, format_percent, format_uptime};
pub use health_report::print_health_report;
