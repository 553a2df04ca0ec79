//! Small reusable widgets.

pub mod shimmer;
pub mod status_indicator;
