// ── Domain model ──

pub mod brewery;
pub mod result;

pub use brewery::{Brewery, BreweryType};
pub use result::ApiResult;
