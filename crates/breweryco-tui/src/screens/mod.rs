//! Screen implementations. Each screen is a top-level Component.

pub mod breweries;
pub mod details;

use crate::component::Component;
use crate::screen::ScreenId;

pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Breweries, Box::new(breweries::BreweriesScreen::new())),
        (ScreenId::Details, Box::new(details::DetailsScreen::new())),
    ]
}
