//! Screen identifiers.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Breweries,
    /// Details of the selected brewery. Only reachable through a selection.
    Details,
}

impl ScreenId {
    pub fn label(self) -> &'static str {
        match self {
            Self::Breweries => "Breweries",
            Self::Details => "Details",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
