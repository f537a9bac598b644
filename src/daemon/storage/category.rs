use std::{fmt::Display, str::FromStr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::error::StoreError;

/// The fixed set of activity categories an entry can be filed under. `Unspecified` is the
/// fallback for entries saved with only a note.
#[derive(ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Working,
    Chilling,
    Gaming,
    Academics,
    Business,
    Unspecified,
}

impl Category {
    /// Every member of the set, in presentation order.
    pub const ALL: [Category; 6] = [
        Category::Working,
        Category::Chilling,
        Category::Gaming,
        Category::Academics,
        Category::Business,
        Category::Unspecified,
    ];

    /// Whether the category counts toward the productive score used by day comparisons.
    pub fn is_productive(&self) -> bool {
        matches!(
            self,
            Category::Working | Category::Academics | Category::Business
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Working => "Working",
            Category::Chilling => "Chilling",
            Category::Gaming => "Gaming",
            Category::Academics => "Academics",
            Category::Business => "Business",
            Category::Unspecified => "Unspecified",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Category {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| StoreError::Validation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::Category;

    #[test]
    fn test_parsing_is_case_insensitive() {
        assert_eq!("working".parse::<Category>().unwrap(), Category::Working);
        assert_eq!("GAMING".parse::<Category>().unwrap(), Category::Gaming);
        assert!(" Business ".parse::<Category>().is_ok());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert!("Sleeping".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn test_productive_subset() {
        let productive = Category::ALL
            .iter()
            .filter(|c| c.is_productive())
            .collect::<Vec<_>>();
        assert_eq!(
            productive,
            [&Category::Working, &Category::Academics, &Category::Business]
        );
    }
}
