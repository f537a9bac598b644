use std::{fmt::Display, ops::Deref};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. {
            None
        } else {
            Some(Percentage(value))
        }
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `count` in `total` entries. Callers are responsible for ruling out an empty total
/// before asking for a percentage.
pub fn count_percentage(count: usize, total: usize) -> Percentage {
    debug_assert!(total > 0);
    Percentage::new_opt(count as f64 / total as f64 * 100.)
        .expect("Percentage should always be at least 0")
}

#[cfg(test)]
mod tests {
    use super::count_percentage;

    #[test]
    fn test_count_percentage() {
        assert_eq!(*count_percentage(2, 4), 50.);
        assert_eq!(*count_percentage(0, 4), 0.);
        assert_eq!(*count_percentage(4, 4), 100.);
    }
}
