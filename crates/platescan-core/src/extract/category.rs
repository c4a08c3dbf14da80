//! Component category derived from one digit of the identification number.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of component an identification number belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The designated digit equals the trigger (chassis in the deployed policy).
    Primary,
    /// Any other digit value (module in the deployed policy).
    Secondary,
}

impl Category {
    /// Classify a number by the digit at `position`.
    ///
    /// A position past the end of `number` classifies as secondary.
    pub fn classify(number: &str, position: usize, trigger: char) -> Self {
        match number.chars().nth(position) {
            Some(digit) if digit == trigger => Category::Primary,
            _ => Category::Secondary,
        }
    }

    pub fn is_primary(self) -> bool {
        self == Category::Primary
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Primary => write!(f, "primary"),
            Category::Secondary => write!(f, "secondary"),
        }
    }
}
