use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::sym::types::errors::InvalidLiteral;

/// Numeric literal as written in the source file.
///
/// Keeps the original text next to the decoded value so that writing the
/// signal back reproduces exactly the digits that were read (`37.1` stays
/// `37.1`, `37` stays `37`, `1.500` stays `1.500`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    text: String,
    value: f64,
}

impl Literal {
    /// Original text of the literal.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Decoded numeric value.
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl FromStr for Literal {
    type Err = InvalidLiteral;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text: &str = s.trim();
        let invalid = || InvalidLiteral {
            text: text.to_string(),
        };
        let value: f64 = text.parse::<f64>().map_err(|_| invalid())?;
        // f64::from_str also takes "inf" / "NaN", never valid in a symbol file
        if !value.is_finite() {
            return Err(invalid());
        }
        Ok(Literal {
            text: text.to_string(),
            value,
        })
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal {
            text: format_f64(value),
            value,
        }
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal {
            text: value.to_string(),
            value: value as f64,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// compact print: no trailing zeros, integral values without fraction
fn format_f64(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        let mut s: String = format!("{:.12}", value);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.push('0');
        }
        s
    }
}
