use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::sym::types::literal::Literal;

/// Attribute key used for the `/ln:` long name.
pub const ATTR_LONG_NAME: &str = "LongName";
/// Attribute key used for the `/p:` display precision.
pub const ATTR_DECIMAL_PLACES: &str = "DisplayDecimalPlaces";
/// Attribute key used for the `-h` flag.
pub const ATTR_HEX_OUTPUT: &str = "HexadecimalOutput";

/// Definition of a signal within a frame of a symbol file.
///
/// Numeric fields coming from the file (`/f:`, `/o:`, `/min:`, `/max:`, `/d:`)
/// are kept as [`Literal`]s, so the text written back is the text that was read.
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SignalSym {
    /// Signal name.
    pub name: String,
    /// Type keyword of the declaration.
    pub value_type: ValueType,
    /// Start bit, as written in the file.
    pub bit_start: u16,
    /// Bit length.
    pub bit_length: u16,
    /// Byte order (`-m` selects Motorola).
    pub endian: Endianness,
    /// Unit of measure (`/u:`).
    pub unit: String,
    /// Scaling factor (`/f:`); `None` means 1.
    pub factor: Option<Literal>,
    /// Scaling offset (`/o:`); `None` means 0.
    pub offset: Option<Literal>,
    /// Minimum physical value (`/min:`).
    pub min: Option<Literal>,
    /// Maximum physical value (`/max:`).
    pub max: Option<Literal>,
    /// Default value (`/d:`), kept as its original literal.
    pub initial_value: Option<Literal>,
    /// Name of the referenced enum (`/e:`), if it resolved.
    pub value_table: Option<String>,
    /// Free-form attributes (`LongName`, `DisplayDecimalPlaces`, unknown `/tag:` entries...).
    pub attributes: BTreeMap<String, String>,
    /// Trailing `//` comment of the declaration.
    pub comment: String,
    /// Multiplexing role (`MuxRole::None` when unused).
    pub mux_role: MuxRole,
    /// For multiplexed signals, the selector value they are active for.
    pub mux_value: Option<u32>,
}

impl SignalSym {
    pub fn is_float(&self) -> bool {
        matches!(self.value_type, ValueType::Float | ValueType::Double)
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self.value_type,
            ValueType::Signed | ValueType::Float | ValueType::Double
        )
    }

    /// Returns the `/ln:` long name, if any.
    pub fn long_name(&self) -> Option<&str> {
        self.attributes.get(ATTR_LONG_NAME).map(String::as_str)
    }
}

/// Type keyword of a `Var=` declaration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    #[default]
    Unsigned,
    Signed,
    Bit,
    Float,
    Double,
    String,
}

impl ValueType {
    /// Maps a type keyword to its [`ValueType`]. Keywords are case-sensitive.
    pub fn from_keyword(keyword: &str) -> Option<ValueType> {
        match keyword {
            "unsigned" => Some(ValueType::Unsigned),
            "signed" => Some(ValueType::Signed),
            "bit" => Some(ValueType::Bit),
            "float" => Some(ValueType::Float),
            "double" => Some(ValueType::Double),
            "string" => Some(ValueType::String),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ValueType::Unsigned => "unsigned",
            ValueType::Signed => "signed",
            ValueType::Bit => "bit",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::String => "string",
        }
    }

    /// Bit length imposed by floating types.
    pub fn required_bit_length(&self) -> Option<u16> {
        match self {
            ValueType::Float => Some(32),
            ValueType::Double => Some(64),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endianness {
    #[default]
    Intel,
    Motorola,
}

/// What role (if any) a signal plays in multiplexing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MuxRole {
    /// Not multiplexed (always present).
    #[default]
    None,
    /// The selector signal created from the frame's `Mux=` lines.
    Multiplexor,
    /// Signal declared after a `Mux=` line.
    Multiplexed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_keywords() {
        for kw in ["unsigned", "signed", "bit", "float", "double", "string"] {
            let vt: ValueType = ValueType::from_keyword(kw).unwrap();
            assert_eq!(vt.keyword(), kw);
        }
        assert_eq!(ValueType::from_keyword("Unsigned"), None);
        assert_eq!(ValueType::Float.required_bit_length(), Some(32));
        assert_eq!(ValueType::Double.required_bit_length(), Some(64));
        assert_eq!(ValueType::Signed.required_bit_length(), None);
    }

    #[test]
    fn test_float_is_signed() {
        let sig = SignalSym {
            value_type: ValueType::Double,
            ..Default::default()
        };
        assert!(sig.is_float());
        assert!(sig.is_signed());
        assert!(sig.long_name().is_none());
    }
}
