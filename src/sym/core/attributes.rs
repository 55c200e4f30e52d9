use std::collections::BTreeMap;

use crate::sym::core::strings::{split_once_unquoted, split_tokens, unquote};
use crate::sym::types::{
    errors::{Diagnostic, ErrorSink},
    literal::Literal,
    signal::{ATTR_DECIMAL_PLACES, ATTR_HEX_OUTPUT, ATTR_LONG_NAME, Endianness, SignalSym},
};

/// Everything found after the base fields of a `Var=` / `Mux=` declaration.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SignalAttributes {
    pub(crate) endian: Endianness,
    pub(crate) unit: String,
    pub(crate) factor: Option<Literal>,
    pub(crate) offset: Option<Literal>,
    pub(crate) min: Option<Literal>,
    pub(crate) max: Option<Literal>,
    pub(crate) initial_value: Option<Literal>,
    /// `/e:` reference, still unresolved.
    pub(crate) value_table: Option<String>,
    pub(crate) attributes: BTreeMap<String, String>,
}

impl SignalAttributes {
    /// Copies everything but the enum reference into `signal`.
    pub(crate) fn apply_to(self, signal: &mut SignalSym) {
        signal.endian = self.endian;
        signal.unit = self.unit;
        signal.factor = self.factor;
        signal.offset = self.offset;
        signal.min = self.min;
        signal.max = self.max;
        signal.initial_value = self.initial_value;
        signal.attributes.extend(self.attributes);
    }
}

/// Parses the attribute tail of a signal declaration.
///
/// Recognized switches:
/// `-m` (Motorola), `-h` (hex output), `/u:` unit, `/f:` factor, `/o:` offset,
/// `/min:`, `/max:`, `/d:` default value, `/p:` decimal places, `/e:` enum,
/// `/ln:` long name. Any other `/tag:value` is kept verbatim in `attributes`.
/// Values may be quoted; a quoted value is returned whole, `:` included.
pub(crate) fn decode(rest: &str, line: usize, signal: &str, errors: &mut ErrorSink) -> SignalAttributes {
    let mut out: SignalAttributes = SignalAttributes::default();

    for token in split_tokens(rest) {
        if token == "-m" {
            out.endian = Endianness::Motorola;
            continue;
        }
        if token == "-h" {
            out.attributes
                .insert(ATTR_HEX_OUTPUT.to_string(), "true".to_string());
            continue;
        }
        let Some(switch) = token.strip_prefix('/') else {
            errors.push(Diagnostic::UnexpectedToken {
                line,
                signal: signal.to_string(),
                token: token.to_string(),
            });
            continue;
        };

        // "/tag:value", the value may be quoted and contain ':'
        let (tag, raw_value) = split_once_unquoted(switch, ':').unwrap_or((switch, ""));
        let value: &str = unquote(raw_value);

        match tag {
            "u" => out.unit = value.to_string(),
            "f" => set_literal(&mut out.factor, value, "factor", line, errors),
            "o" => set_literal(&mut out.offset, value, "offset", line, errors),
            "min" => set_literal(&mut out.min, value, "minimum", line, errors),
            "max" => set_literal(&mut out.max, value, "maximum", line, errors),
            "d" => set_literal(&mut out.initial_value, value, "default value", line, errors),
            "p" => {
                if value.parse::<u32>().is_ok() {
                    out.attributes
                        .insert(ATTR_DECIMAL_PLACES.to_string(), value.to_string());
                } else {
                    errors.push(Diagnostic::MalformedNumber {
                        line,
                        field: "decimal places",
                        text: value.to_string(),
                    });
                }
            }
            "e" => out.value_table = Some(value.to_string()),
            "ln" => {
                out.attributes
                    .insert(ATTR_LONG_NAME.to_string(), value.to_string());
            }
            _ => {
                out.attributes.insert(tag.to_string(), value.to_string());
            }
        }
    }

    out
}

fn set_literal(
    slot: &mut Option<Literal>,
    value: &str,
    field: &'static str,
    line: usize,
    errors: &mut ErrorSink,
) {
    match value.parse::<Literal>() {
        Ok(lit) => *slot = Some(lit),
        Err(_) => errors.push(Diagnostic::MalformedNumber {
            line,
            field,
            text: value.to_string(),
        }),
    }
}
