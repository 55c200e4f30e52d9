use crate::sym::core::attributes::{self, SignalAttributes};
use crate::sym::core::builder::Builder;
use crate::sym::core::frame::parse_hex;
use crate::sym::core::strings::{SourceLine, next_token, unquote};
use crate::sym::core::var::{bit_range, resolve_value_table};
use crate::sym::types::{
    errors::Diagnostic,
    frame::MuxGroup,
    signal::{MuxRole, SignalSym, ValueType},
};

/// Decode a `Mux=` line of the **current frame**:
/// Mux=<group> <bit_start>,<bit_length> <value>h [-m] [/tag:value ...] [// comment]
///
/// Each selector value may be claimed by one group per frame. A second claim is
/// reported against its own line and the first group keeps the value; the
/// `Var=` lines that follow are still attached, gated by that value.
pub(crate) fn decode(b: &mut Builder, line: &SourceLine<'_>, body: &str) {
    let Some(key) = b.frame_key(line) else {
        return;
    };

    // 1) group name, bit range, selector value
    let Some((name_tok, rest)) = next_token(body) else {
        malformed(b, line);
        return;
    };
    let group: String = unquote(name_tok).to_string();
    let Some((range_tok, rest)) = next_token(rest) else {
        malformed(b, line);
        return;
    };
    let Some((bit_start, bit_length)) = bit_range(b, line, range_tok) else {
        return;
    };
    let Some((value_tok, rest)) = next_token(rest) else {
        malformed(b, line);
        return;
    };
    let Some(value) = parse_selector(value_tok) else {
        b.report(Diagnostic::MalformedNumber {
            line: line.number,
            field: "multiplexer value",
            text: value_tok.to_string(),
        });
        return;
    };

    let attrs: SignalAttributes = attributes::decode(rest, line.number, &group, &mut b.errors);

    // signals that follow belong to this value, whoever owns it
    b.current_mux = Some(value);

    let Some(frame) = b.db.get_frame_by_key_mut(key) else {
        return;
    };

    // 2) claim the selector value (first claim wins)
    let collision: Option<Diagnostic> = match frame.mux_groups.get(&value) {
        Some(owner) => Some(Diagnostic::DuplicateMuxValue {
            line: line.number,
            value,
            old: owner.name.clone(),
            old_line: owner.line,
            new: group.clone(),
        }),
        None => {
            frame.mux_groups.insert(
                value,
                MuxGroup {
                    name: group.clone(),
                    line: line.number,
                    comment: line.comment.unwrap_or("").to_string(),
                },
            );
            None
        }
    };

    // 3) the first Mux= line of the frame defines the selector signal
    let needs_selector: bool = frame.multiplexor().is_none();
    let selector_name: String = frame.multiplexor_name();

    if let Some(diagnostic) = collision {
        b.report(diagnostic);
    }
    if needs_selector {
        let value_table: Option<String> =
            resolve_value_table(b, line, &selector_name, attrs.value_table.clone());
        let mut selector: SignalSym = SignalSym {
            name: selector_name,
            value_type: ValueType::Unsigned,
            bit_start,
            bit_length,
            value_table,
            mux_role: MuxRole::Multiplexor,
            ..Default::default()
        };
        attrs.apply_to(&mut selector);
        if let Some(frame) = b.db.get_frame_by_key_mut(key) {
            frame.signals.push(selector);
        }
    } else if let Some(existing) = b
        .db
        .get_frame_by_key(key)
        .and_then(|f| f.multiplexor())
        && (existing.bit_start, existing.bit_length) != (bit_start, bit_length)
    {
        log::debug!(
            "line {}: '{}' uses bits {},{} but the selector is {},{}",
            line.number,
            group,
            bit_start,
            bit_length,
            existing.bit_start,
            existing.bit_length
        );
    }
}

/// Selector value: hexadecimal with trailing `h`, decimal otherwise.
fn parse_selector(token: &str) -> Option<u32> {
    if token.ends_with(['h', 'H']) {
        parse_hex(token)
    } else {
        token.parse::<u32>().ok()
    }
}

fn malformed(b: &mut Builder, line: &SourceLine<'_>) {
    b.report(Diagnostic::MalformedLine {
        line: line.number,
        what: "multiplexer",
        content: line.code.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector() {
        assert_eq!(parse_selector("1h"), Some(1));
        assert_eq!(parse_selector("1Ah"), Some(0x1A));
        assert_eq!(parse_selector("10"), Some(10));
        assert_eq!(parse_selector("zz"), None);
    }
}
