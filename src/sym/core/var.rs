use crate::sym::core::attributes::{self, SignalAttributes};
use crate::sym::core::builder::Builder;
use crate::sym::core::strings::{SourceLine, next_token, unquote};
use crate::sym::types::{
    errors::Diagnostic,
    signal::{MuxRole, SignalSym, ValueType},
};

/// Decode a `Var=` line belonging to the **current frame**.
/// Format:
/// Var=<name> <type> <bit_start>,<bit_length> [-m] [-h] [/tag:value ...] [// comment]
pub(crate) fn decode(b: &mut Builder, line: &SourceLine<'_>, body: &str) {
    let Some(key) = b.frame_key(line) else {
        return;
    };

    // 1) name, type keyword, bit range
    let Some((name_tok, rest)) = next_token(body) else {
        malformed(b, line);
        return;
    };
    let name: String = unquote(name_tok).to_string();
    let Some((type_tok, rest)) = next_token(rest) else {
        malformed(b, line);
        return;
    };
    let Some(value_type) = ValueType::from_keyword(type_tok) else {
        b.report(Diagnostic::UnknownSignalType {
            line: line.number,
            signal: name,
            type_name: type_tok.to_string(),
        });
        return;
    };
    let Some((range_tok, rest)) = next_token(rest) else {
        malformed(b, line);
        return;
    };
    let Some((bit_start, mut bit_length)) = bit_range(b, line, range_tok) else {
        return;
    };

    // 2) floating types have a fixed width
    if let Some(expected) = value_type.required_bit_length()
        && bit_length != expected
    {
        b.report(Diagnostic::FloatLengthMismatch {
            line: line.number,
            signal: name.clone(),
            type_name: type_tok.to_string(),
            declared: bit_length,
            expected,
        });
        bit_length = expected;
    }

    // 3) switches and attributes
    let attrs: SignalAttributes = attributes::decode(rest, line.number, &name, &mut b.errors);
    let value_table: Option<String> = resolve_value_table(b, line, &name, attrs.value_table.clone());

    let (mux_role, mux_value) = match b.current_mux {
        Some(v) => (MuxRole::Multiplexed, Some(v)),
        None => (MuxRole::None, None),
    };
    let mut signal: SignalSym = SignalSym {
        name,
        value_type,
        bit_start,
        bit_length,
        value_table,
        comment: line.comment.unwrap_or("").to_string(),
        mux_role,
        mux_value,
        ..Default::default()
    };
    attrs.apply_to(&mut signal);

    if let Some(frame) = b.db.get_frame_by_key_mut(key) {
        frame.signals.push(signal);
    }
}

/// Parses `<bit_start>,<bit_length>`.
pub(crate) fn bit_range(b: &mut Builder, line: &SourceLine<'_>, token: &str) -> Option<(u16, u16)> {
    let parsed: Option<(u16, u16)> = token.split_once(',').and_then(|(start, len)| {
        Some((start.trim().parse::<u16>().ok()?, len.trim().parse::<u16>().ok()?))
    });
    if parsed.is_none() {
        b.report(Diagnostic::MalformedNumber {
            line: line.number,
            field: "bit range",
            text: token.to_string(),
        });
    }
    parsed
}

/// Keeps the `/e:` reference only if the enum was already declared.
pub(crate) fn resolve_value_table(
    b: &mut Builder,
    line: &SourceLine<'_>,
    signal: &str,
    name: Option<String>,
) -> Option<String> {
    let name: String = name?;
    if b.db.value_table(&name).is_some() {
        return Some(name);
    }
    b.report(Diagnostic::UnknownValueTable {
        line: line.number,
        signal: signal.to_string(),
        name,
    });
    None
}

fn malformed(b: &mut Builder, line: &SourceLine<'_>) {
    b.report(Diagnostic::MalformedLine {
        line: line.number,
        what: "signal",
        content: line.code.to_string(),
    });
}
