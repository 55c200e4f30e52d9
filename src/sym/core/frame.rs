use crate::sym::core::builder::Builder;
use crate::sym::core::strings::{SourceLine, unquote};
use crate::sym::types::{
    database::FrameKey,
    errors::Diagnostic,
    frame::IdFormat,
};

/// Opens (or re-opens) the frame named by a `[Name]` header.
pub(crate) fn open(b: &mut Builder, line: &SourceLine<'_>, name: &str) {
    let Some(direction) = b.section.direction() else {
        b.report(Diagnostic::OutsideSection {
            line: line.number,
            content: line.code.to_string(),
        });
        return;
    };
    if name.is_empty() {
        b.report(Diagnostic::MalformedLine {
            line: line.number,
            what: "frame header",
            content: line.code.to_string(),
        });
        b.current_frame = None;
        return;
    }

    let reopened: bool = b.db.get_frame_key_by_name(name).is_some();
    let key: FrameKey = b.db.add_frame_if_absent(name, direction);
    log::debug!(
        "line {}: {} frame '{}'",
        line.number,
        if reopened { "re-opening" } else { "opening" },
        name
    );
    b.current_frame = Some(key);
    b.current_mux = None;
}

/// `ID=<hex>h`; a trailing comment becomes the frame comment.
pub(crate) fn id(b: &mut Builder, line: &SourceLine<'_>, value: &str) {
    let Some(key) = b.frame_key(line) else {
        return;
    };
    let Some(id) = parse_hex(value) else {
        b.report(Diagnostic::MalformedNumber {
            line: line.number,
            field: "frame id",
            text: value.to_string(),
        });
        return;
    };
    if let Some(frame) = b.db.get_frame_by_key_mut(key) {
        frame.id = id;
        if let Some(comment) = line.comment {
            frame.comment = comment.to_string();
        }
    }
}

/// `Type=Extended`; anything else keeps the standard format.
pub(crate) fn id_type(b: &mut Builder, line: &SourceLine<'_>, value: &str) {
    let Some(key) = b.frame_key(line) else {
        return;
    };
    let id_format: IdFormat = if value.starts_with("Extended") {
        IdFormat::Extended
    } else {
        IdFormat::Standard
    };
    if let Some(frame) = b.db.get_frame_by_key_mut(key) {
        frame.id_format = id_format;
    }
}

/// `DLC=<bytes>`
pub(crate) fn dlc(b: &mut Builder, line: &SourceLine<'_>, value: &str) {
    let Some(key) = b.frame_key(line) else {
        return;
    };
    let Ok(byte_length) = value.parse::<u16>() else {
        b.report(Diagnostic::MalformedNumber {
            line: line.number,
            field: "DLC",
            text: value.to_string(),
        });
        return;
    };
    if let Some(frame) = b.db.get_frame_by_key_mut(key) {
        frame.byte_length = byte_length;
    }
}

/// `CycleTime=<ms>`
pub(crate) fn cycle_time(b: &mut Builder, line: &SourceLine<'_>, value: &str) {
    let Some(key) = b.frame_key(line) else {
        return;
    };
    let Ok(ms) = value.parse::<u32>() else {
        b.report(Diagnostic::MalformedNumber {
            line: line.number,
            field: "cycle time",
            text: value.to_string(),
        });
        return;
    };
    if let Some(frame) = b.db.get_frame_by_key_mut(key) {
        frame.cycle_time = Some(ms);
    }
}

/// Any other `Key=value` line inside a frame block.
pub(crate) fn attribute(b: &mut Builder, line: &SourceLine<'_>, key: &str, value: &str) {
    let Some(frame_key) = b.frame_key(line) else {
        return;
    };
    if let Some(frame) = b.db.get_frame_by_key_mut(frame_key) {
        frame
            .attributes
            .insert(key.to_string(), unquote(value).to_string());
    }
}

/// Parses a hexadecimal number with an optional trailing `h` (`0CFFC3F7h`, `1h`, `7FF`).
pub(crate) fn parse_hex(text: &str) -> Option<u32> {
    let digits: &str = text
        .trim()
        .strip_suffix(['h', 'H'])
        .unwrap_or(text.trim());
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
