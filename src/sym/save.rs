use std::collections::BTreeSet;
use std::fmt::{self, Write as FmtWrite};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::sym::types::{
    database::DatabaseSym,
    errors::SymSaveError,
    frame::{Direction, FrameSym, IdFormat, MuxGroup},
    literal::Literal,
    signal::{
        ATTR_DECIMAL_PLACES, ATTR_HEX_OUTPUT, ATTR_LONG_NAME, Endianness, MuxRole, SignalSym,
    },
};

const DEFAULT_FORMAT_VERSION: &str = "5.0";
const SECTIONS: [Direction; 3] = [Direction::Send, Direction::Receive, Direction::SendReceive];

/// Serializes a `DatabaseSym` into symbol-file text and writes it to `path`.
///
/// Ensures the destination has a `.sym` extension, creates intermediate
/// directories when needed, and reports structured `SymSaveError` variants
/// for path, I/O, or formatting failures.
pub fn save_to_file(path: &str, database: &DatabaseSym) -> Result<(), SymSaveError> {
    if !path.to_ascii_lowercase().ends_with(".sym") {
        return Err(SymSaveError::InvalidExtension {
            path: path.to_string(),
        });
    }

    let serialized: String = to_string(database)?;

    let path_ref: &Path = Path::new(path);
    if let Some(parent) = path_ref.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| SymSaveError::CreateDirectory {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let file = File::create(path_ref).map_err(|source| SymSaveError::CreateFile {
        path: path.to_string(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(serialized.as_bytes())
        .map_err(|source| SymSaveError::Write {
            path: path.to_string(),
            source,
        })?;
    writer.flush().map_err(|source| SymSaveError::Write {
        path: path.to_string(),
        source,
    })?;
    log::debug!("wrote '{}' ({} frames)", path, database.frames_order.len());
    Ok(())
}

/// Renders the whole database as a symbol file.
///
/// Layout: header lines, `{ENUMS}`, then `{SEND}`, `{RECEIVE}` and
/// `{SENDRECEIVE}` with their frames in insertion order. Empty sections are
/// left out. A multiplexed frame is written as one `[Name]` block per selector
/// value; the first block also carries the frame fields and the signals that
/// are always present.
pub fn to_string(db: &DatabaseSym) -> Result<String, SymSaveError> {
    let mut out = String::new();

    let version: &str = if db.format_version.is_empty() {
        DEFAULT_FORMAT_VERSION
    } else {
        &db.format_version
    };
    write_fmt(
        &mut out,
        format_args!("FormatVersion={} // Do not edit this line!\n", version),
    )?;
    if !db.title.is_empty() {
        check_quotable("title", &db.title)?;
        write_fmt(&mut out, format_args!("Title=\"{}\"\n", db.title))?;
    }
    for (key, value) in &db.attributes {
        write_fmt(&mut out, format_args!("{}={}\n", key, value))?;
    }

    if !db.value_tables.is_empty() {
        out.push_str("\n{ENUMS}\n");
        for table in db.value_tables.values() {
            for (_, label) in &table.entries {
                check_quotable("enum label", label)?;
            }
            let entries: Vec<String> = table
                .entries
                .iter()
                .map(|(code, label)| format!("{}=\"{}\"", code, label))
                .collect();
            write_fmt(
                &mut out,
                format_args!("enum {}({})\n", table.name, entries.join(", ")),
            )?;
        }
    }

    for direction in SECTIONS {
        let mut frames = db.iter_frames().filter(|f| f.direction == direction).peekable();
        if frames.peek().is_none() {
            continue;
        }
        write_fmt(&mut out, format_args!("\n{}\n", direction.header()))?;
        for frame in frames {
            write_frame(db, frame, &mut out)?;
        }
    }

    Ok(out)
}

/// Renders one signal as a `Var=` line (no trailing newline).
///
/// Numbers are written from their stored [`Literal`] text, so `/d:37` and
/// `/d:37.1` come back exactly as they were read.
///
/// The format has no escape for `"`: a quoted value holding one is written
/// as is. [`to_string`] and [`save_to_file`] refuse such signals instead.
pub fn signal_line(db: &DatabaseSym, signal: &SignalSym) -> String {
    let mut line = String::from("Var=");
    line.push_str(&quote_name(&signal.name));
    line.push(' ');
    line.push_str(signal.value_type.keyword());
    line.push_str(&format!(" {},{}", signal.bit_start, signal.bit_length));
    push_attributes(db, signal, &mut line);
    push_comment(&signal.comment, &mut line);
    line
}

fn write_frame(db: &DatabaseSym, frame: &FrameSym, out: &mut String) -> Result<(), SymSaveError> {
    write_fmt(out, format_args!("\n[{}]\n", frame.name))?;
    match frame.id_format {
        IdFormat::Extended => write_fmt(out, format_args!("ID={:08X}h", frame.id))?,
        IdFormat::Standard => write_fmt(out, format_args!("ID={:03X}h", frame.id))?,
    }
    push_comment(&frame.comment, out);
    out.push('\n');
    if frame.id_format == IdFormat::Extended {
        out.push_str("Type=Extended\n");
    }
    write_fmt(out, format_args!("DLC={}\n", frame.byte_length))?;
    if let Some(ms) = frame.cycle_time {
        write_fmt(out, format_args!("CycleTime={}\n", ms))?;
    }
    for (key, value) in &frame.attributes {
        write_fmt(out, format_args!("{}={}\n", key, value))?;
    }

    // always-present signals belong to the first block
    for signal in frame.signals.iter().filter(|s| s.mux_role == MuxRole::None) {
        check_signal(signal)?;
        write_fmt(out, format_args!("{}\n", signal_line(db, signal)))?;
    }

    let Some(selector) = frame.multiplexor() else {
        return Ok(());
    };

    let mut values: BTreeSet<u32> = frame.mux_groups.keys().copied().collect();
    values.extend(frame.signals.iter().filter_map(|s| s.mux_value));

    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            write_fmt(out, format_args!("\n[{}]\n", frame.name))?;
        }
        let group: MuxGroup = frame.mux_groups.get(&value).cloned().unwrap_or_else(|| MuxGroup {
            name: format!("{}_{:X}h", frame.name, value),
            ..Default::default()
        });
        check_quotable("multiplexer group", &group.name)?;
        check_signal(selector)?;
        out.push_str(&mux_line(db, selector, &group, value));
        out.push('\n');
        for signal in frame
            .signals
            .iter()
            .filter(|s| s.mux_role == MuxRole::Multiplexed && s.mux_value == Some(value))
        {
            check_signal(signal)?;
            write_fmt(out, format_args!("{}\n", signal_line(db, signal)))?;
        }
    }
    Ok(())
}

fn mux_line(db: &DatabaseSym, selector: &SignalSym, group: &MuxGroup, value: u32) -> String {
    let mut line = String::from("Mux=");
    line.push_str(&quote_name(&group.name));
    line.push_str(&format!(
        " {},{} {:X}h",
        selector.bit_start, selector.bit_length, value
    ));
    push_attributes(db, selector, &mut line);
    push_comment(&group.comment, &mut line);
    line
}

/// Everything after the bit range: switches, then `/tag:value` pairs.
fn push_attributes(db: &DatabaseSym, signal: &SignalSym, out: &mut String) {
    if signal.endian == Endianness::Motorola {
        out.push_str(" -m");
    }
    if signal
        .attributes
        .get(ATTR_HEX_OUTPUT)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    {
        out.push_str(" -h");
    }
    if !signal.unit.is_empty() {
        out.push_str(" /u:");
        out.push_str(&quote_value(&signal.unit));
    }
    if let Some(factor) = &signal.factor
        && factor.value() != 1.0
    {
        out.push_str(&format!(" /f:{}", factor));
    }
    if let Some(offset) = &signal.offset
        && offset.value() != 0.0
    {
        out.push_str(&format!(" /o:{}", offset));
    }
    if let Some(min) = &signal.min {
        out.push_str(&format!(" /min:{}", min));
    }
    if let Some(max) = &signal.max {
        out.push_str(&format!(" /max:{}", max));
    }
    if let Some(places) = signal.attributes.get(ATTR_DECIMAL_PLACES) {
        out.push_str(&format!(" /p:{}", places));
    }
    if let Some(table) = &signal.value_table
        && db.value_table(table).is_some()
    {
        out.push_str(&format!(" /e:{}", table));
    }
    if let Some(initial) = &signal.initial_value
        && within_limits(signal, initial)
    {
        out.push_str(&format!(" /d:{}", initial));
    }
    if let Some(long_name) = signal.long_name() {
        out.push_str(&format!(" /ln:\"{}\"", long_name));
    }
    for (tag, value) in &signal.attributes {
        if matches!(
            tag.as_str(),
            ATTR_LONG_NAME | ATTR_DECIMAL_PLACES | ATTR_HEX_OUTPUT
        ) {
            continue;
        }
        out.push_str(&format!(" /{}:{}", tag, quote_value(value)));
    }
}

/// Every text of `signal` that may end up between quotes.
fn check_signal(signal: &SignalSym) -> Result<(), SymSaveError> {
    check_quotable("signal name", &signal.name)?;
    check_quotable("unit", &signal.unit)?;
    for value in signal.attributes.values() {
        check_quotable("attribute value", value)?;
    }
    Ok(())
}

fn check_quotable(what: &'static str, text: &str) -> Result<(), SymSaveError> {
    if text.contains('"') {
        return Err(SymSaveError::EmbeddedQuote {
            what,
            text: text.to_string(),
        });
    }
    Ok(())
}

fn within_limits(signal: &SignalSym, value: &Literal) -> bool {
    let above_min: bool = signal.min.as_ref().is_none_or(|m| value.value() >= m.value());
    let below_max: bool = signal.max.as_ref().is_none_or(|m| value.value() <= m.value());
    above_min && below_max
}

fn push_comment(comment: &str, out: &mut String) {
    if !comment.is_empty() {
        out.push_str("\t// ");
        out.push_str(comment);
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name)
    }
}

fn quote_value(value: &str) -> String {
    if value.contains(char::is_whitespace) || value.contains("//") {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

fn write_fmt(out: &mut String, args: fmt::Arguments<'_>) -> Result<(), SymSaveError> {
    out.write_fmt(args).map_err(|_| SymSaveError::Format)
}
