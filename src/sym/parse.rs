use crate::sym::core::{
    builder::Builder,
    enums, frame, mux,
    section::{self, LineKind, Section},
    strings::{self, SourceLine},
    var,
};
use crate::sym::types::{
    database::DatabaseSym,
    errors::{Diagnostic, SymParseError},
};

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::iter::Peekable;

use encoding_rs::{UTF_8, WINDOWS_1252};

/// Parses the text of a symbol file into a [`DatabaseSym`].
///
/// The document is read in a single pass, line by line, driven by the active
/// section (`{SEND}`, `{RECEIVE}`, `{SENDRECEIVE}`, `{ENUMS}`):
/// - **Header** (`FormatVersion=`, `Title=`, other `Key=value` lines before the first section)
/// - **Enums** (`enum Name(0="a", 1="b")`, possibly spread over several lines)
/// - **Frames** (`[Name]` blocks with `ID=`, `Type=`, `DLC=`, `CycleTime=`)
/// - **Signals** (`Var=` lines) and **multiplexers** (`Mux=` lines)
///
/// Nothing in the input aborts parsing. Every anomaly (bad number, unknown
/// type, undefined enum, colliding multiplexer value, ...) is returned as a
/// [`Diagnostic`], in line order, next to a best-effort database. An empty
/// diagnostics vector means the document was read cleanly.
///
/// # Example
/// ```
/// let text = "FormatVersion=5.0\n{SEND}\n[Status]\nID=123h\nDLC=8\nVar=Speed unsigned 0,16 /u:kmh\n";
/// let (db, diagnostics) = can_sym::sym::parse(text);
/// assert!(diagnostics.is_empty());
/// let frame = db.get_frame_by_name("Status").unwrap();
/// assert_eq!(frame.id, 0x123);
/// assert_eq!(frame.signals[0].unit, "kmh");
/// ```
pub fn parse(text: &str) -> (DatabaseSym, Vec<Diagnostic>) {
    let mut b: Builder = Builder::default();
    let mut lines = strings::source_lines(text).peekable();

    while let Some(line) = lines.next() {
        if line.unterminated_quote {
            b.report(Diagnostic::UnterminatedQuote { line: line.number });
        }

        match section::classify(line.code) {
            LineKind::Blank => {}
            LineKind::SectionHeader(name) => section::enter(&mut b, &line, name),
            LineKind::FormatVersion(value) => b.db.format_version = value.to_string(),
            LineKind::Title(value) => b.db.title = strings::unquote(value).to_string(),
            LineKind::Enum(_) if b.section == Section::Enums => {
                decode_enum(&mut b, line, &mut lines);
            }
            LineKind::FrameHeader(name) => frame::open(&mut b, &line, name),
            LineKind::Id(value) => frame::id(&mut b, &line, value),
            LineKind::Type(value) => frame::id_type(&mut b, &line, value),
            LineKind::Dlc(value) => frame::dlc(&mut b, &line, value),
            LineKind::CycleTime(value) => frame::cycle_time(&mut b, &line, value),
            LineKind::Var(body) => var::decode(&mut b, &line, body),
            LineKind::Mux(body) => mux::decode(&mut b, &line, body),
            LineKind::KeyValue(key, value) if b.section == Section::Outside => {
                b.db.attributes
                    .insert(key.to_string(), strings::unquote(value).to_string());
            }
            LineKind::KeyValue(key, value) => frame::attribute(&mut b, &line, key, value),
            LineKind::Enum(_) | LineKind::Other(_) => {
                b.report(Diagnostic::UnrecognizedLine {
                    line: line.number,
                    content: line.code.to_string(),
                });
            }
        }
    }

    b.finish()
}

/// Parses a `.sym` file from disk and returns the database with its diagnostics.
///
/// The file is decoded as UTF-8 when it is valid UTF-8 (a BOM is dropped),
/// otherwise as Windows-1252, the encoding written by the vendor's editor.
/// A UTF-16 BOM is honored as well.
///
/// # Errors
/// Returns an `Err(SymParseError)` if:
/// - The path does not end in `.sym`.
/// - The file cannot be opened.
/// - There are I/O errors while reading.
///
/// Problems in the content itself never fail; see [`parse`].
pub fn from_file(path: &str) -> Result<(DatabaseSym, Vec<Diagnostic>), SymParseError> {
    // check if provided file has .sym format
    if !path.to_ascii_lowercase().ends_with(".sym") {
        return Err(SymParseError::InvalidExtension {
            path: path.to_string(),
        });
    }

    let file: File = File::open(path).map_err(|source| SymParseError::OpenFile {
        path: path.to_string(),
        source,
    })?;
    let mut reader: BufReader<File> = BufReader::new(file);

    // read raw bytes
    let mut bytes: Vec<u8> = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| SymParseError::Read {
            path: path.to_string(),
            source,
        })?;

    let text: Cow<'_, str> = decode_text(&bytes);
    log::debug!("parsing '{}' ({} bytes)", path, bytes.len());
    Ok(parse(&text))
}

fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, _) = if std::str::from_utf8(bytes).is_ok() {
        UTF_8.decode(bytes)
    } else {
        WINDOWS_1252.decode(bytes)
    };
    text
}

// An enum continues on the following lines until its ')' shows up. A section
// header, frame header or new enum ends it early. Diagnostics of the joined
// lines are reported together, in line order.
fn decode_enum<'a, I>(b: &mut Builder, first: SourceLine<'a>, lines: &mut Peekable<I>)
where
    I: Iterator<Item = SourceLine<'a>>,
{
    let mut text: String = first.code.to_string();
    let mut spans: Vec<(usize, usize)> = vec![(0, first.number)];
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    while !enums::is_complete(&text) {
        let Some(next) = lines.next_if(|l| !starts_block(l.code)) else {
            break;
        };
        if next.unterminated_quote {
            diagnostics.push(Diagnostic::UnterminatedQuote { line: next.number });
        }
        text.push(' ');
        spans.push((text.len(), next.number));
        text.push_str(next.code);
    }

    let table = enums::decode(&text, &spans, &mut diagnostics);
    diagnostics.sort_by_key(Diagnostic::line);
    for diagnostic in diagnostics {
        b.report(diagnostic);
    }

    if let Some(table) = table {
        log::debug!(
            "line {}: enum '{}' with {} entries",
            first.number,
            table.name,
            table.len()
        );
        b.db.add_value_table(table);
    }
}

fn starts_block(code: &str) -> bool {
    matches!(
        section::classify(code),
        LineKind::SectionHeader(_) | LineKind::FrameHeader(_) | LineKind::Enum(_)
    )
}
