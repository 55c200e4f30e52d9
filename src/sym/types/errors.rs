use std::io;
use std::slice;
use thiserror::Error;

/// Non-fatal anomaly found while parsing a symbol file.
///
/// Every variant carries the 1-based source line it was found on. The rendered
/// message always starts with `line <N>: `.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Diagnostic {
    #[error(
        "line {line}: multiplexer value {value:X}h of '{new}' is already used by '{old}' (line {old_line})"
    )]
    DuplicateMuxValue {
        line: usize,
        value: u32,
        old: String,
        old_line: usize,
        new: String,
    },
    #[error("line {line}: signal '{signal}' references undefined enum '{name}'")]
    UnknownValueTable {
        line: usize,
        signal: String,
        name: String,
    },
    #[error("line {line}: unknown type '{type_name}' for signal '{signal}'")]
    UnknownSignalType {
        line: usize,
        signal: String,
        type_name: String,
    },
    #[error(
        "line {line}: '{type_name}' signal '{signal}' declared with {declared} bits, using {expected}"
    )]
    FloatLengthMismatch {
        line: usize,
        signal: String,
        type_name: String,
        declared: u16,
        expected: u16,
    },
    #[error("line {line}: '{text}' is not a valid {field}")]
    MalformedNumber {
        line: usize,
        field: &'static str,
        text: String,
    },
    #[error("line {line}: malformed {what} line '{content}'")]
    MalformedLine {
        line: usize,
        what: &'static str,
        content: String,
    },
    #[error("line {line}: unterminated quoted string")]
    UnterminatedQuote { line: usize },
    #[error("line {line}: enum '{name}' is missing its closing parenthesis")]
    UnterminatedEnum { line: usize, name: String },
    #[error(
        "line {line}: code {code} of enum '{name}' is already '{kept}', entry '{dropped}' ignored"
    )]
    DuplicateEnumCode {
        line: usize,
        name: String,
        code: i64,
        kept: String,
        dropped: String,
    },
    #[error("line {line}: malformed entry '{entry}' in enum '{name}'")]
    MalformedEnumEntry {
        line: usize,
        name: String,
        entry: String,
    },
    #[error("line {line}: '{content}' appears before any frame header")]
    NoCurrentFrame { line: usize, content: String },
    #[error("line {line}: '{content}' is outside of any message section")]
    OutsideSection { line: usize, content: String },
    #[error("line {line}: unrecognized line '{content}'")]
    UnrecognizedLine { line: usize, content: String },
    #[error("line {line}: unknown section '{name}'")]
    UnknownSection { line: usize, name: String },
    #[error("line {line}: unexpected token '{token}' after signal '{signal}'")]
    UnexpectedToken {
        line: usize,
        signal: String,
        token: String,
    },
}

impl Diagnostic {
    /// 1-based source line the diagnostic refers to.
    pub fn line(&self) -> usize {
        match self {
            Diagnostic::DuplicateMuxValue { line, .. }
            | Diagnostic::UnknownValueTable { line, .. }
            | Diagnostic::UnknownSignalType { line, .. }
            | Diagnostic::FloatLengthMismatch { line, .. }
            | Diagnostic::MalformedNumber { line, .. }
            | Diagnostic::MalformedLine { line, .. }
            | Diagnostic::UnterminatedQuote { line }
            | Diagnostic::UnterminatedEnum { line, .. }
            | Diagnostic::DuplicateEnumCode { line, .. }
            | Diagnostic::MalformedEnumEntry { line, .. }
            | Diagnostic::NoCurrentFrame { line, .. }
            | Diagnostic::OutsideSection { line, .. }
            | Diagnostic::UnrecognizedLine { line, .. }
            | Diagnostic::UnknownSection { line, .. }
            | Diagnostic::UnexpectedToken { line, .. } => *line,
        }
    }
}

/// Append-only, encounter-ordered collection of [`Diagnostic`]s.
#[derive(Clone, Debug, Default)]
pub struct ErrorSink {
    entries: Vec<Diagnostic>,
}

impl ErrorSink {
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// Text that could not be read as a numeric literal.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("'{text}' is not a valid number")]
pub struct InvalidLiteral {
    pub text: String,
}

/// Errors produced while loading a `.sym` file from disk.
#[derive(Debug, Error)]
pub enum SymParseError {
    #[error("Not a valid .sym file: {path}")]
    InvalidExtension { path: String },
    #[error("Failed to open '{path}'. \nError: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Errors produced while saving a [`DatabaseSym`](crate::sym::types::database::DatabaseSym)
/// into a `.sym` file.
#[derive(Debug, Error)]
pub enum SymSaveError {
    #[error("Output path must end in .sym: {path}")]
    InvalidExtension { path: String },
    #[error("Failed to create '{path}'. \nError: {source}")]
    CreateFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to create directories for '{path}'. \nError: {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while writing '{path}'. \nError: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Cannot write {what} '{text}': symbol files have no escape for '\"'")]
    EmbeddedQuote { what: &'static str, text: String },
    #[error("Failed to format SYM content")]
    Format,
}
