use crate::sym::core::builder::Builder;
use crate::sym::core::strings::{SourceLine, split_once_unquoted};
use crate::sym::types::{errors::Diagnostic, frame::Direction};

/// Active section of the document.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Section {
    /// Before the first `{...}` header, or after an unknown one.
    #[default]
    Outside,
    Send,
    Receive,
    SendReceive,
    Enums,
}

impl Section {
    /// Section selected by a `{NAME}` header (name without braces).
    pub(crate) fn from_header(name: &str) -> Option<Section> {
        match name {
            "SEND" => Some(Section::Send),
            "RECEIVE" => Some(Section::Receive),
            "SENDRECEIVE" => Some(Section::SendReceive),
            "ENUMS" => Some(Section::Enums),
            _ => None,
        }
    }

    /// Direction of frames declared in this section; `None` outside message sections.
    pub(crate) fn direction(&self) -> Option<Direction> {
        match self {
            Section::Send => Some(Direction::Send),
            Section::Receive => Some(Direction::Receive),
            Section::SendReceive => Some(Direction::SendReceive),
            Section::Outside | Section::Enums => None,
        }
    }
}

/// Classification of a comment-stripped line by its prefix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum LineKind<'a> {
    Blank,
    /// `{NAME}`, carries `NAME`.
    SectionHeader(&'a str),
    /// `[Name]`, carries `Name`.
    FrameHeader(&'a str),
    FormatVersion(&'a str),
    Title(&'a str),
    Id(&'a str),
    Type(&'a str),
    Dlc(&'a str),
    CycleTime(&'a str),
    Var(&'a str),
    Mux(&'a str),
    /// `enum ...`, carries the whole line.
    Enum(&'a str),
    /// Any other `Key=value` line.
    KeyValue(&'a str, &'a str),
    Other(&'a str),
}

pub(crate) fn classify(code: &str) -> LineKind<'_> {
    if code.is_empty() {
        return LineKind::Blank;
    }
    if let Some(inner) = code.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        return LineKind::SectionHeader(inner.trim());
    }
    if let Some(inner) = code.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        return LineKind::FrameHeader(inner.trim());
    }
    if let Some(rest) = code.strip_prefix("enum")
        && rest.starts_with(char::is_whitespace)
    {
        return LineKind::Enum(code);
    }

    let Some((key, value)) = split_once_unquoted(code, '=') else {
        return LineKind::Other(code);
    };
    let value: &str = value.trim();
    match key.trim() {
        "FormatVersion" => LineKind::FormatVersion(value),
        "Title" => LineKind::Title(value),
        "ID" => LineKind::Id(value),
        "Type" => LineKind::Type(value),
        "DLC" => LineKind::Dlc(value),
        "CycleTime" => LineKind::CycleTime(value),
        "Var" => LineKind::Var(value),
        "Mux" => LineKind::Mux(value),
        "" => LineKind::Other(code),
        key => LineKind::KeyValue(key, value),
    }
}

/// Switches the active section on a `{NAME}` header.
/// Leaving a section closes the frame under construction.
pub(crate) fn enter(b: &mut Builder, line: &SourceLine<'_>, name: &str) {
    let next: Section = match Section::from_header(name) {
        Some(section) => section,
        None => {
            b.report(Diagnostic::UnknownSection {
                line: line.number,
                name: name.to_string(),
            });
            Section::Outside
        }
    };
    log::debug!("line {}: entering section {:?}", line.number, next);
    b.section = next;
    b.current_frame = None;
    b.current_mux = None;
}
