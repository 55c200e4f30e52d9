use crate::sym::core::strings::{
    find_unquoted, rfind_unquoted, split_once_unquoted, split_quoted, unquote,
};
use crate::sym::types::{database::ValueTable, errors::Diagnostic};

/// `true` once the declaration holds its closing `)` (outside quotes).
pub(crate) fn is_complete(text: &str) -> bool {
    match (find_unquoted(text, '('), rfind_unquoted(text, ')')) {
        (Some(open), Some(close)) => close > open,
        _ => false,
    }
}

/// Decode an `enum` declaration, already joined into one string:
/// `enum <Name>(<code>="<label>", <code>="<label>", ...)`
///
/// `spans` maps byte offsets of `text` to source lines, one `(offset, line)`
/// per joined line, the first at offset 0. Declaration-level problems are
/// reported on the first line, entry problems on the line the entry starts on.
///
/// Entries are separated by commas outside quotes, so labels may contain `,`,
/// `:` or `=`. A missing closing parenthesis is reported and the entries read
/// so far are kept. A repeated code keeps its first label.
pub(crate) fn decode(
    text: &str,
    spans: &[(usize, usize)],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ValueTable> {
    let line: usize = line_at(spans, 0);
    let body: &str = text.trim_start().strip_prefix("enum").unwrap_or(text).trim();

    let Some(open) = find_unquoted(body, '(') else {
        diagnostics.push(Diagnostic::MalformedLine {
            line,
            what: "enum",
            content: text.to_string(),
        });
        return None;
    };
    let name: &str = body[..open].trim();
    if name.is_empty() {
        diagnostics.push(Diagnostic::MalformedLine {
            line,
            what: "enum",
            content: text.to_string(),
        });
        return None;
    }

    let inner: &str = match rfind_unquoted(body, ')') {
        Some(close) if close > open => &body[open + 1..close],
        _ => {
            diagnostics.push(Diagnostic::UnterminatedEnum {
                line,
                name: name.to_string(),
            });
            &body[open + 1..]
        }
    };

    let mut table: ValueTable = ValueTable {
        name: name.to_string(),
        entries: Vec::new(),
    };
    for raw in split_quoted(inner, |c| c == ',') {
        let entry: &str = raw.trim();
        if entry.is_empty() {
            continue;
        }
        let entry_line: usize = line_at(spans, offset_in(text, entry));
        let parsed: Option<(i64, &str)> = split_once_unquoted(entry, '=')
            .and_then(|(code, label)| Some((code.trim().parse::<i64>().ok()?, label)));
        let Some((code, label)) = parsed else {
            diagnostics.push(Diagnostic::MalformedEnumEntry {
                line: entry_line,
                name: name.to_string(),
                entry: entry.to_string(),
            });
            continue;
        };
        let label: &str = unquote(label);
        match table.get(code) {
            Some(kept) => diagnostics.push(Diagnostic::DuplicateEnumCode {
                line: entry_line,
                name: name.to_string(),
                code,
                kept: kept.to_string(),
                dropped: label.to_string(),
            }),
            None => table.entries.push((code, label.to_string())),
        }
    }

    Some(table)
}

/// Source line holding byte `offset` of the joined text.
fn line_at(spans: &[(usize, usize)], offset: usize) -> usize {
    let idx: usize = spans.partition_point(|&(start, _)| start <= offset);
    spans[..idx].last().map(|&(_, line)| line).unwrap_or_default()
}

// `inner` is always a subslice of `outer` here.
fn offset_in(outer: &str, inner: &str) -> usize {
    (inner.as_ptr() as usize).saturating_sub(outer.as_ptr() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_comma_stays_in_label() {
        let mut diags: Vec<Diagnostic> = Vec::new();
        let table: ValueTable = decode(
            "enum State(0=\"Power On Reset, and a quoted comma\", 1=\"Ready,set,go\", 2=\"Following\",3=\"Fault\")",
            &[(0, 5)],
            &mut diags,
        )
        .unwrap();
        assert!(diags.is_empty());
        assert_eq!(table.name, "State");
        assert_eq!(table.len(), 4);
        assert_eq!(table.get(0), Some("Power On Reset, and a quoted comma"));
        assert_eq!(table.get(1), Some("Ready,set,go"));
        assert_eq!(table.get(3), Some("Fault"));
    }

    #[test]
    fn test_whitespace_and_trailing_comma() {
        let mut diags: Vec<Diagnostic> = Vec::new();
        let table: ValueTable =
            decode("enum  Relay ( 0 = \"Open\" ,1=\"Closed\",  )", &[(0, 1)], &mut diags).unwrap();
        assert!(diags.is_empty());
        assert_eq!(table.name, "Relay");
        assert_eq!(table.get(0), Some("Open"));
        assert_eq!(table.get(1), Some("Closed"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_entries_keep_declaration_order() {
        let mut diags: Vec<Diagnostic> = Vec::new();
        let table: ValueTable =
            decode("enum Gear(3=\"D\", 0=\"P\", 1=\"R\")", &[(0, 1)], &mut diags).unwrap();
        let codes: Vec<i64> = table.entries.iter().map(|(code, _)| *code).collect();
        assert_eq!(codes, vec![3, 0, 1]);
    }

    #[test]
    fn test_is_complete() {
        assert!(is_complete("enum A(0=\"a\")"));
        assert!(!is_complete("enum A(0=\"a\","));
        assert!(!is_complete("enum A(0=\"a)\","));
        assert!(!is_complete("enum A"));
    }

    #[test]
    fn test_bad_entries_and_unclosed_block() {
        let mut diags: Vec<Diagnostic> = Vec::new();
        let table: ValueTable = decode("enum B(x=\"bad\", 2=\"ok\"", &[(0, 9)], &mut diags).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(2), Some("ok"));
        assert_eq!(diags.len(), 2);
        assert!(matches!(diags[0], Diagnostic::UnterminatedEnum { line: 9, .. }));
        assert!(matches!(diags[1], Diagnostic::MalformedEnumEntry { line: 9, .. }));
    }

    #[test]
    fn test_entry_reported_on_its_own_line() {
        // "enum A(0=\"a\"," on line 4, "x=\"bad\"," on 5, "1=\"b\")" on 6
        let text: &str = "enum A(0=\"a\", x=\"bad\", 1=\"b\")";
        let second: usize = text.find('x').unwrap();
        let third: usize = text.find("1=").unwrap();
        let mut diags: Vec<Diagnostic> = Vec::new();
        let table: ValueTable =
            decode(text, &[(0, 4), (second, 5), (third, 6)], &mut diags).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags[0], Diagnostic::MalformedEnumEntry { line: 5, .. }));
    }

    #[test]
    fn test_repeated_code_keeps_first_label() {
        let mut diags: Vec<Diagnostic> = Vec::new();
        let table: ValueTable =
            decode("enum A(0=\"a\", 0=\"b\")", &[(0, 2)], &mut diags).unwrap();
        assert_eq!(table.entries, vec![(0, "a".to_string())]);
        assert_eq!(diags.len(), 1);
        assert!(matches!(
            &diags[0],
            Diagnostic::DuplicateEnumCode { line: 2, code: 0, kept, dropped, .. }
                if kept == "a" && dropped == "b"
        ));
    }

    #[test]
    fn test_missing_parenthesis_is_rejected() {
        let mut diags: Vec<Diagnostic> = Vec::new();
        assert!(decode("enum Broken", &[(0, 3)], &mut diags).is_none());
        assert_eq!(diags.len(), 1);
    }
}
