//! Quote-aware line utilities for symbol files.
//!
//! Every splitter here goes through [`unquoted_char_indices`], so a delimiter
//! inside `"..."` (a `:` in a long name, a `,` in an enum label, a `//` in a
//! title) is never taken as structure. An unterminated quote swallows the rest
//! of the line.

/// One input line after comment removal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SourceLine<'a> {
    /// 1-based line number in the input.
    pub(crate) number: usize,
    /// Content before any unquoted `//`, trimmed.
    pub(crate) code: &'a str,
    /// Text after the unquoted `//`, trimmed.
    pub(crate) comment: Option<&'a str>,
    /// The line ends inside a quoted string.
    pub(crate) unterminated_quote: bool,
}

/// Splits `text` into numbered, comment-stripped lines.
pub(crate) fn source_lines(text: &str) -> impl Iterator<Item = SourceLine<'_>> + '_ {
    text.lines().enumerate().map(|(idx, raw)| {
        let (code, comment) = strip_comment(raw);
        SourceLine {
            number: idx + 1,
            code: code.trim(),
            comment: comment.map(str::trim),
            unterminated_quote: has_unterminated_quote(raw),
        }
    })
}

/// Yields the characters of `s` that are outside double quotes.
/// The quote characters themselves are never yielded.
pub(crate) fn unquoted_char_indices(s: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut in_quote: bool = false;
    s.char_indices().filter(move |&(_, ch)| {
        if ch == '"' {
            in_quote = !in_quote;
            return false;
        }
        !in_quote
    })
}

/// Splits off a trailing `// comment` that is not inside quotes.
pub(crate) fn strip_comment(line: &str) -> (&str, Option<&str>) {
    let mut prev_slash: Option<usize> = None;
    for (i, ch) in unquoted_char_indices(line) {
        if ch == '/' {
            if let Some(p) = prev_slash
                && p + 1 == i
            {
                return (&line[..p], Some(&line[i + 1..]));
            }
            prev_slash = Some(i);
        }
    }
    (line, None)
}

/// `true` if `s` holds an odd number of double quotes.
pub(crate) fn has_unterminated_quote(s: &str) -> bool {
    s.matches('"').count() % 2 == 1
}

/// Splits `s` on every unquoted character matching `is_delim`.
/// Segments are returned untrimmed; empty segments are kept.
pub(crate) fn split_quoted<P>(s: &str, is_delim: P) -> Vec<&str>
where
    P: Fn(char) -> bool,
{
    let mut out: Vec<&str> = Vec::new();
    let mut start: usize = 0;
    for (i, ch) in unquoted_char_indices(s) {
        if is_delim(ch) {
            out.push(&s[start..i]);
            start = i + ch.len_utf8();
        }
    }
    out.push(&s[start..]);
    out
}

/// Whitespace-separated tokens of `s`; quoted runs stay inside one token.
pub(crate) fn split_tokens(s: &str) -> Vec<&str> {
    split_quoted(s, char::is_whitespace)
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect()
}

/// Splits `s` at the first unquoted `delim`.
pub(crate) fn split_once_unquoted(s: &str, delim: char) -> Option<(&str, &str)> {
    let (i, ch) = unquoted_char_indices(s).find(|&(_, ch)| ch == delim)?;
    Some((&s[..i], &s[i + ch.len_utf8()..]))
}

/// Returns the first token of `s` and the (left-trimmed) remainder.
pub(crate) fn next_token(s: &str) -> Option<(&str, &str)> {
    let s: &str = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match unquoted_char_indices(s).find(|&(_, ch)| ch.is_whitespace()) {
        Some((i, _)) => Some((&s[..i], s[i..].trim_start())),
        None => Some((s, "")),
    }
}

/// Byte offset of the first unquoted `ch`.
pub(crate) fn find_unquoted(s: &str, ch: char) -> Option<usize> {
    unquoted_char_indices(s)
        .find(|&(_, c)| c == ch)
        .map(|(i, _)| i)
}

/// Byte offset of the last unquoted `ch`.
pub(crate) fn rfind_unquoted(s: &str, ch: char) -> Option<usize> {
    unquoted_char_indices(s)
        .filter(|&(_, c)| c == ch)
        .last()
        .map(|(i, _)| i)
}

/// Removes one pair of surrounding double quotes (or a lone opening quote).
pub(crate) fn unquote(s: &str) -> &str {
    let s: &str = s.trim();
    match s.strip_prefix('"') {
        Some(inner) => inner.strip_suffix('"').unwrap_or(inner),
        None => s,
    }
}
