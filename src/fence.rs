//! Fence info-string parsing and highlight-range grammar.
//!
//! The info string of an opening fence has the shape
//! `<language>[:<descriptor>]`, optionally followed by whitespace and free
//! meta text. A descriptor is a brace-wrapped list of line terms:
//! `{1,3-5}` marks line 1 plus the half-open range 3..5 (lines 3 and 4).
//! A descriptor may also appear as the first meta term (` {2}` after the
//! language word); any remaining meta text is carried verbatim, never parsed.

use std::collections::BTreeSet;

/// Parsed fields of a fence info string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FenceInfo {
    /// Language word, `plaintext` when absent.
    pub language: String,
    /// One-based line numbers to mark as highlighted.
    pub highlighted_lines: BTreeSet<usize>,
}

/// Parse the info event text into language and highlight lines.
///
/// Never fails: a malformed descriptor degrades to an empty highlight set and
/// an empty info string degrades to the `plaintext` language.
pub fn parse_fence_info(info: &str) -> FenceInfo {
    let info = info.trim();
    let (head, tail) = match info.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (info, ""),
    };
    let (language, descriptor) = match head.split_once(':') {
        Some((language, descriptor)) => (language, Some(descriptor)),
        None => (head, None),
    };
    let language = if language.is_empty() {
        "plaintext"
    } else {
        language
    };

    let mut highlighted_lines = BTreeSet::new();
    for candidate in [descriptor, (!tail.is_empty()).then_some(tail)]
        .into_iter()
        .flatten()
    {
        match parse_highlight_ranges(candidate) {
            Some(lines) => highlighted_lines.extend(lines),
            None => {
                log::debug!("ignoring malformed highlight descriptor `{candidate}`");
            }
        }
    }

    FenceInfo {
        language: language.to_string(),
        highlighted_lines,
    }
}

/// Parse a `{...}` highlight descriptor into a set of one-based line numbers.
///
/// Terms are single numbers (`{3}`) or half-open ranges (`{3-5}` marks lines
/// 3 and 4; a reversed `{5-3}` is normalized first). Returns `None` when the
/// descriptor is not brace-wrapped, empty, or contains a malformed term.
pub fn parse_highlight_ranges(descriptor: &str) -> Option<BTreeSet<usize>> {
    let inner = descriptor.strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() {
        return None;
    }
    let mut lines = BTreeSet::new();
    for term in inner.split(',') {
        if let Some((start, end)) = term.split_once('-') {
            let start: usize = start.parse().ok()?;
            let end: usize = end.parse().ok()?;
            let (low, high) = if start <= end {
                (start, end)
            } else {
                (end, start)
            };
            lines.extend(low..high);
        } else {
            lines.insert(term.parse().ok()?);
        }
    }
    Some(lines)
}

/// Split a parsed language word and meta string into the info event text and
/// the remaining meta text.
///
/// A leading brace-wrapped meta term is folded into the info text so the
/// highlight grammar sees it; everything after it stays meta.
pub(crate) fn split_info_meta<'m>(language: &str, meta: &'m str) -> (String, &'m str) {
    let meta = meta.trim();
    let (first, rest) = match meta.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (meta, ""),
    };
    if first.len() >= 2 && first.starts_with('{') && first.ends_with('}') {
        (format!("{language} {first}"), rest)
    } else {
        (language.to_string(), meta)
    }
}

/// Detect a fence opener on the first line of a code construct's source.
///
/// Returns the marker character and run length when the line starts (after at
/// most three spaces of indentation) with a run of three or more backticks or
/// tildes.
pub(crate) fn opening_marker(slice: &str) -> Option<(char, usize)> {
    let first_line = slice.lines().next().unwrap_or(slice);
    let after_indent = first_line.trim_start_matches(' ');
    if first_line.len() - after_indent.len() > 3 {
        return None;
    }
    let mut chars = after_indent.chars();
    let marker = chars.next().filter(|c| *c == '`' || *c == '~')?;
    let run = 1 + chars.take_while(|c| *c == marker).count();
    (run >= 3).then_some((marker, run))
}

/// Whether a fenced construct's source ends with a valid closing fence.
///
/// The closer must use the same marker, be at least as long as the opener,
/// carry at most three spaces of indentation, and have nothing but whitespace
/// after the marker run.
pub(crate) fn has_closing_fence(slice: &str, marker: char, open_len: usize) -> bool {
    let mut lines = slice.lines();
    if lines.next().is_none() {
        return false;
    }
    let Some(last) = lines.last() else {
        return false;
    };
    // Inside a block quote the construct's source lines keep their `> `
    // prefixes; the closer is still a closer.
    let last = strip_block_quote_markers(last);
    let after_indent = last.trim_start_matches(' ');
    if last.len() - after_indent.len() > 3 {
        return false;
    }
    let run = after_indent.chars().take_while(|c| *c == marker).count();
    run >= open_len && after_indent[run..].chars().all(char::is_whitespace)
}

/// Strip leading `>` quote markers (each with up to three spaces of
/// indentation and one optional trailing space) from a line.
fn strip_block_quote_markers(line: &str) -> &str {
    let mut rest = line;
    loop {
        let trimmed = rest.trim_start_matches(' ');
        if rest.len() - trimmed.len() > 3 {
            return rest;
        }
        match trimmed.strip_prefix('>') {
            Some(after) => rest = after.strip_prefix(' ').unwrap_or(after),
            None => return rest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(numbers: &[usize]) -> BTreeSet<usize> {
        numbers.iter().copied().collect()
    }

    #[test]
    fn parses_single_lines_and_half_open_ranges() {
        assert_eq!(parse_highlight_ranges("{2}"), Some(lines(&[2])));
        assert_eq!(parse_highlight_ranges("{1,3-5}"), Some(lines(&[1, 3, 4])));
        assert_eq!(parse_highlight_ranges("{1,2,3}"), Some(lines(&[1, 2, 3])));
    }

    #[test]
    fn normalizes_reversed_ranges() {
        assert_eq!(parse_highlight_ranges("{5-3}"), Some(lines(&[3, 4])));
    }

    #[test]
    fn degenerate_range_marks_nothing() {
        assert_eq!(parse_highlight_ranges("{3-3}"), Some(lines(&[])));
    }

    #[test]
    fn rejects_malformed_descriptors() {
        assert_eq!(parse_highlight_ranges("{}"), None);
        assert_eq!(parse_highlight_ranges("{a}"), None);
        assert_eq!(parse_highlight_ranges("{1,x}"), None);
        assert_eq!(parse_highlight_ranges("{1, 2}"), None);
        assert_eq!(parse_highlight_ranges("1-3"), None);
        assert_eq!(parse_highlight_ranges("{1-}"), None);
    }

    #[test]
    fn parses_colon_joined_info() {
        let info = parse_fence_info("js:{1,3-5}");
        assert_eq!(info.language, "js");
        assert_eq!(info.highlighted_lines, lines(&[1, 3, 4]));
    }

    #[test]
    fn parses_space_separated_descriptor() {
        let info = parse_fence_info("js {2}");
        assert_eq!(info.language, "js");
        assert_eq!(info.highlighted_lines, lines(&[2]));
    }

    #[test]
    fn malformed_descriptor_degrades_to_empty_set() {
        let info = parse_fence_info("js:{bogus}");
        assert_eq!(info.language, "js");
        assert!(info.highlighted_lines.is_empty());
    }

    #[test]
    fn non_descriptor_after_colon_is_ignored() {
        let info = parse_fence_info("ts:filename");
        assert_eq!(info.language, "ts");
        assert!(info.highlighted_lines.is_empty());
    }

    #[test]
    fn empty_info_is_plaintext() {
        let info = parse_fence_info("");
        assert_eq!(info.language, "plaintext");
        assert!(info.highlighted_lines.is_empty());
    }

    #[test]
    fn splits_leading_descriptor_out_of_meta() {
        assert_eq!(
            split_info_meta("js", "{2} title.js"),
            ("js {2}".to_string(), "title.js")
        );
        assert_eq!(split_info_meta("js", "{2}"), ("js {2}".to_string(), ""));
        assert_eq!(
            split_info_meta("js", "title {2}"),
            ("js".to_string(), "title {2}")
        );
        assert_eq!(split_info_meta("js", ""), ("js".to_string(), ""));
    }

    #[test]
    fn detects_fence_openers() {
        assert_eq!(opening_marker("```js\ncode\n```"), Some(('`', 3)));
        assert_eq!(opening_marker("~~~~\ncode\n~~~~"), Some(('~', 4)));
        assert_eq!(opening_marker("   ```"), Some(('`', 3)));
        assert_eq!(opening_marker("    ```"), None);
        assert_eq!(opening_marker("``"), None);
        assert_eq!(opening_marker("text"), None);
    }

    #[test]
    fn detects_closing_fences() {
        assert!(has_closing_fence("```\na\n```", '`', 3));
        assert!(has_closing_fence("```\na\n`````", '`', 3));
        assert!(has_closing_fence("```\na\n  ```", '`', 3));
        assert!(!has_closing_fence("```\na", '`', 3));
        assert!(!has_closing_fence("```", '`', 3));
        assert!(!has_closing_fence("````\na\n```", '`', 4));
        assert!(!has_closing_fence("```\na\n~~~", '`', 3));
    }

    #[test]
    fn closing_fence_may_carry_quote_markers() {
        assert!(has_closing_fence("```\n> a\n> ```", '`', 3));
        assert!(has_closing_fence("```\n> > a\n> > ```", '`', 3));
        assert!(has_closing_fence("```\n>a\n>```", '`', 3));
        assert!(!has_closing_fence("```\n> a\n> ``", '`', 3));
    }
}
