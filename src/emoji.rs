//! GitHub-style `:alias:` emoji substitution.

use std::borrow::Cow;

/// Replace known `:alias:` shortcodes with their emoji.
///
/// Unknown aliases and stray colons pass through untouched. Borrowing the
/// input when nothing matches keeps the pre-parse pass free for plain prose.
pub fn replace_aliases(input: &str) -> Cow<'_, str> {
    let Some(first_colon) = input.find(':') else {
        return Cow::Borrowed(input);
    };

    let mut out = String::with_capacity(input.len());
    out.push_str(&input[..first_colon]);
    let mut rest = &input[first_colon..];
    let mut replaced = false;

    while let Some(start) = rest.find(':') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let alias_end = after.find(|c: char| !is_alias_char(c));
        match alias_end {
            Some(end) if end > 0 && after[end..].starts_with(':') => {
                let alias = &after[..end];
                if let Some(emoji) = emojis::get_by_shortcode(alias) {
                    out.push_str(emoji.as_str());
                    rest = &after[end + 1..];
                    replaced = true;
                } else {
                    out.push(':');
                    rest = after;
                }
            }
            _ => {
                out.push(':');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    if replaced {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(input)
    }
}

fn is_alias_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '+' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_known_aliases() {
        assert_eq!(replace_aliases("have a :coffee:"), "have a \u{2615}");
        assert_eq!(replace_aliases(":+1: looks good"), "\u{1f44d} looks good");
    }

    #[test]
    fn replaces_adjacent_aliases() {
        assert_eq!(replace_aliases(":coffee::coffee:"), "\u{2615}\u{2615}");
    }

    #[test]
    fn leaves_unknown_aliases_alone() {
        assert_eq!(replace_aliases(":not_an_emoji_xyz:"), ":not_an_emoji_xyz:");
    }

    #[test]
    fn leaves_stray_colons_alone() {
        assert_eq!(replace_aliases("key: value"), "key: value");
        assert_eq!(replace_aliases("a::b"), "a::b");
        assert_eq!(replace_aliases("trailing:"), "trailing:");
    }

    #[test]
    fn borrows_when_nothing_matches() {
        assert!(matches!(replace_aliases("no colons here"), Cow::Borrowed(_)));
        assert!(matches!(replace_aliases("plain: text"), Cow::Borrowed(_)));
    }

    #[test]
    fn unknown_alias_does_not_eat_the_next_match() {
        assert_eq!(replace_aliases(":nope: :coffee:"), ":nope: \u{2615}");
    }
}
