//! Slug transliteration and per-document deduplication.

use std::collections::HashSet;

/// Convert heading text into a URL-safe slug base.
///
/// Lower-cases, strips punctuation, collapses whitespace runs into single
/// hyphens, and folds common Latin accents to ASCII. Non-ASCII alphanumerics
/// without a fold (CJK and similar) are kept as-is.
pub fn transliterate(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_hyphen = !slug.is_empty();
            continue;
        }
        for low in ch.to_lowercase() {
            if low.is_ascii_alphanumeric() || low == '-' || low == '_' {
                push_part(&mut slug, &mut pending_hyphen, low);
            } else if let Some(folded) = fold_latin(low) {
                for f in folded.chars() {
                    push_part(&mut slug, &mut pending_hyphen, f);
                }
            } else if !low.is_ascii() && low.is_alphanumeric() {
                push_part(&mut slug, &mut pending_hyphen, low);
            }
        }
    }
    slug
}

fn push_part(slug: &mut String, pending_hyphen: &mut bool, ch: char) {
    if *pending_hyphen {
        slug.push('-');
        *pending_hyphen = false;
    }
    slug.push(ch);
}

/// ASCII folds for the Latin accents that show up in prose headings.
fn fold_latin(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => "i",
        'ľ' | 'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'ŕ' | 'ř' => "r",
        'ś' | 'š' | 'ș' => "s",
        'ť' | 'ț' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        _ => return None,
    };
    Some(folded)
}

/// Slugs assigned so far within a single compile.
///
/// The set only grows: once a slug is handed out it is never reused, so every
/// anchor in the document stays unique. Empty bases fall back to `heading`
/// before deduplication.
#[derive(Debug, Default)]
pub struct SlugSet {
    taken: HashSet<String>,
}

impl SlugSet {
    /// Create an empty slug set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve and return a unique slug for the given base.
    ///
    /// Returns the base unchanged when free, otherwise probes `base-1`,
    /// `base-2`, ... until an unused candidate is found.
    pub fn assign(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "heading" } else { base };
        let mut candidate = base.to_string();
        let mut suffix = 0usize;
        while self.taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}-{suffix}");
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    /// Whether a slug has already been handed out.
    pub fn contains(&self, slug: &str) -> bool {
        self.taken.contains(slug)
    }

    /// Number of slugs assigned so far.
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    /// Whether no slug has been assigned yet.
    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}
