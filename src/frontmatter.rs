//! YAML frontmatter extraction.
//!
//! A metadata block is a leading `---` fence, YAML content, and a closing
//! `---` fence. A UTF-8 BOM and blank lines before the opening fence are
//! tolerated; anything else means the document has no frontmatter.

use serde_json::Value;
use thiserror::Error;

/// Errors from metadata block extraction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrontmatterError {
    /// An opening fence was found but no closing fence follows.
    #[error("unterminated frontmatter block: missing closing `---`")]
    Unterminated,
    /// The block is not valid YAML.
    #[error("invalid YAML in frontmatter: {0}")]
    Parse(String),
    /// The block parsed to something other than a mapping.
    #[error("frontmatter must be a YAML mapping, got {0}")]
    NotAMapping(&'static str),
}

/// Extracted metadata and where the markdown body begins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    /// Frontmatter attributes as JSON-shaped values. Empty when the document
    /// has no metadata block.
    pub attributes: serde_json::Map<String, Value>,
    /// Byte offset into the original input where the body starts.
    pub body_start: usize,
}

/// Split the metadata block off the front of a document.
///
/// Returns empty metadata with `body_start == 0` when no block is present.
pub fn extract_metadata(input: &str) -> Result<Metadata, FrontmatterError> {
    let (text, bom_len) = match input.strip_prefix('\u{feff}') {
        Some(stripped) => (stripped, '\u{feff}'.len_utf8()),
        None => (input, 0),
    };

    let mut lines = text.split_inclusive('\n');
    let mut cursor = 0usize;
    let mut opened = false;
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            cursor += line.len();
            continue;
        }
        if is_fence(line) {
            cursor += line.len();
            opened = true;
        }
        break;
    }
    if !opened {
        return Ok(Metadata::default());
    }

    let block_start = cursor;
    for line in lines {
        if is_fence(line) {
            let attributes = parse_yaml(&text[block_start..cursor])?;
            return Ok(Metadata {
                attributes,
                body_start: bom_len + cursor + line.len(),
            });
        }
        cursor += line.len();
    }
    Err(FrontmatterError::Unterminated)
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == "---"
}

fn parse_yaml(block: &str) -> Result<serde_json::Map<String, Value>, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(serde_json::Map::new());
    }
    let parsed: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    let json =
        serde_json::to_value(parsed).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    match json {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(serde_json::Map::new()),
        Value::Bool(_) => Err(FrontmatterError::NotAMapping("a boolean")),
        Value::Number(_) => Err(FrontmatterError::NotAMapping("a number")),
        Value::String(_) => Err(FrontmatterError::NotAMapping("a string")),
        Value::Array(_) => Err(FrontmatterError::NotAMapping("a sequence")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_a_basic_block() {
        let input = "---\ntitle: Hello\ndraft: true\n---\n# Body\n";
        let metadata = extract_metadata(input).unwrap();
        assert_eq!(metadata.attributes["title"], "Hello");
        assert_eq!(metadata.attributes["draft"], true);
        assert_eq!(&input[metadata.body_start..], "# Body\n");
    }

    #[test]
    fn no_block_means_empty_metadata() {
        let metadata = extract_metadata("# Just a doc\n").unwrap();
        assert!(metadata.attributes.is_empty());
        assert_eq!(metadata.body_start, 0);
    }

    #[test]
    fn tolerates_bom_and_leading_blank_lines() {
        let input = "\u{feff}\n\n---\ntitle: Hi\n---\nbody";
        let metadata = extract_metadata(input).unwrap();
        assert_eq!(metadata.attributes["title"], "Hi");
        assert_eq!(&input[metadata.body_start..], "body");
    }

    #[test]
    fn closing_fence_at_end_of_input() {
        let metadata = extract_metadata("---\ntitle: Hi\n---").unwrap();
        assert_eq!(metadata.attributes["title"], "Hi");
        assert_eq!(metadata.body_start, 17);
    }

    #[test]
    fn empty_block_is_ok() {
        let metadata = extract_metadata("---\n---\nbody").unwrap();
        assert!(metadata.attributes.is_empty());
        assert_eq!(metadata.body_start, 8);
    }

    #[test]
    fn unterminated_block_is_an_error() {
        assert_eq!(
            extract_metadata("---\ntitle: Hi\n"),
            Err(FrontmatterError::Unterminated)
        );
    }

    #[test]
    fn non_mapping_block_is_an_error() {
        assert!(matches!(
            extract_metadata("---\n- a\n- b\n---\n"),
            Err(FrontmatterError::NotAMapping(_))
        ));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            extract_metadata("---\ntitle: [unclosed\n---\n"),
            Err(FrontmatterError::Parse(_))
        ));
    }

    #[test]
    fn crlf_fences_are_recognized() {
        let input = "---\r\ntitle: Hi\r\n---\r\nbody";
        let metadata = extract_metadata(input).unwrap();
        assert_eq!(metadata.attributes["title"], "Hi");
        assert_eq!(&input[metadata.body_start..], "body");
    }
}
