//! HTML sanitization with an allow-list tuned for compiled markdown.

/// Allow-list additions layered over ammonia's conservative defaults.
///
/// The defaults already cover the common prose tags; the policy adds the
/// tags and attributes the compiled markup relies on (code line wrappers,
/// anchor links, task list checkboxes, media embeds) plus `data-*`
/// passthrough for renderer hooks.
#[derive(Debug, Clone)]
pub struct SanitizePolicy {
    /// Tags allowed in addition to ammonia's defaults.
    pub extra_tags: Vec<String>,
    /// Attributes allowed on every tag.
    pub generic_attributes: Vec<String>,
    /// Attribute name prefixes allowed on every tag.
    pub generic_attribute_prefixes: Vec<String>,
    /// Per-tag attribute allow-lists.
    pub tag_attributes: Vec<(String, Vec<String>)>,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        fn strings(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        Self {
            extra_tags: strings(&[
                "details", "input", "path", "section", "summary", "svg", "video",
            ]),
            generic_attributes: strings(&["class", "id", "style", "align"]),
            generic_attribute_prefixes: strings(&["data-", "aria-"]),
            tag_attributes: vec![
                (
                    "a".to_string(),
                    strings(&["href", "rel", "tabindex", "target"]),
                ),
                (
                    "img".to_string(),
                    strings(&["height", "loading", "srcset", "title", "width"]),
                ),
                (
                    "input".to_string(),
                    strings(&["checked", "disabled", "type"]),
                ),
                ("path".to_string(), strings(&["d", "fill-rule"])),
                ("svg".to_string(), strings(&["height", "viewbox", "width"])),
                (
                    "video".to_string(),
                    strings(&[
                        "autoplay",
                        "controls",
                        "height",
                        "loop",
                        "muted",
                        "playsinline",
                        "src",
                        "width",
                    ]),
                ),
            ],
        }
    }
}

/// Run the final sanitization pass over compiled markup.
pub fn sanitize(html: &str, policy: &SanitizePolicy) -> String {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tags(policy.extra_tags.iter().map(String::as_str))
        .add_generic_attributes(policy.generic_attributes.iter().map(String::as_str))
        .add_generic_attribute_prefixes(
            policy.generic_attribute_prefixes.iter().map(String::as_str),
        )
        .link_rel(None);
    for (tag, attributes) in &policy.tag_attributes {
        builder.add_tag_attributes(tag, attributes.iter().map(String::as_str));
    }
    builder.clean(html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_event_handlers() {
        let policy = SanitizePolicy::default();
        let cleaned = sanitize(
            "<p onclick=\"evil()\">hi</p><script>alert(1)</script>",
            &policy,
        );
        assert!(!cleaned.contains("script"));
        assert!(!cleaned.contains("onclick"));
        assert!(cleaned.contains("<p>hi</p>"));
    }

    #[test]
    fn keeps_code_block_markup() {
        let policy = SanitizePolicy::default();
        let markup = "<pre class=\"code-block\"><code class=\"language-js\" \
                      data-language=\"js\"><div class=\"code-line\" data-line=\"1\">x</div>\
                      </code></pre>";
        let cleaned = sanitize(markup, &policy);
        assert!(cleaned.contains("class=\"code-block\""));
        assert!(cleaned.contains("data-language=\"js\""));
        assert!(cleaned.contains("data-line=\"1\""));
    }

    #[test]
    fn keeps_anchor_attributes_and_fragment_links() {
        let policy = SanitizePolicy::default();
        let markup = "<a aria-hidden=\"true\" tabindex=\"-1\" class=\"heading-anchor\" \
                      href=\"#intro\" id=\"intro\"></a>";
        let cleaned = sanitize(markup, &policy);
        assert!(cleaned.contains("href=\"#intro\""));
        assert!(cleaned.contains("aria-hidden=\"true\""));
        assert!(cleaned.contains("tabindex=\"-1\""));
    }

    #[test]
    fn blocks_javascript_urls() {
        let policy = SanitizePolicy::default();
        let cleaned = sanitize("<a href=\"javascript:alert(1)\">x</a>", &policy);
        assert!(!cleaned.contains("javascript:"));
    }

    #[test]
    fn keeps_task_list_checkboxes() {
        let policy = SanitizePolicy::default();
        let cleaned = sanitize(
            "<li class=\"task-list-item\"><input type=\"checkbox\" disabled checked /> done</li>",
            &policy,
        );
        assert!(cleaned.contains("<input"));
        assert!(cleaned.contains("type=\"checkbox\""));
    }
}
