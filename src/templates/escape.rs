//! Entity escaping for free text echoed back into rendered pages.

/// Replaces `&`, `"`, `'`, `>` and `<` with their named character entities.
///
/// Used on user-supplied text that ends up inside HTML the templates emit
/// unescaped (the contact confirmation flash). Every other character passes
/// through unchanged.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '>' => escaped.push_str("&gt;"),
            '<' => escaped.push_str("&lt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn escapes_all_five_characters() {
        assert_eq!(html_escape("<b>&'\""), "&lt;b&gt;&amp;&apos;&quot;");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(html_escape("Ada Lovelace"), "Ada Lovelace");
        assert_eq!(html_escape(""), "");
    }

    #[test]
    fn existing_entities_are_escaped_again() {
        assert_eq!(html_escape("&amp;"), "&amp;amp;");
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(html_escape("Zoë <3"), "Zoë &lt;3");
    }

    proptest! {
        #[test]
        fn output_has_no_markup_characters(s in ".*") {
            let escaped = html_escape(&s);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
            prop_assert!(!escaped.contains('\''));
        }

        #[test]
        fn text_without_special_characters_is_identity(s in "[a-zA-Z0-9 .,!?@-]*") {
            prop_assert_eq!(html_escape(&s), s);
        }
    }
}
