//! `{{id}}` merge-field placeholders embedded in template bodies and
//! document content.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_-]*)\}\}")
        .expect("Invalid PLACEHOLDER regex pattern");
    static ref FIELD_ID: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("Invalid FIELD_ID regex pattern");
}

/// A single placeholder occurrence inside a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub id: &'a str,
    /// Byte range of the whole `{{id}}` token.
    pub span: Range<usize>,
}

/// All placeholder occurrences in document order, repeats included.
pub fn scan(body: &str) -> Vec<Placeholder<'_>> {
    PLACEHOLDER
        .captures_iter(body)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let id = caps.get(1)?;
            Some(Placeholder {
                id: id.as_str(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Distinct placeholder ids, sorted.
pub fn placeholder_ids(body: &str) -> BTreeSet<String> {
    scan(body).into_iter().map(|p| p.id.to_string()).collect()
}

/// Whether `id` can be written as a `{{id}}` token.
pub fn is_valid_field_id(id: &str) -> bool {
    FIELD_ID.is_match(id)
}

/// Replace every placeholder whose id has a value. Unknown placeholders are
/// left exactly as written so a later fill can still bind them.
///
/// `body` is HTML and values are plain text, so values are escaped.
pub fn fill_placeholders(body: &str, values: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(body, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => escape_html(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// A body whose placeholders are swapped for inert alphanumeric markers, so
/// a renderer cannot read `_` or `*` inside an id as markup.
#[derive(Debug, Clone)]
pub struct MaskedBody {
    pub text: String,
    prefix: String,
    tokens: Vec<String>,
}

impl MaskedBody {
    fn marker(prefix: &str, index: usize) -> String {
        format!("{}{}END", prefix, index)
    }

    /// Put the original tokens back into `rendered`.
    pub fn unmask(&self, rendered: &str) -> String {
        self.tokens
            .iter()
            .enumerate()
            .fold(rendered.to_string(), |out, (index, token)| {
                out.replace(&Self::marker(&self.prefix, index), token)
            })
    }
}

pub fn mask_placeholders(body: &str) -> MaskedBody {
    // The prefix must not already occur in the body
    let mut prefix = String::from("MERGEFIELD");
    while body.contains(&prefix) {
        prefix.push('X');
    }

    let mut tokens = Vec::new();
    let text = PLACEHOLDER
        .replace_all(body, |caps: &Captures| {
            tokens.push(caps[0].to_string());
            MaskedBody::marker(&prefix, tokens.len() - 1)
        })
        .into_owned();

    MaskedBody {
        text,
        prefix,
        tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_finds_tokens_in_order() {
        let body = "<p><strong>{{myName}}</strong> on {{invoiceDate}}, again {{myName}}</p>";
        let ids: Vec<&str> = scan(body).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["myName", "invoiceDate", "myName"]);
    }

    #[test]
    fn test_scan_reports_token_span() {
        let body = "Hi {{name}}!";
        let found = scan(body);
        assert_eq!(found.len(), 1);
        assert_eq!(&body[found[0].span.clone()], "{{name}}");
    }

    #[test]
    fn test_scan_ignores_malformed_tokens() {
        let body = "{{ spaced }} {{}} {{9lives}} {single} {{ok_1}}";
        let ids: Vec<&str> = scan(body).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["ok_1"]);
    }

    #[test]
    fn test_placeholder_ids_are_distinct() {
        let ids = placeholder_ids("{{b}} {{a}} {{b}}");
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_fill_keeps_unknown_tokens() {
        let mut values = HashMap::new();
        values.insert("myName".to_string(), "John Doe".to_string());
        let filled = fill_placeholders("{{myName}} due {{dueDate}}", &values);
        assert_eq!(filled, "John Doe due {{dueDate}}");
    }

    #[test]
    fn test_fill_escapes_values() {
        let mut values = HashMap::new();
        values.insert(
            "company".to_string(),
            "Tom & Jerry <img src=x onerror=alert(1)>".to_string(),
        );
        let filled = fill_placeholders("<p>{{company}}</p>", &values);
        assert_eq!(
            filled,
            "<p>Tom &amp; Jerry &lt;img src=x onerror=alert(1)&gt;</p>"
        );
    }

    #[test]
    fn test_mask_round_trip_keeps_surrounding_text() {
        let body = "MERGEFIELD0END {{_draft_}} and {{a}}{{_draft_}}";
        let masked = mask_placeholders(body);
        assert!(!masked.text.contains("{{"));
        assert!(!masked.text.contains('_'));
        assert_eq!(masked.unmask(&masked.text), body);
    }

    #[test]
    fn test_mask_handles_many_tokens() {
        let body: String = (0..12).map(|i| format!("{{{{f{}}}}} ", i)).collect();
        let masked = mask_placeholders(&body);
        assert_eq!(masked.unmask(&masked.text), body);
    }

    #[test]
    fn test_field_id_validation() {
        assert!(is_valid_field_id("invoiceDate"));
        assert!(is_valid_field_id("_tmp-2"));
        assert!(!is_valid_field_id(""));
        assert!(!is_valid_field_id("due date"));
        assert!(!is_valid_field_id("2fast"));
    }
}
