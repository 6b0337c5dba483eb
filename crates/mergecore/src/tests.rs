#[cfg(test)]
mod unit_tests {
    use super::super::*;
    use std::collections::HashMap;

    fn defaults() -> HashMap<String, String> {
        let mut values = HashMap::new();
        values.insert("myName".to_string(), "John Doe".to_string());
        values.insert("invoiceDate".to_string(), "2024-06-01".to_string());
        values
    }

    #[test]
    fn test_sanitize_removes_scripts() {
        let html = r#"<p>Hello</p><script>alert('XSS')</script><p>{{myName}}</p>"#;
        let sanitized = sanitize::sanitize_template_html(html);
        assert!(!sanitized.contains("<script"));
        assert!(!sanitized.contains("alert"));
        assert!(sanitized.contains("{{myName}}"));
    }

    #[test]
    fn test_sanitize_removes_dangerous_links() {
        let html = r#"<a href="javascript:alert('XSS')">Pay now</a>"#;
        let sanitized = sanitize::sanitize_template_html(html);
        assert!(!sanitized.contains("javascript:"));
    }

    #[test]
    fn test_sanitize_keeps_table_figure() {
        let html = r#"<figure class="table"><table><tbody><tr><td>1</td></tr></tbody></table></figure>"#;
        let sanitized = sanitize::sanitize_template_html(html);
        assert!(sanitized.contains(r#"<figure class="table">"#));
    }

    #[test]
    fn test_markdown_script_is_escaped() {
        let body = render_template_body(TemplateFormat::Markdown, "<script>alert('x')</script>");
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn test_rendered_markdown_preview() {
        let body = render_template_body(
            TemplateFormat::Markdown,
            "**{{myName}}** invoiced on {{invoiceDate}}, due {{dueDate}}",
        );
        let preview = fill_placeholders(&body, &defaults());
        insta::assert_snapshot!(
            preview.trim_end(),
            @"<p><strong>John Doe</strong> invoiced on 2024-06-01, due {{dueDate}}</p>"
        );
    }

    #[test]
    fn test_scan_then_fill_leaves_only_unbound() {
        let body = "<td>{{invoiceDate}}</td><td>{{dueDate}}</td><td>{{myName}}</td>";
        let filled = fill_placeholders(body, &defaults());
        let remaining = placeholder_ids(&filled);
        assert_eq!(remaining.into_iter().collect::<Vec<_>>(), vec!["dueDate"]);
    }

    #[test]
    fn test_scan_is_stable_across_runs() {
        let body = "{{a}}{{b}}{{a}}";
        assert_eq!(scan(body), scan(body));
        assert_eq!(placeholder_ids(body), placeholder_ids(body));
    }
}
