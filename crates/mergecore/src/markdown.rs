use comrak::{markdown_to_html, Options};
use serde::{Deserialize, Serialize};

use crate::placeholders::mask_placeholders;
use crate::sanitize::sanitize_template_html;

/// Authoring format of a template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    /// Rich content handed to the engine as-is.
    #[default]
    Html,
    /// Rendered to sanitized HTML before it reaches the engine.
    Markdown,
}

/// Produce the HTML body the engine inserts for a template.
pub fn render_template_body(format: TemplateFormat, body: &str) -> String {
    match format {
        TemplateFormat::Html => body.to_string(),
        TemplateFormat::Markdown => {
            let masked = mask_placeholders(body);
            let html = markdown_to_html(&masked.text, &create_comrak_options());
            masked.unmask(&sanitize_template_html(&html))
        }
    }
}

fn create_comrak_options() -> Options<'static> {
    let mut opt = Options::default();

    // Templates mostly carry invoice-style tables and lists
    opt.extension.strikethrough = true;
    opt.extension.table = true;
    opt.extension.autolink = true;
    opt.extension.tasklist = true;

    // Smart punctuation would rewrite quotes inside attribute-like text
    opt.parse.smart = false;

    // Raw HTML inside a markdown template is escaped, never executed
    opt.render.unsafe_ = false;
    opt.render.escape = true;

    opt
}
