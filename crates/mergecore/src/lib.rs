pub mod markdown;
pub mod placeholders;
pub mod sanitize;

pub use markdown::{render_template_body, TemplateFormat};
pub use placeholders::{
    fill_placeholders, is_valid_field_id, mask_placeholders, placeholder_ids, scan, MaskedBody,
    Placeholder,
};

#[cfg(test)]
mod tests;
