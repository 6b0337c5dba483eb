//! Turns a declarative [`EditorConfig`] into the immutable configuration the
//! editor engine is constructed with.
//!
//! Assembly is synchronous and all-or-nothing: the first fatal error aborts
//! it, and non-fatal findings come back as [`Diagnostics`].

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::capability::CapabilityRegistry;
use crate::catalog;
use crate::config::{
    DefaultHeadings, EditorConfig, HeadingOption, LinkSection, MergeFieldDefinition,
    TemplateDefinition,
};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::AssemblyError;
use crate::export::{build_export_config, ExportConfiguration};
use crate::rules::{self, MentionFeed, MentionFeeds, SuppressedCommandSet};
use crate::toolbar::{build_layout, ToolbarEntry, ToolbarLayout};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfiguration {
    pub content_toolbar: Vec<ToolbarEntry>,
    pub default_headings: DefaultHeadings,
}

/// Everything the engine needs, fully resolved. Shared read-only for the
/// lifetime of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfiguration {
    #[serde(rename = "plugins", serialize_with = "serialize_capability_ids")]
    registry: CapabilityRegistry,
    pub toolbar: ToolbarLayout,
    pub suppressed_commands: BTreeSet<String>,
    pub quick_insert: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_pdf: Option<ExportConfiguration>,
    pub heading: Vec<HeadingOption>,
    pub link: LinkSection,
    #[serde(skip)]
    mention_feeds: MentionFeeds,
    pub merge_fields: Vec<MergeFieldDefinition>,
    pub templates: Vec<TemplateDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub license_key: String,
}

fn serialize_capability_ids<S: serde::Serializer>(
    registry: &CapabilityRegistry,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(registry.ids())
}

impl EditorConfiguration {
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn mention_feeds(&self) -> &MentionFeeds {
        &self.mention_feeds
    }

    pub fn merge_field_defaults(&self) -> HashMap<String, String> {
        self.merge_fields
            .iter()
            .map(|field| (field.id.clone(), field.default_value.clone()))
            .collect()
    }

    pub fn template(&self, title: &str) -> Option<&TemplateDefinition> {
        self.templates.iter().find(|t| t.title == title)
    }

    /// The template body with each merge field replaced by its default value.
    pub fn preview_template(&self, title: &str) -> Option<String> {
        let template = self.template(title)?;
        Some(mergecore::fill_placeholders(
            &template.body,
            &self.merge_field_defaults(),
        ))
    }
}

/// The product of a successful assembly run.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub configuration: Arc<EditorConfiguration>,
    pub diagnostics: Diagnostics,
}

pub fn assemble(config: &EditorConfig) -> Result<Assembly, AssemblyError> {
    if config.plugins.is_empty() {
        return Err(AssemblyError::MissingSection("plugins".to_string()));
    }
    if config.toolbar.items.is_empty() {
        return Err(AssemblyError::MissingSection("toolbar".to_string()));
    }

    let mut diagnostics = Diagnostics::new();

    let registry = build_registry(config)?;
    log::debug!("Registry holds {} capabilities", registry.len());

    let toolbar = ToolbarLayout {
        items: build_layout(&registry, &config.toolbar.items[..])?,
        should_not_group_when_full: config.toolbar.should_not_group_when_full,
    };

    let table = if registry.contains("Table") {
        Some(TableConfiguration {
            content_toolbar: build_layout(&registry, &config.table.content_toolbar[..])?,
            default_headings: config.table.default_headings,
        })
    } else {
        None
    };

    if registry.contains("Heading") {
        check_heading_options(&config.heading.options)?;
    }

    rules::check_merge_fields(&config.merge_fields.definitions)?;

    let templates: Vec<TemplateDefinition> = config
        .template
        .definitions
        .iter()
        .map(|template| TemplateDefinition {
            body: mergecore::render_template_body(template.format, &template.body),
            ..template.clone()
        })
        .collect();

    let unmatched = rules::check_placeholders(&templates, &config.merge_fields.definitions);
    if config.strict_placeholders {
        if let Some(first) = unmatched.first() {
            if let DiagnosticKind::UnmatchedPlaceholder { template, field } = &first.kind {
                return Err(AssemblyError::UnmatchedPlaceholder {
                    template: template.clone(),
                    field: field.clone(),
                });
            }
        }
    }
    diagnostics.extend(unmatched);

    let suppressed = SuppressedCommandSet::new(config.slash_command.remove_commands.iter().cloned());
    let quick_insert = if registry.contains("SlashCommand") {
        diagnostics.extend(rules::unprovided_suppressions(&registry, &suppressed));
        rules::quick_insert_commands(&registry, &suppressed)
    } else {
        BTreeSet::new()
    };

    let mut mention_feeds = MentionFeeds::new();
    if registry.contains("Mention") {
        for section in &config.mention.feeds {
            mention_feeds.register(
                &section.marker,
                MentionFeed::from_list(&section.marker, section.feed.clone()),
            )?;
        }
    } else if !config.mention.feeds.is_empty() {
        log::debug!("Mention plugin not active, ignoring mention feeds");
    }

    let export_section = config
        .export_pdf
        .as_ref()
        .filter(|_| registry.contains("ExportPdf"));
    if export_section.is_none() && config.export_pdf.is_some() {
        log::debug!("ExportPdf plugin not active, ignoring export section");
    }
    let export_pdf = match export_section {
        Some(section) => {
            let (export, export_diagnostics) = build_export_config(
                &section.stylesheets[..],
                &section.file_name,
                &section.converter_options,
            )?;
            diagnostics.extend(export_diagnostics);
            Some(export)
        }
        None => None,
    };

    if config.license_key.trim().is_empty() {
        diagnostics.push(Diagnostic::new(DiagnosticKind::MissingLicenseKey));
    }

    let configuration = EditorConfiguration {
        registry,
        toolbar,
        suppressed_commands: suppressed.iter().map(str::to_string).collect(),
        quick_insert,
        export_pdf,
        heading: config.heading.options.clone(),
        link: config.link.clone(),
        mention_feeds,
        merge_fields: config.merge_fields.definitions.clone(),
        templates,
        table,
        placeholder: config.placeholder.clone(),
        license_key: config.license_key.clone(),
    };

    log::info!(
        "Assembled editor configuration: {} capabilities, {} toolbar entries, {} diagnostics",
        configuration.registry.len(),
        configuration.toolbar.items.len(),
        diagnostics.len()
    );

    Ok(Assembly {
        configuration: Arc::new(configuration),
        diagnostics,
    })
}

fn build_registry(config: &EditorConfig) -> Result<CapabilityRegistry, AssemblyError> {
    let mut registry = CapabilityRegistry::new();
    for name in &config.plugins {
        let capability = catalog::lookup(name)
            .ok_or_else(|| AssemblyError::UnknownPlugin(name.clone()))?;
        let capability = match section_settings(config, name) {
            Some(settings) => capability.with_settings(settings),
            None => capability,
        };
        registry.register(capability)?;
    }
    Ok(registry)
}

/// The per-capability sub-configuration, keyed by capability id.
fn section_settings(
    config: &EditorConfig,
    capability: &str,
) -> Option<serde_json::Map<String, serde_json::Value>> {
    let value = match capability {
        "Heading" => serde_json::to_value(&config.heading),
        "Link" => serde_json::to_value(&config.link),
        "Mention" => serde_json::to_value(&config.mention),
        "MergeFields" => serde_json::to_value(&config.merge_fields),
        "Table" => serde_json::to_value(&config.table),
        "SlashCommand" => serde_json::to_value(&config.slash_command),
        "ExportPdf" => serde_json::to_value(config.export_pdf.as_ref()?),
        _ => return None,
    };

    match value {
        Ok(serde_json::Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Could not capture settings for '{}': {}", capability, e);
            None
        }
    }
}

fn check_heading_options(options: &[HeadingOption]) -> Result<(), AssemblyError> {
    if options.is_empty() {
        return Ok(());
    }

    let invalid = |reason: String| AssemblyError::InvalidSection {
        section: "heading".to_string(),
        reason,
    };

    if !options.iter().any(|option| option.model == "paragraph") {
        return Err(invalid("options must include the 'paragraph' model".to_string()));
    }

    let mut models = HashSet::new();
    for option in options {
        if !models.insert(option.model.as_str()) {
            return Err(invalid(format!("model '{}' is listed twice", option.model)));
        }
    }
    Ok(())
}
