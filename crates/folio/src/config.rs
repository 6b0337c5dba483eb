use anyhow::Result;
use directories::ProjectDirs;
use mergecore::TemplateFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs::try_exists;

pub const DEFAULT_PLACEHOLDER: &str = "Type or paste your content here!";
pub const DEFAULT_LINK_PROTOCOL: &str = "https://";
const MAX_DEFAULT_HEADING_ROWS: u32 = 20;
const CONFIG_FILE: &str = "config.json";

const INVOICE_TEMPLATE: &str = include_str!("../assets/invoice_template.html");

/// The declarative editor configuration the host hands to the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default)]
    pub toolbar: ToolbarSection,
    #[serde(default)]
    pub slash_command: SlashCommandSection,
    #[serde(default)]
    pub export_pdf: Option<ExportPdfSection>,
    #[serde(default)]
    pub heading: HeadingSection,
    #[serde(default)]
    pub link: LinkSection,
    #[serde(default)]
    pub mention: MentionSection,
    #[serde(default)]
    pub merge_fields: MergeFieldsSection,
    #[serde(default)]
    pub template: TemplateSection,
    #[serde(default)]
    pub table: TableSection,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub license_key: String,
    /// Treat template placeholders without a merge field as fatal.
    #[serde(default)]
    pub strict_placeholders: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarSection {
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub should_not_group_when_full: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlashCommandSection {
    #[serde(default)]
    pub remove_commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPdfSection {
    #[serde(default)]
    pub stylesheets: Vec<String>,
    pub file_name: String,
    #[serde(default)]
    pub converter_options: ConverterOptionsSection,
}

/// Converter options as written; margins are unparsed CSS lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterOptionsSection {
    #[serde(default = "default_page_format")]
    pub format: String,
    #[serde(default = "default_margin")]
    pub margin_top: String,
    #[serde(default = "default_margin")]
    pub margin_bottom: String,
    #[serde(default = "default_margin")]
    pub margin_right: String,
    #[serde(default = "default_margin")]
    pub margin_left: String,
    #[serde(default = "default_orientation")]
    pub page_orientation: String,
}

fn default_page_format() -> String {
    "A4".to_string()
}

fn default_margin() -> String {
    "0".to_string()
}

fn default_orientation() -> String {
    "portrait".to_string()
}

impl Default for ConverterOptionsSection {
    fn default() -> Self {
        Self {
            format: default_page_format(),
            margin_top: default_margin(),
            margin_bottom: default_margin(),
            margin_right: default_margin(),
            margin_left: default_margin(),
            page_orientation: default_orientation(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadingSection {
    #[serde(default)]
    pub options: Vec<HeadingOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingOption {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    pub title: String,
    #[serde(rename = "class")]
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSection {
    #[serde(default)]
    pub add_target_to_external_links: bool,
    #[serde(default = "default_link_protocol")]
    pub default_protocol: String,
    #[serde(default)]
    pub decorators: BTreeMap<String, LinkDecorator>,
}

fn default_link_protocol() -> String {
    DEFAULT_LINK_PROTOCOL.to_string()
}

impl Default for LinkSection {
    fn default() -> Self {
        Self {
            add_target_to_external_links: false,
            default_protocol: default_link_protocol(),
            decorators: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoratorMode {
    Manual,
    Automatic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDecorator {
    pub mode: DecoratorMode,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MentionSection {
    #[serde(default)]
    pub feeds: Vec<MentionFeedSection>,
}

/// A static mention feed: every item is offered for its marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionFeedSection {
    pub marker: String,
    #[serde(default)]
    pub feed: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeFieldsSection {
    #[serde(default)]
    pub definitions: Vec<MergeFieldDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeFieldDefinition {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub default_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSection {
    #[serde(default)]
    pub definitions: Vec<TemplateDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "data")]
    pub body: String,
    #[serde(default)]
    pub format: TemplateFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSection {
    #[serde(default)]
    pub content_toolbar: Vec<String>,
    #[serde(default)]
    pub default_headings: DefaultHeadings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultHeadings {
    #[serde(default)]
    pub rows: u32,
    #[serde(default)]
    pub columns: u32,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn heading(model: &str, view: Option<&str>, title: &str, class_name: &str) -> HeadingOption {
    HeadingOption {
        model: model.to_string(),
        view: view.map(str::to_string),
        title: title.to_string(),
        class_name: class_name.to_string(),
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        let mut decorators = BTreeMap::new();
        decorators.insert(
            "toggleDownloadable".to_string(),
            LinkDecorator {
                mode: DecoratorMode::Manual,
                label: "Downloadable".to_string(),
                attributes: BTreeMap::from([("download".to_string(), "file".to_string())]),
            },
        );

        Self {
            plugins: strings(&[
                "AccessibilityHelp",
                "Alignment",
                "AutoLink",
                "Autosave",
                "Bold",
                "CloudServices",
                "Essentials",
                "ExportPdf",
                "Heading",
                "Italic",
                "Link",
                "List",
                "Mention",
                "MergeFields",
                "MultiLevelList",
                "Paragraph",
                "SelectAll",
                "Table",
                "TableCaption",
                "TableCellProperties",
                "TableColumnResize",
                "TableProperties",
                "TableToolbar",
                "Template",
                "Undo",
                "SlashCommand",
            ]),
            toolbar: ToolbarSection {
                items: strings(&[
                    "undo",
                    "redo",
                    "|",
                    "insertMergeField",
                    "previewMergeFields",
                    "|",
                    "exportPdf",
                    "|",
                    "heading",
                    "|",
                    "bold",
                    "italic",
                    "|",
                    "link",
                    "insertTable",
                    "insertTemplate",
                    "|",
                    "alignment",
                    "|",
                    "bulletedList",
                    "numberedList",
                    "multiLevelList",
                ]),
                should_not_group_when_full: false,
            },
            slash_command: SlashCommandSection {
                remove_commands: strings(&[
                    "heading",
                    "paragraph",
                    "bulletedList",
                    "numberedList",
                    "insertTable",
                ]),
            },
            export_pdf: Some(ExportPdfSection {
                stylesheets: strings(&[
                    "./App.css",
                    "https://cdn.ckeditor.com/ckeditor5/43.3.1/ckeditor5.css",
                    "https://cdn.ckeditor.com/ckeditor5-premium-features/43.3.1/ckeditor5-premium-features.css",
                ]),
                file_name: "export-pdf-demo.pdf".to_string(),
                converter_options: ConverterOptionsSection {
                    format: "Tabloid".to_string(),
                    margin_top: "20mm".to_string(),
                    margin_bottom: "20mm".to_string(),
                    margin_right: "24mm".to_string(),
                    margin_left: "24mm".to_string(),
                    page_orientation: "portrait".to_string(),
                },
            }),
            heading: HeadingSection {
                options: vec![
                    heading("paragraph", None, "Paragraph", "ck-heading_paragraph"),
                    heading("heading1", Some("h1"), "Heading 1", "ck-heading_heading1"),
                    heading("heading2", Some("h2"), "Heading 2", "ck-heading_heading2"),
                    heading("heading3", Some("h3"), "Heading 3", "ck-heading_heading3"),
                    heading("heading4", Some("h4"), "Heading 4", "ck-heading_heading4"),
                    heading("heading5", Some("h5"), "Heading 5", "ck-heading_heading5"),
                    heading("heading6", Some("h6"), "Heading 6", "ck-heading_heading6"),
                ],
            },
            link: LinkSection {
                add_target_to_external_links: true,
                default_protocol: DEFAULT_LINK_PROTOCOL.to_string(),
                decorators,
            },
            mention: MentionSection {
                feeds: vec![MentionFeedSection {
                    marker: "@".to_string(),
                    feed: Vec::new(),
                }],
            },
            merge_fields: MergeFieldsSection {
                definitions: vec![
                    MergeFieldDefinition {
                        id: "myName".to_string(),
                        label: "My Name".to_string(),
                        default_value: "John Doe".to_string(),
                    },
                    MergeFieldDefinition {
                        id: "invoiceDate".to_string(),
                        label: "Invoice Date".to_string(),
                        default_value: "2024-06-01".to_string(),
                    },
                ],
            },
            template: TemplateSection {
                definitions: vec![TemplateDefinition {
                    title: "Invoice".to_string(),
                    description: "Simple and clean invoice".to_string(),
                    body: INVOICE_TEMPLATE.to_string(),
                    format: TemplateFormat::Html,
                }],
            },
            table: TableSection {
                content_toolbar: strings(&[
                    "tableColumn",
                    "tableRow",
                    "mergeTableCells",
                    "tableProperties",
                    "tableCellProperties",
                ]),
                default_headings: DefaultHeadings { rows: 1, columns: 0 },
            },
            placeholder: Some(DEFAULT_PLACEHOLDER.to_string()),
            license_key: String::new(),
            strict_placeholders: false,
        }
    }
}

impl EditorConfig {
    /// Load the user's configuration, creating it on first run.
    ///
    /// A file that does not parse is copied to `.bak` and replaced with the
    /// default. A file that cannot be read is an error and is left untouched.
    pub async fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };

        match Self::read_config_file(&path).await? {
            Some(content) if !content.trim().is_empty() => {
                match serde_json::from_str::<Self>(&content) {
                    Ok(mut config) => {
                        config.validate()?;
                        log::info!("Loaded config from {}", path.display());
                        Ok(config)
                    }
                    Err(e) => {
                        log::error!("Config at {} does not parse: {}", path.display(), e);
                        Self::backup_config_file(&path).await;
                        Self::write_default().await
                    }
                }
            }
            Some(_) => {
                log::warn!("Config at {} is empty, writing default", path.display());
                Self::write_default().await
            }
            None => {
                log::info!("No config at {}, writing default", path.display());
                Self::write_default().await
            }
        }
    }

    /// The configuration [`EditorConfig::load`] would see, without creating,
    /// repairing or backing up any file. A missing file yields the default.
    pub async fn load_existing() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        if try_exists(&path).await? {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    async fn read_config_file(path: &Path) -> Result<Option<String>> {
        if !try_exists(path).await? {
            return Ok(None);
        }
        tokio::fs::read_to_string(path)
            .await
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
    }

    async fn backup_config_file(path: &Path) {
        let backup = path.with_extension("bak");
        match tokio::fs::copy(path, &backup).await {
            Ok(_) => log::info!("Backed up broken config to {}", backup.display()),
            Err(e) => log::warn!("Could not back up {}: {}", path.display(), e),
        }
    }

    async fn write_default() -> Result<Self> {
        let config = Self::default();
        if let Err(e) = config.save().await {
            log::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    /// Read one specific file. Unlike [`EditorConfig::load`], nothing is
    /// repaired or written back; any error is returned to the caller.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let mut config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_path() {
            let mut config_to_save = self.clone();
            config_to_save.validate()?;

            if let Some(parent) = config_path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    anyhow::anyhow!(
                        "Failed to create config directory: {} - {}",
                        parent.display(),
                        e
                    )
                })?;
                log::debug!(
                    "Config directory exists or was created: {}",
                    parent.display()
                );
            }

            let content = serde_json::to_string_pretty(&config_to_save)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            tokio::fs::write(&config_path, content).await.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to write config file: {} - {}",
                    config_path.display(),
                    e
                )
            })?;
            log::info!("Successfully saved config to: {}", config_path.display());
        }
        Ok(())
    }

    /// Correct recoverable values in place. Structural problems are left for
    /// assembly to reject.
    pub fn validate(&mut self) -> Result<()> {
        let mut has_issues = false;

        if let Some(placeholder) = &self.placeholder {
            if placeholder.trim().is_empty() {
                log::warn!("Empty placeholder text, using default");
                self.placeholder = Some(DEFAULT_PLACEHOLDER.to_string());
                has_issues = true;
            }
        }

        if self.link.default_protocol.trim().is_empty() {
            log::warn!("Empty default link protocol, using {}", DEFAULT_LINK_PROTOCOL);
            self.link.default_protocol = DEFAULT_LINK_PROTOCOL.to_string();
            has_issues = true;
        }

        if self.table.default_headings.rows > MAX_DEFAULT_HEADING_ROWS {
            log::warn!(
                "Invalid default heading rows: {}, using 1",
                self.table.default_headings.rows
            );
            self.table.default_headings.rows = 1;
            has_issues = true;
        }

        if has_issues {
            log::info!("Configuration validation completed with corrections");
        }

        Ok(())
    }

    /// `FOLIO_CONFIG_PATH`, else `config.json` under `FOLIO_CONFIG_DIR`, else
    /// under the platform config directory.
    pub fn config_path() -> Option<PathBuf> {
        std::env::var_os("FOLIO_CONFIG_PATH")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("FOLIO_CONFIG_DIR").map(|dir| PathBuf::from(dir).join(CONFIG_FILE))
            })
            .or_else(|| {
                ProjectDirs::from("com", "folio", "folio")
                    .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            })
    }
}
