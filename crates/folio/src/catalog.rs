//! The fixed set of capabilities a configuration may name in `plugins`.

use crate::capability::{Capability, Category};

/// Every plugin name the catalog recognizes, core edition first.
pub const PLUGIN_NAMES: &[&str] = &[
    "AccessibilityHelp",
    "Alignment",
    "AutoLink",
    "Autosave",
    "Bold",
    "CloudServices",
    "Essentials",
    "Heading",
    "Italic",
    "Link",
    "List",
    "Mention",
    "Paragraph",
    "SelectAll",
    "Table",
    "TableCaption",
    "TableCellProperties",
    "TableColumnResize",
    "TableProperties",
    "TableToolbar",
    "Undo",
    "ExportPdf",
    "MergeFields",
    "MultiLevelList",
    "SlashCommand",
    "Template",
];

/// Build the catalog entry for `name`.
pub fn lookup(name: &str) -> Option<Capability> {
    let capability = match name {
        "AccessibilityHelp" => {
            Capability::new(name, Category::InputAssist).with_commands(&["accessibilityHelp"])
        }
        "Alignment" => Capability::new(name, Category::Formatting).with_commands(&["alignment"]),
        "AutoLink" => Capability::new(name, Category::InputAssist),
        "Autosave" => Capability::new(name, Category::InputAssist),
        "Bold" => Capability::new(name, Category::Formatting).with_commands(&["bold"]),
        "CloudServices" => Capability::new(name, Category::DataBinding),
        "Essentials" => Capability::new(name, Category::InputAssist),
        "Heading" => Capability::new(name, Category::Structure).with_insertable(&["heading"]),
        "Italic" => Capability::new(name, Category::Formatting).with_commands(&["italic"]),
        "Link" => Capability::new(name, Category::Formatting).with_commands(&["link"]),
        "List" => Capability::new(name, Category::Structure)
            .with_insertable(&["bulletedList", "numberedList"]),
        "Mention" => Capability::new(name, Category::InputAssist),
        "Paragraph" => Capability::new(name, Category::Structure).with_insertable(&["paragraph"]),
        "SelectAll" => Capability::new(name, Category::InputAssist).with_commands(&["selectAll"]),
        "Table" => Capability::new(name, Category::Structure)
            .with_commands(&["tableColumn", "tableRow", "mergeTableCells"])
            .with_insertable(&["insertTable"]),
        "TableCaption" => {
            Capability::new(name, Category::Structure).with_commands(&["toggleTableCaption"])
        }
        "TableCellProperties" => {
            Capability::new(name, Category::Formatting).with_commands(&["tableCellProperties"])
        }
        "TableColumnResize" => Capability::new(name, Category::Structure),
        "TableProperties" => {
            Capability::new(name, Category::Formatting).with_commands(&["tableProperties"])
        }
        "TableToolbar" => Capability::new(name, Category::Structure),
        "Undo" => Capability::new(name, Category::InputAssist).with_commands(&["undo", "redo"]),
        "ExportPdf" => Capability::new(name, Category::Export)
            .with_commands(&["exportPdf"])
            .premium(),
        "MergeFields" => Capability::new(name, Category::DataBinding)
            .with_commands(&["previewMergeFields"])
            .with_insertable(&["insertMergeField"])
            .premium(),
        "MultiLevelList" => Capability::new(name, Category::Structure)
            .with_insertable(&["multiLevelList"])
            .premium(),
        "SlashCommand" => Capability::new(name, Category::InputAssist).premium(),
        "Template" => Capability::new(name, Category::DataBinding)
            .with_insertable(&["insertTemplate"])
            .premium(),
        _ => return None,
    };
    Some(capability)
}
