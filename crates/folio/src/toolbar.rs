//! Resolves an ordered list of toolbar tokens into a flat, separator-delimited
//! layout.
//!
//! The output matches the input token for token. A token that resolves to
//! nothing aborts the whole build; entries are never dropped.

use serde::{Serialize, Serializer};

use crate::capability::CapabilityRegistry;
use crate::error::AssemblyError;

pub const SEPARATOR: &str = "|";

/// Commands the editing engine provides without any registered capability.
pub const ENGINE_BASELINE: &[&str] = &["undo", "redo"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    Capability(String),
    Engine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarCommand {
    pub name: String,
    pub provider: Provider,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarEntry {
    Command(ToolbarCommand),
    Separator,
}

impl ToolbarEntry {
    pub fn is_separator(&self) -> bool {
        matches!(self, ToolbarEntry::Separator)
    }

    pub fn command_name(&self) -> Option<&str> {
        match self {
            ToolbarEntry::Command(command) => Some(&command.name),
            ToolbarEntry::Separator => None,
        }
    }
}

// Engines take the toolbar back in its token form
impl Serialize for ToolbarEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ToolbarEntry::Command(command) => serializer.serialize_str(&command.name),
            ToolbarEntry::Separator => serializer.serialize_str(SEPARATOR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarLayout {
    pub items: Vec<ToolbarEntry>,
    pub should_not_group_when_full: bool,
}

impl ToolbarLayout {
    pub fn commands(&self) -> impl Iterator<Item = &ToolbarCommand> {
        self.items.iter().filter_map(|entry| match entry {
            ToolbarEntry::Command(command) => Some(command),
            ToolbarEntry::Separator => None,
        })
    }

    pub fn separator_count(&self) -> usize {
        self.items.iter().filter(|e| e.is_separator()).count()
    }
}

/// Resolve `tokens` in order against `registry` and the engine baseline.
pub fn build_layout<S: AsRef<str>>(
    registry: &CapabilityRegistry,
    tokens: &[S],
) -> Result<Vec<ToolbarEntry>, AssemblyError> {
    let mut entries = Vec::with_capacity(tokens.len());

    for token in tokens {
        let token = token.as_ref();
        if token == SEPARATOR {
            entries.push(ToolbarEntry::Separator);
            continue;
        }

        let provider = if let Some(capability) = registry.resolve_command(token) {
            Provider::Capability(capability.id.clone())
        } else if ENGINE_BASELINE.contains(&token) {
            Provider::Engine
        } else {
            log::error!("Toolbar token '{}' matches no active capability", token);
            return Err(AssemblyError::UnknownCapability(token.to_string()));
        };

        entries.push(ToolbarEntry::Command(ToolbarCommand {
            name: token.to_string(),
            provider,
        }));
    }

    log::debug!("Resolved toolbar layout with {} entries", entries.len());
    Ok(entries)
}
