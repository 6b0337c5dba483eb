//! Editing capabilities (plugins) and the per-session registry that holds them.

use serde::Serialize;
use std::collections::HashMap;

use crate::error::AssemblyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Formatting,
    Structure,
    DataBinding,
    Export,
    InputAssist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Core,
    Premium,
}

/// A self-contained editing feature registered into a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capability {
    pub id: String,
    pub category: Category,
    pub edition: Edition,
    /// Commands this capability exposes to toolbars and palettes.
    pub commands: Vec<String>,
    /// Commands that insert content and so belong in the quick-insert palette.
    pub insertable: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Capability {
    pub fn new(id: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            category,
            edition: Edition::Core,
            commands: Vec::new(),
            insertable: Vec::new(),
            settings: None,
        }
    }

    pub fn premium(mut self) -> Self {
        self.edition = Edition::Premium;
        self
    }

    pub fn with_commands(mut self, commands: &[&str]) -> Self {
        self.commands
            .extend(commands.iter().map(|command| command.to_string()));
        self
    }

    /// Insertable commands are also exposed commands.
    pub fn with_insertable(mut self, commands: &[&str]) -> Self {
        for command in commands {
            if !self.commands.iter().any(|c| c == command) {
                self.commands.push(command.to_string());
            }
            self.insertable.push(command.to_string());
        }
        self
    }

    pub fn with_settings(mut self, settings: serde_json::Map<String, serde_json::Value>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn exposes(&self, command: &str) -> bool {
        self.commands.iter().any(|c| c == command)
    }
}

/// Capabilities active in one session, in registration order.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: Vec<Capability>,
    by_id: HashMap<String, usize>,
    by_command: HashMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capability. On a duplicate id nothing is modified.
    pub fn register(&mut self, capability: Capability) -> Result<(), AssemblyError> {
        if self.by_id.contains_key(&capability.id) {
            return Err(AssemblyError::DuplicateCapability(capability.id));
        }

        let index = self.capabilities.len();
        self.by_id.insert(capability.id.clone(), index);
        for command in &capability.commands {
            // First provider wins when two capabilities expose one command
            self.by_command.entry(command.clone()).or_insert(index);
        }
        log::debug!(
            "Registered capability '{}' ({} commands)",
            capability.id,
            capability.commands.len()
        );
        self.capabilities.push(capability);
        Ok(())
    }

    pub fn resolve(&self, id: &str) -> Result<&Capability, AssemblyError> {
        self.by_id
            .get(id)
            .map(|&index| &self.capabilities[index])
            .ok_or_else(|| AssemblyError::UnknownCapability(id.to_string()))
    }

    /// The registered capability that provides `command`, if any.
    pub fn resolve_command(&self, command: &str) -> Option<&Capability> {
        self.by_command
            .get(command)
            .map(|&index| &self.capabilities[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.capabilities.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}
