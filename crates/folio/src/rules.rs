//! Constraints between independently configured capabilities.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::capability::CapabilityRegistry;
use crate::config::{MergeFieldDefinition, TemplateDefinition};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::AssemblyError;

/// Commands hidden from the quick-insert palette because the toolbar already
/// offers them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressedCommandSet(BTreeSet<String>);

impl SuppressedCommandSet {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(commands.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, command: &str) -> bool {
        self.0.contains(command)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Insertable commands of every registered capability, minus `suppressed`.
pub fn quick_insert_commands(
    registry: &CapabilityRegistry,
    suppressed: &SuppressedCommandSet,
) -> BTreeSet<String> {
    registry
        .iter()
        .flat_map(|capability| capability.insertable.iter())
        .filter(|command| !suppressed.contains(command))
        .cloned()
        .collect()
}

/// Suppressions naming a command nothing provides; usually a typo.
pub fn unprovided_suppressions(
    registry: &CapabilityRegistry,
    suppressed: &SuppressedCommandSet,
) -> Vec<Diagnostic> {
    suppressed
        .iter()
        .filter(|command| registry.resolve_command(command).is_none())
        .map(|command| {
            Diagnostic::new(DiagnosticKind::SuppressedCommandNotProvided(
                command.to_string(),
            ))
        })
        .collect()
}

/// Reject duplicate ids and ids that cannot appear in a `{{id}}` token.
pub fn check_merge_fields(definitions: &[MergeFieldDefinition]) -> Result<(), AssemblyError> {
    let mut seen = HashSet::new();
    for definition in definitions {
        if !mergecore::is_valid_field_id(&definition.id) {
            return Err(AssemblyError::InvalidSection {
                section: "mergeFields".to_string(),
                reason: format!("'{}' is not a valid merge field id", definition.id),
            });
        }
        if !seen.insert(definition.id.as_str()) {
            return Err(AssemblyError::DuplicateMergeField(definition.id.clone()));
        }
    }
    Ok(())
}

/// Report each template placeholder with no merge-field definition.
///
/// Output is sorted by template, then field, and holds one entry per distinct
/// field per template, so repeated runs over the same input are identical.
pub fn check_placeholders(
    templates: &[TemplateDefinition],
    merge_fields: &[MergeFieldDefinition],
) -> Vec<Diagnostic> {
    let known: HashSet<&str> = merge_fields.iter().map(|f| f.id.as_str()).collect();

    let mut unmatched: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for template in templates {
        for id in mergecore::placeholder_ids(&template.body) {
            if !known.contains(id.as_str()) {
                unmatched.entry(template.title.as_str()).or_default().insert(id);
            }
        }
    }

    unmatched
        .into_iter()
        .flat_map(|(template, fields)| {
            fields
                .into_iter()
                .map(move |field| Diagnostic::unmatched_placeholder(template, &field))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MentionItem {
    pub id: String,
    pub text: String,
}

type FeedFn = dyn Fn(&str) -> Vec<MentionItem> + Send + Sync;

/// Resolves what a mention marker offers for the text typed after it.
#[derive(Clone)]
pub struct MentionFeed(Arc<FeedFn>);

impl MentionFeed {
    pub fn from_fn<F>(feed: F) -> Self
    where
        F: Fn(&str) -> Vec<MentionItem> + Send + Sync + 'static,
    {
        Self(Arc::new(feed))
    }

    /// A fixed list, filtered case-insensitively by what follows the marker.
    pub fn from_list(marker: &str, items: Vec<String>) -> Self {
        let marker = marker.to_string();
        Self::from_fn(move |query| {
            let query = query.to_lowercase();
            items
                .iter()
                .filter(|item| {
                    item.trim_start_matches(marker.as_str())
                        .to_lowercase()
                        .starts_with(&query)
                })
                .map(|item| {
                    let id = if item.starts_with(marker.as_str()) {
                        item.clone()
                    } else {
                        format!("{}{}", marker, item)
                    };
                    MentionItem {
                        text: id.clone(),
                        id,
                    }
                })
                .collect()
        })
    }

    pub fn resolve(&self, query: &str) -> Vec<MentionItem> {
        (self.0)(query)
    }
}

impl fmt::Debug for MentionFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MentionFeed(..)")
    }
}

/// One feed per trigger marker.
#[derive(Debug, Clone, Default)]
pub struct MentionFeeds {
    feeds: BTreeMap<char, MentionFeed>,
}

impl MentionFeeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, marker: &str, feed: MentionFeed) -> Result<(), AssemblyError> {
        let mut chars = marker.chars();
        let trigger = match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() => c,
            _ => {
                return Err(AssemblyError::InvalidSection {
                    section: "mention".to_string(),
                    reason: format!("marker '{}' must be a single character", marker),
                })
            }
        };

        if self.feeds.contains_key(&trigger) {
            return Err(AssemblyError::ConflictingTrigger(marker.to_string()));
        }
        self.feeds.insert(trigger, feed);
        Ok(())
    }

    pub fn resolve(&self, marker: char, query: &str) -> Option<Vec<MentionItem>> {
        self.feeds.get(&marker).map(|feed| feed.resolve(query))
    }

    pub fn markers(&self) -> Vec<char> {
        self.feeds.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }
}
