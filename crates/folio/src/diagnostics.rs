use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DiagnosticKind {
    /// Export would produce an unstyled artifact.
    EmptyStylesheetSet,
    /// A template placeholder with no merge-field definition.
    UnmatchedPlaceholder { template: String, field: String },
    /// The engine will run in evaluation mode.
    MissingLicenseKey,
    /// A suppressed quick-insert command no active capability provides.
    SuppressedCommandNotProvided(String),
}

/// A non-fatal finding surfaced to the host alongside the assembled config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind) -> Self {
        let severity = Self::default_severity_for_kind(&kind);
        let message = Self::describe(&kind);
        Self {
            severity,
            kind,
            message,
        }
    }

    pub fn empty_stylesheet_set() -> Self {
        Self::new(DiagnosticKind::EmptyStylesheetSet)
    }

    pub fn unmatched_placeholder(template: &str, field: &str) -> Self {
        Self::new(DiagnosticKind::UnmatchedPlaceholder {
            template: template.to_string(),
            field: field.to_string(),
        })
    }

    fn default_severity_for_kind(kind: &DiagnosticKind) -> Severity {
        match kind {
            DiagnosticKind::MissingLicenseKey => Severity::Info,
            DiagnosticKind::EmptyStylesheetSet
            | DiagnosticKind::UnmatchedPlaceholder { .. }
            | DiagnosticKind::SuppressedCommandNotProvided(_) => Severity::Warning,
        }
    }

    fn describe(kind: &DiagnosticKind) -> String {
        match kind {
            DiagnosticKind::EmptyStylesheetSet => {
                "Export has no stylesheets; the exported document will be unstyled".to_string()
            }
            DiagnosticKind::UnmatchedPlaceholder { template, field } => format!(
                "Template '{}' uses placeholder '{{{{{}}}}}' with no merge field definition",
                template, field
            ),
            DiagnosticKind::MissingLicenseKey => {
                "No license key configured; the engine runs in evaluation mode".to_string()
            }
            DiagnosticKind::SuppressedCommandNotProvided(command) => format!(
                "Quick-insert suppresses '{}' but no active capability provides it",
                command
            ),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", label, self.message)
    }
}

/// Ordered collection of findings from one assembly run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => log::info!("{}", diagnostic.message),
            Severity::Warning => log::warn!("{}", diagnostic.message),
        }
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }
}
