// Folio library exports

pub mod assembly;
pub mod capability;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod mount;
pub mod rules;
pub mod session;
pub mod toolbar;

pub use assembly::{assemble, Assembly, EditorConfiguration};
pub use capability::{Capability, CapabilityRegistry, Category, Edition};
pub use config::EditorConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{AssemblyError, MountError};
pub use mount::{signal_channel, EditorEngine, EngineHandle, MountController, MountState};
pub use session::{Session, DEFAULT_ENGINE_CLASS};
