//! An editing session: one assembled configuration plus one mount lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::assembly::{assemble, EditorConfiguration};
use crate::config::EditorConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{AssemblyError, MountError};
use crate::mount::{EditorEngine, MountController, MountSignals, MountState};

pub const DEFAULT_ENGINE_CLASS: &str = "ClassicEditor";

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Summary of a session for logs and the CLI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: u64,
    pub engine_class: String,
    pub started_at: DateTime<Utc>,
    pub state: MountState,
    pub capabilities: usize,
    pub warnings: usize,
}

pub struct Session {
    id: u64,
    engine_class: String,
    started_at: DateTime<Utc>,
    configuration: Arc<EditorConfiguration>,
    diagnostics: Diagnostics,
    controller: MountController,
}

impl Session {
    /// Assemble `config` and prepare an unmounted surface.
    ///
    /// Nothing is created when assembly fails.
    pub fn start(config: &EditorConfig, engine_class: &str) -> Result<Self, AssemblyError> {
        let assembly = assemble(config)?;
        Ok(Self::with_configuration(
            assembly.configuration,
            assembly.diagnostics,
            engine_class,
        ))
    }

    fn with_configuration(
        configuration: Arc<EditorConfiguration>,
        diagnostics: Diagnostics,
        engine_class: &str,
    ) -> Self {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "Session {} started with {} capabilities",
            id,
            configuration.registry().len()
        );
        Self {
            id,
            engine_class: engine_class.to_string(),
            started_at: Utc::now(),
            controller: MountController::new(engine_class, configuration.clone()),
            configuration,
            diagnostics,
        }
    }

    /// A fresh session over the same configuration, for remounting after an
    /// unmount. The new session starts in `NotReady`.
    pub fn remount(&self) -> Self {
        Self::with_configuration(
            self.configuration.clone(),
            self.diagnostics.clone(),
            &self.engine_class,
        )
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn configuration(&self) -> &Arc<EditorConfiguration> {
        &self.configuration
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn state(&self) -> MountState {
        self.controller.state()
    }

    pub fn controller(&self) -> &MountController {
        &self.controller
    }

    pub async fn layout_settled(&mut self, engine: &dyn EditorEngine) -> Result<(), MountError> {
        self.controller.on_layout_settled(engine).await
    }

    pub async fn unmount(&mut self, engine: &dyn EditorEngine) {
        self.controller.on_unmount(engine).await
    }

    pub async fn run(
        &mut self,
        engine: &dyn EditorEngine,
        signals: MountSignals,
    ) -> Result<MountState, MountError> {
        self.controller.run(engine, signals).await
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            engine_class: self.engine_class.clone(),
            started_at: self.started_at,
            state: self.state(),
            capabilities: self.configuration.registry().len(),
            warnings: self.diagnostics.warnings().count(),
        }
    }
}
