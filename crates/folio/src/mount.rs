//! Two-phase mount lifecycle for the editing surface.
//!
//! ```text
//! NotReady --layout settled--> Ready --unmount--> Unmounted
//!     \_________________unmount_________________/^
//! ```
//!
//! The engine is constructed only on the `NotReady -> Ready` edge and
//! destroyed only on the `Ready -> Unmounted` edge. A controller never goes
//! back to `NotReady`; remounting means building a new one.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::assembly::EditorConfiguration;
use crate::error::MountError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MountState {
    NotReady,
    Ready,
    Unmounted,
}

/// Opaque reference to a live engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineHandle(u64);

impl EngineHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The external rich-text engine the shell configures but never implements.
#[async_trait]
pub trait EditorEngine: Send + Sync {
    async fn construct(
        &self,
        engine_class: &str,
        configuration: &EditorConfiguration,
    ) -> anyhow::Result<EngineHandle>;

    async fn destroy(&self, handle: EngineHandle) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    LayoutSettled,
    Unmount,
}

/// The host's side of the signal channel. Each signal fires at most once.
#[derive(Debug)]
pub struct HostSignals {
    sender: mpsc::UnboundedSender<HostSignal>,
    layout_sent: bool,
    unmount_sent: bool,
}

impl HostSignals {
    pub fn layout_settled(&mut self) {
        if !self.layout_sent {
            self.layout_sent = true;
            let _ = self.sender.send(HostSignal::LayoutSettled);
        }
    }

    pub fn unmount(&mut self) {
        if !self.unmount_sent {
            self.unmount_sent = true;
            let _ = self.sender.send(HostSignal::Unmount);
        }
    }
}

/// The controller's side of the signal channel.
#[derive(Debug)]
pub struct MountSignals {
    receiver: mpsc::UnboundedReceiver<HostSignal>,
}

pub fn signal_channel() -> (HostSignals, MountSignals) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        HostSignals {
            sender,
            layout_sent: false,
            unmount_sent: false,
        },
        MountSignals { receiver },
    )
}

pub struct MountController {
    state: MountState,
    engine_class: String,
    configuration: Arc<EditorConfiguration>,
    handle: Option<EngineHandle>,
}

impl MountController {
    pub fn new(engine_class: impl Into<String>, configuration: Arc<EditorConfiguration>) -> Self {
        Self {
            state: MountState::NotReady,
            engine_class: engine_class.into(),
            configuration,
            handle: None,
        }
    }

    pub fn state(&self) -> MountState {
        self.state
    }

    pub fn handle(&self) -> Option<&EngineHandle> {
        self.handle.as_ref()
    }

    pub fn configuration(&self) -> &Arc<EditorConfiguration> {
        &self.configuration
    }

    /// Container layout is final: construct the engine.
    pub async fn on_layout_settled(&mut self, engine: &dyn EditorEngine) -> Result<(), MountError> {
        if self.state != MountState::NotReady {
            log::debug!("Ignoring layout signal in state {:?}", self.state);
            return Ok(());
        }

        self.state = MountState::Ready;
        log::info!("Layout settled, constructing {}", self.engine_class);

        match engine
            .construct(&self.engine_class, &self.configuration)
            .await
        {
            Ok(handle) => {
                log::debug!("Engine constructed with handle {}", handle.id());
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                log::error!("Engine construction failed: {}", e);
                self.state = MountState::Unmounted;
                Err(MountError::Construct(e.to_string()))
            }
        }
    }

    /// Tear down. Always completes; a failing destroy is logged and dropped.
    pub async fn on_unmount(&mut self, engine: &dyn EditorEngine) {
        match self.state {
            MountState::Unmounted => {
                log::debug!("Unmount ignored, already unmounted");
                return;
            }
            MountState::NotReady => log::info!("Unmounted before layout settled"),
            MountState::Ready => log::info!("Unmounting {}", self.engine_class),
        }

        self.state = MountState::Unmounted;
        if let Some(handle) = self.handle.take() {
            let id = handle.id();
            if let Err(e) = engine.destroy(handle).await {
                log::error!("Engine destroy failed for handle {}: {}", id, e);
            }
        }
    }

    /// Drive the lifecycle from host signals until the surface is unmounted.
    ///
    /// There is no timeout: without a layout signal the controller waits in
    /// `NotReady` until the host unmounts. A closed channel counts as unmount.
    pub async fn run(
        &mut self,
        engine: &dyn EditorEngine,
        mut signals: MountSignals,
    ) -> Result<MountState, MountError> {
        while self.state != MountState::Unmounted {
            match signals.receiver.recv().await {
                Some(HostSignal::LayoutSettled) => self.on_layout_settled(engine).await?,
                Some(HostSignal::Unmount) => self.on_unmount(engine).await,
                None => {
                    log::warn!("Host signal channel closed, tearing down");
                    self.on_unmount(engine).await;
                }
            }
        }
        Ok(self.state)
    }
}

impl Drop for MountController {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            log::error!(
                "Mount controller dropped while engine {} is still live",
                handle.id()
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assembly::assemble;
    use crate::config::EditorConfig;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        Construct(String),
        Destroy(u64),
    }

    #[derive(Default)]
    pub(crate) struct RecordingEngine {
        pub calls: Mutex<Vec<Call>>,
        next_id: AtomicU64,
        pub fail_construct: bool,
        pub fail_destroy: bool,
    }

    impl RecordingEngine {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EditorEngine for RecordingEngine {
        async fn construct(
            &self,
            engine_class: &str,
            _configuration: &EditorConfiguration,
        ) -> anyhow::Result<EngineHandle> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Construct(engine_class.to_string()));
            if self.fail_construct {
                anyhow::bail!("container has zero width");
            }
            Ok(EngineHandle::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1))
        }

        async fn destroy(&self, handle: EngineHandle) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(Call::Destroy(handle.id()));
            if self.fail_destroy {
                anyhow::bail!("engine already crashed");
            }
            Ok(())
        }
    }

    fn controller() -> MountController {
        let assembly = assemble(&EditorConfig::default()).unwrap();
        MountController::new("ClassicEditor", assembly.configuration)
    }

    #[tokio::test]
    async fn test_starts_not_ready_and_constructs_on_layout() {
        let engine = RecordingEngine::default();
        let mut controller = controller();
        assert_eq!(controller.state(), MountState::NotReady);
        assert!(engine.calls().is_empty());

        controller.on_layout_settled(&engine).await.unwrap();
        assert_eq!(controller.state(), MountState::Ready);
        assert_eq!(controller.handle(), Some(&EngineHandle::new(1)));
        assert_eq!(
            engine.calls(),
            vec![Call::Construct("ClassicEditor".to_string())]
        );

        controller.on_unmount(&engine).await;
    }

    #[tokio::test]
    async fn test_repeated_layout_signal_constructs_once() {
        let engine = RecordingEngine::default();
        let mut controller = controller();
        controller.on_layout_settled(&engine).await.unwrap();
        controller.on_layout_settled(&engine).await.unwrap();
        assert_eq!(engine.calls().len(), 1);

        controller.on_unmount(&engine).await;
        controller.on_layout_settled(&engine).await.unwrap();
        assert_eq!(controller.state(), MountState::Unmounted);
        assert_eq!(engine.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_early_unmount_never_constructs_or_destroys() {
        let engine = RecordingEngine::default();
        let mut controller = controller();

        controller.on_unmount(&engine).await;
        controller.on_layout_settled(&engine).await.unwrap();

        assert_eq!(controller.state(), MountState::Unmounted);
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unmount_is_idempotent() {
        let engine = RecordingEngine::default();
        let mut controller = controller();
        controller.on_layout_settled(&engine).await.unwrap();

        controller.on_unmount(&engine).await;
        controller.on_unmount(&engine).await;

        assert_eq!(
            engine.calls(),
            vec![Call::Construct("ClassicEditor".to_string()), Call::Destroy(1)]
        );
        assert!(controller.handle().is_none());
    }

    #[tokio::test]
    async fn test_destroy_failure_is_swallowed() {
        let engine = RecordingEngine {
            fail_destroy: true,
            ..Default::default()
        };
        let mut controller = controller();
        controller.on_layout_settled(&engine).await.unwrap();
        controller.on_unmount(&engine).await;

        assert_eq!(controller.state(), MountState::Unmounted);
        assert!(controller.handle().is_none());
    }

    #[tokio::test]
    async fn test_construct_failure_ends_unmounted() {
        let engine = RecordingEngine {
            fail_construct: true,
            ..Default::default()
        };
        let mut controller = controller();
        let err = controller.on_layout_settled(&engine).await.unwrap_err();
        assert!(err.to_string().contains("zero width"));
        assert_eq!(controller.state(), MountState::Unmounted);

        controller.on_unmount(&engine).await;
        assert_eq!(
            engine.calls(),
            vec![Call::Construct("ClassicEditor".to_string())]
        );
    }

    #[tokio::test]
    async fn test_run_follows_signal_order() {
        let engine = RecordingEngine::default();
        let mut controller = controller();
        let (mut host, signals) = signal_channel();

        host.layout_settled();
        host.layout_settled();
        host.unmount();

        let state = controller.run(&engine, signals).await.unwrap();
        assert_eq!(state, MountState::Unmounted);
        assert_eq!(
            engine.calls(),
            vec![Call::Construct("ClassicEditor".to_string()), Call::Destroy(1)]
        );
    }

    #[tokio::test]
    async fn test_run_treats_dropped_host_as_unmount() {
        let engine = RecordingEngine::default();
        let mut controller = controller();
        let (mut host, signals) = signal_channel();

        host.layout_settled();
        drop(host);

        let state = controller.run(&engine, signals).await.unwrap();
        assert_eq!(state, MountState::Unmounted);
        assert_eq!(engine.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_run_waits_for_layout_signal() {
        let engine = Arc::new(RecordingEngine::default());
        let (mut host, signals) = signal_channel();

        let task_engine = engine.clone();
        let task = tokio::spawn(async move {
            let mut controller = controller();
            controller.run(task_engine.as_ref(), signals).await
        });

        tokio::task::yield_now().await;
        assert!(engine.calls().is_empty());

        host.layout_settled();
        host.unmount();
        let state = task.await.unwrap().unwrap();
        assert_eq!(state, MountState::Unmounted);
        assert_eq!(engine.calls().len(), 2);
    }
}
