use async_trait::async_trait;
use folio::assembly::{assemble, EditorConfiguration};
use folio::capability::CapabilityRegistry;
use folio::catalog;
use folio::config::{
    EditorConfig, MergeFieldDefinition, TableSection, TemplateDefinition, ToolbarSection,
};
use folio::diagnostics::{DiagnosticKind, Severity};
use folio::mount::{signal_channel, EditorEngine, EngineHandle, MountState};
use folio::session::{Session, DEFAULT_ENGINE_CLASS};
use folio::toolbar::{build_layout, Provider, ToolbarEntry, SEPARATOR};
use std::sync::Mutex;

#[derive(Default)]
struct CountingEngine {
    constructs: Mutex<u32>,
    destroys: Mutex<u32>,
}

impl CountingEngine {
    fn counts(&self) -> (u32, u32) {
        (*self.constructs.lock().unwrap(), *self.destroys.lock().unwrap())
    }
}

#[async_trait]
impl EditorEngine for CountingEngine {
    async fn construct(
        &self,
        _engine_class: &str,
        _configuration: &EditorConfiguration,
    ) -> anyhow::Result<EngineHandle> {
        let mut constructs = self.constructs.lock().unwrap();
        *constructs += 1;
        Ok(EngineHandle::new(u64::from(*constructs)))
    }

    async fn destroy(&self, _handle: EngineHandle) -> anyhow::Result<()> {
        *self.destroys.lock().unwrap() += 1;
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn scenario_a_toolbar_over_bold_link_table() {
    let mut registry = CapabilityRegistry::new();
    for name in ["Bold", "Link", "Table"] {
        registry.register(catalog::lookup(name).unwrap()).unwrap();
    }

    let tokens = ["undo", "redo", "|", "bold", "|", "link", "insertTable"];
    let layout = build_layout(&registry, &tokens).unwrap();

    let rendered: Vec<&str> = layout
        .iter()
        .map(|entry| entry.command_name().unwrap_or(SEPARATOR))
        .collect();
    assert_eq!(rendered, tokens.to_vec());
    assert_eq!(layout.iter().filter(|e| e.is_separator()).count(), 2);
    assert_eq!(layout.iter().filter(|e| !e.is_separator()).count(), 5);

    match &layout[0] {
        ToolbarEntry::Command(command) => assert_eq!(command.provider, Provider::Engine),
        other => panic!("expected a command, got {:?}", other),
    }
    match &layout[6] {
        ToolbarEntry::Command(command) => {
            assert_eq!(command.provider, Provider::Capability("Table".to_string()))
        }
        other => panic!("expected a command, got {:?}", other),
    }
}

#[test]
fn scenario_a_through_assembly() {
    let mut config = EditorConfig::default();
    config.plugins = strings(&["Bold", "Link", "Table"]);
    config.toolbar = ToolbarSection {
        items: strings(&["undo", "redo", "|", "bold", "|", "link", "insertTable"]),
        should_not_group_when_full: false,
    };
    config.table = TableSection {
        content_toolbar: strings(&["tableColumn", "tableRow", "mergeTableCells"]),
        ..Default::default()
    };
    config.export_pdf = None;
    config.merge_fields.definitions.clear();
    config.template.definitions.clear();
    config.mention.feeds.clear();

    let assembly = assemble(&config).unwrap();
    let toolbar = &assembly.configuration.toolbar;
    assert_eq!(toolbar.commands().count(), 5);
    assert_eq!(toolbar.separator_count(), 2);
    assert!(assembly.configuration.quick_insert.is_empty());
}

#[test]
fn scenario_b_unmatched_placeholder_warning() {
    let mut config = EditorConfig::default();
    config.merge_fields.definitions = vec![
        MergeFieldDefinition {
            id: "myName".to_string(),
            label: "My name".to_string(),
            default_value: "John Doe".to_string(),
        },
        MergeFieldDefinition {
            id: "invoiceDate".to_string(),
            label: "Invoice date".to_string(),
            default_value: "2024-06-01".to_string(),
        },
    ];
    config.template.definitions = vec![TemplateDefinition {
        title: "Reminder".to_string(),
        description: String::new(),
        body: "<p>{{myName}}, payment is due {{dueDate}}.</p>".to_string(),
        format: Default::default(),
    }];

    let assembly = assemble(&config).unwrap();
    let warnings: Vec<_> = assembly.diagnostics.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity, Severity::Warning);
    assert_eq!(
        warnings[0].kind,
        DiagnosticKind::UnmatchedPlaceholder {
            template: "Reminder".to_string(),
            field: "dueDate".to_string(),
        }
    );
    assert!(!assembly.diagnostics.iter().any(|d| matches!(
        &d.kind,
        DiagnosticKind::UnmatchedPlaceholder { field, .. } if field == "myName"
    )));

    config.strict_placeholders = true;
    assert!(assemble(&config).is_err());
}

#[tokio::test]
async fn scenario_c_layout_then_unmount() {
    let engine = CountingEngine::default();
    let mut session = Session::start(&EditorConfig::default(), DEFAULT_ENGINE_CLASS).unwrap();
    let (mut host, signals) = signal_channel();

    host.layout_settled();
    host.unmount();

    let state = session.run(&engine, signals).await.unwrap();
    assert_eq!(state, MountState::Unmounted);
    assert_eq!(engine.counts(), (1, 1));
}

#[tokio::test]
async fn scenario_d_unmount_before_layout() {
    let engine = CountingEngine::default();
    let mut session = Session::start(&EditorConfig::default(), DEFAULT_ENGINE_CLASS).unwrap();
    let (mut host, signals) = signal_channel();

    host.unmount();
    host.layout_settled();

    let state = session.run(&engine, signals).await.unwrap();
    assert_eq!(state, MountState::Unmounted);
    assert_eq!(engine.counts(), (0, 0));
}
