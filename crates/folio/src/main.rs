use anyhow::{anyhow, Result};
use async_trait::async_trait;
use folio::assembly::{assemble, EditorConfiguration};
use folio::config::EditorConfig;
use folio::mount::{signal_channel, EditorEngine, EngineHandle};
use folio::session::{Session, DEFAULT_ENGINE_CLASS};
use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

const USAGE: &str = "usage: folio <check|dump|mount> [config.json]\n       folio preview <title> [config.json]";

enum Command {
    Check,
    Dump,
    Preview(String),
    Mount,
}

/// Stands in for the rich-text engine: logs what it would build.
#[derive(Default)]
struct LoggingEngine {
    next_id: AtomicU64,
}

#[async_trait]
impl EditorEngine for LoggingEngine {
    async fn construct(
        &self,
        engine_class: &str,
        configuration: &EditorConfiguration,
    ) -> Result<EngineHandle> {
        let handle = EngineHandle::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        log::info!(
            "{} #{} constructed: {} plugins, {} toolbar items",
            engine_class,
            handle.id(),
            configuration.registry().len(),
            configuration.toolbar.items.len()
        );
        Ok(handle)
    }

    async fn destroy(&self, handle: EngineHandle) -> Result<()> {
        log::info!("Engine #{} destroyed", handle.id());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("folio", LevelFilter::Debug);
    }
    logger.init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (command, path) = parse_args(&args)?;

    // Only mount may create or repair the user's config file
    let config = match (path, &command) {
        (Some(path), _) => EditorConfig::load_from(&path).await?,
        (None, Command::Mount) => EditorConfig::load().await?,
        (None, _) => EditorConfig::load_existing().await?,
    };

    match command {
        Command::Check => check(&config),
        Command::Dump => {
            let assembly = assemble(&config)?;
            println!("{}", serde_json::to_string_pretty(&*assembly.configuration)?);
            Ok(())
        }
        Command::Preview(title) => {
            let assembly = assemble(&config)?;
            let preview = assembly
                .configuration
                .preview_template(&title)
                .ok_or_else(|| anyhow!("No template titled '{}'", title))?;
            println!("{}", preview);
            Ok(())
        }
        Command::Mount => mount(&config).await,
    }
}

fn parse_args(args: &[String]) -> Result<(Command, Option<PathBuf>)> {
    let mut rest = args.iter();
    let command = match rest.next().map(String::as_str) {
        Some("check") => Command::Check,
        Some("dump") => Command::Dump,
        Some("mount") => Command::Mount,
        Some("preview") => {
            let title = rest
                .next()
                .ok_or_else(|| anyhow!("preview needs a template title\n{}", USAGE))?;
            Command::Preview(title.clone())
        }
        Some(other) => return Err(anyhow!("Unknown command '{}'\n{}", other, USAGE)),
        None => return Err(anyhow!(USAGE)),
    };

    let path = rest.next().map(PathBuf::from);
    if let Some(extra) = rest.next() {
        return Err(anyhow!("Unexpected argument '{}'\n{}", extra, USAGE));
    }
    Ok((command, path))
}

fn check(config: &EditorConfig) -> Result<()> {
    let assembly = match assemble(config) {
        Ok(assembly) => assembly,
        Err(e) => {
            eprintln!("error: {}", e);
            return Err(e.into());
        }
    };

    for diagnostic in assembly.diagnostics.iter() {
        println!("{}", diagnostic);
    }
    println!(
        "ok: {} capabilities, {} toolbar entries, {} quick-insert commands",
        assembly.configuration.registry().len(),
        assembly.configuration.toolbar.items.len(),
        assembly.configuration.quick_insert.len()
    );
    Ok(())
}

async fn mount(config: &EditorConfig) -> Result<()> {
    let mut session = Session::start(config, DEFAULT_ENGINE_CLASS)?;
    let engine = LoggingEngine::default();
    let (mut host, signals) = signal_channel();

    host.layout_settled();
    let host_task = tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
        }
        host.unmount();
    });

    log::info!("Mounted; press Ctrl-C to unmount");
    let result = session.run(&engine, signals).await;
    host_task.abort();

    let state = result?;
    log::info!("Session {} ended in state {:?}", session.id(), state);
    println!("{}", serde_json::to_string_pretty(&session.info())?);
    Ok(())
}
