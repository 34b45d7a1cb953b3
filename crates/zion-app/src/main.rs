//! Zion application binary - composition root.
//!
//! Ties the Zion crates into a single executable:
//! 1. Load configuration from TOML and apply CLI overrides
//! 2. Open the SQLite-backed freshness cache
//! 3. Restore cached data and refresh it from the data source
//! 4. Build the chat dispatcher and voice input
//! 5. Run the requested command (interactive chat by default)

mod cli;
mod repl;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use zion_chat::{ChatDispatcher, SessionEvent, VoiceCapability, VoiceInput};
use zion_core::config::ZionConfig;
use zion_core::types::ConnectionStatus;
use zion_storage::{
    DataRefresher, Database, DemoDataSource, FreshnessCache, SlotStore, SqliteSlotStore,
};

use cli::{CliArgs, Command};

/// SQLite file inside the data directory.
const DB_FILE: &str = "zion.db";

/// Everything a command needs.
struct App {
    refresher: DataRefresher,
    dispatcher: ChatDispatcher,
    voice: VoiceInput,
}

impl App {
    fn build(config: &ZionConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = config.general.resolved_data_dir().join(DB_FILE);
        let db = Database::new(&db_path)?;

        let store: Arc<dyn SlotStore> = Arc::new(SqliteSlotStore::new(Arc::new(db)));
        let cache = Arc::new(FreshnessCache::from_config(store, &config.cache));
        let refresher = DataRefresher::new(Arc::new(DemoDataSource), cache);

        let dispatcher = ChatDispatcher::from_config(&config.chat)?;
        let voice = VoiceInput::for_dispatcher(
            VoiceCapability::from_config(&config.voice),
            &dispatcher,
        );
        tracing::info!(
            primary = %config.chat.primary_url,
            secondary = %config.chat.secondary_url,
            voice = voice.is_available(),
            "Chat dispatcher ready"
        );

        Ok(Self {
            refresher,
            dispatcher,
            voice,
        })
    }

    /// Restore cached data, refresh from the source and load the session.
    async fn start(&self) {
        let session = self.dispatcher.session();
        session.apply(SessionEvent::ConnectionChanged(ConnectionStatus::Connecting));

        let outcome = self.refresher.start().await;
        tracing::info!(
            status = ?outcome.status,
            restored_from_cache = outcome.restored_from_cache,
            "Startup data loaded"
        );
        session.apply(SessionEvent::DataLoaded {
            data: outcome.data,
            status: outcome.status,
        });
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the stderr subscriber. The returned handle swaps the filter once
/// the config file's log level is known.
fn init_tracing(level: &str) -> reload::Handle<EnvFilter, Registry> {
    let (filter, handle) = reload::Layer::new(env_filter(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    handle
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing, first with the CLI level so config warnings are visible.
    let filter = init_tracing(&args.resolve_log_level("info"));
    tracing::info!("Starting Zion v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config = args.load_config()?;

    if let Err(e) = filter.reload(env_filter(&config.general.log_level)) {
        tracing::warn!(error = %e, "Failed to apply configured log level");
    }

    let app = App::build(&config)?;

    match args.command() {
        Command::Chat => {
            app.start().await;
            if let Some(welcome) = app.dispatcher.welcome() {
                repl::print_message(&welcome);
            }
            repl::run(&app.dispatcher, &app.voice).await?;
        }
        Command::Send { text } => {
            app.start().await;
            repl::print_report(app.dispatcher.send(&text.join(" ")).await);
        }
        Command::Status => {
            match app.refresher.cache().load() {
                Some(cached) => {
                    let age = chrono::Utc::now() - cached.captured_at;
                    app.dispatcher.session().apply(SessionEvent::DataLoaded {
                        data: cached.data,
                        status: ConnectionStatus::Connecting,
                    });
                    println!(
                        "cached at {} ({}s ago, feed not contacted)",
                        cached.captured_at.to_rfc3339(),
                        age.num_seconds().max(0)
                    );
                }
                None => println!("no fresh cached data"),
            }
            for line in repl::status_lines(&app.dispatcher.state()) {
                println!("{}", line);
            }
        }
        Command::Refresh => {
            let current = app
                .refresher
                .cache()
                .load()
                .map(|cached| cached.data)
                .unwrap_or_default();
            let data = app.refresher.refresh(&current).await?;
            println!(
                "refreshed: {} subscriptions, ${}/month",
                data.subscriptions.len(),
                data.monthly_cost()
            );
        }
        Command::Portal { id, action } => {
            app.start().await;
            repl::print_message(&app.dispatcher.enter_portal(id));
            let action = action.join(" ");
            if !action.is_empty() {
                repl::print_report(app.dispatcher.portal_action(id, &action).await);
            }
        }
    }

    Ok(())
}
