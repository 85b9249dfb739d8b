// src/main.rs — Habitgram entry point

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use habitgram::bot::callback::Callback;
use habitgram::bot::{DialogEngine, EventKind, InboundEvent, Reply};
use habitgram::infra::config::Config;
use habitgram::infra::logger;
use habitgram::pixela::PixelaClient;
use habitgram::store::directory::UserDirectory;
use habitgram::store::schema;
use habitgram::store::store::Store;
use habitgram::telegram::types::{BotCommand, Update};
use habitgram::telegram::TelegramApi;

#[derive(Parser)]
#[command(name = "habitgram", about = "Telegram bot for habit charts", version)]
struct Cli {
    /// Path to a config file (defaults to the per-user config dir)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (default)
    Run,
    /// Check configuration, storage, and connectivity
    Doctor,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG / HABITGRAM_LOG)
    logger::init_logging("info");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(&config).await,
        Commands::Doctor => run_doctor(&config).await,
        Commands::Migrate => {
            init_store(&config)?;
            println!("migrations up to date");
            Ok(())
        }
    }
}

fn init_store(config: &Config) -> anyhow::Result<Store> {
    let db_path = config.db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = rusqlite::Connection::open(&db_path)?;
    schema::run_migrations(&conn)?;
    info!("Database ready at {}", db_path.display());
    Ok(Store::new(conn))
}

async fn run_doctor(config: &Config) -> anyhow::Result<()> {
    println!("habitgram doctor");

    match config.bot_token() {
        Some(token) => {
            let api = TelegramApi::new(token);
            match api.get_me().await {
                Ok(username) => println!("  telegram: ok (@{username})"),
                Err(e) => println!("  telegram: token rejected ({e})"),
            }
        }
        None => println!("  telegram: no bot token (set telegram.bot_token or HABITGRAM_BOT_TOKEN)"),
    }

    match config.service_token() {
        Some(_) => println!("  pixela: service token present ({})", config.pixela.base_url),
        None => println!("  pixela: no service token (set pixela.service_token or PIXELA_TOKEN)"),
    }

    match init_store(config) {
        Ok(store) => {
            let pending = schema::pending_migrations(store.conn())?;
            println!("  storage: ok ({pending} pending migrations)");
        }
        Err(e) => println!("  storage: {e}"),
    }

    Ok(())
}

async fn run_bot(config: &Config) -> anyhow::Result<()> {
    let bot_token = config
        .bot_token()
        .ok_or_else(|| anyhow::anyhow!("no bot token configured"))?;
    let service_token = config
        .service_token()
        .ok_or_else(|| anyhow::anyhow!("no chart-service token configured"))?;

    let store = init_store(config)?;
    let directory = UserDirectory::new(store);
    let service = PixelaClient::new(
        config.pixela.base_url.clone(),
        service_token,
        config.pixela.username_prefix.clone(),
    );
    let api = TelegramApi::new(bot_token);

    let bot_name = api.get_me().await?;
    info!("Connected as @{bot_name}");

    api.set_my_commands(&[
        BotCommand::new("start", "Find or create your profile."),
        BotCommand::new("select", "Show your charts."),
        BotCommand::new("create", "Create a new chart."),
        BotCommand::new("delete", "Delete your profile."),
    ])
    .await?;

    let mut engine = DialogEngine::new(service, directory);
    let mut offset: i64 = 0;
    let timeout = config.bot.poll_timeout_secs;

    info!("Polling for updates");
    loop {
        let updates = tokio::select! {
            result = api.get_updates(offset, timeout) => match result {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("getUpdates failed: {e}");
                    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            if let Err(e) = process_update(&api, &mut engine, update).await {
                error!("Failed to process update: {e}");
            }
        }
    }
}

async fn process_update(
    api: &TelegramApi,
    engine: &mut DialogEngine<PixelaClient>,
    update: Update,
) -> anyhow::Result<()> {
    let Some(event) = classify(&update) else {
        return Ok(());
    };
    let chat_id = event.chat_id;
    let message_id = event.message_id;

    let replies = engine.handle(event).await?;
    deliver(api, chat_id, message_id, replies).await?;

    // stop the client-side spinner on the pressed button
    if let Some(cq) = &update.callback_query {
        api.answer_callback_query(&cq.id).await?;
    }
    Ok(())
}

/// Turn a raw update into the engine's event shape. Updates without
/// anything actionable (no text, unknown payloads) are dropped.
fn classify(update: &Update) -> Option<InboundEvent> {
    if let Some(message) = &update.message {
        let text = message.text.as_deref()?;
        let from = message.from.as_ref()?;
        return Some(InboundEvent {
            chat_id: message.chat.id,
            user_id: from.id,
            display_name: from.first_name.clone(),
            message_id: None,
            kind: EventKind::of_text(text),
        });
    }
    if let Some(cq) = &update.callback_query {
        let callback = Callback::parse(cq.data.as_deref()?)?;
        let message = cq.message.as_ref()?;
        return Some(InboundEvent {
            chat_id: message.chat.id,
            user_id: cq.from.id,
            display_name: cq.from.first_name.clone(),
            message_id: Some(message.message_id),
            kind: EventKind::Callback(callback),
        });
    }
    None
}

async fn deliver(
    api: &TelegramApi,
    chat_id: i64,
    message_id: Option<i64>,
    replies: Vec<Reply>,
) -> anyhow::Result<()> {
    for reply in replies {
        match reply {
            Reply::Send { text, markup, pin } => {
                let sent = api.send_message(chat_id, &text, markup.as_ref()).await?;
                if pin {
                    api.pin_chat_message(chat_id, sent.message_id).await?;
                }
            }
            Reply::EditText { text, markup } => match message_id {
                Some(id) => {
                    api.edit_message_text(chat_id, id, &text, markup.as_ref())
                        .await?
                }
                // no button message to edit, send fresh
                None => {
                    let markup = markup.map(habitgram::telegram::types::ReplyMarkup::Inline);
                    api.send_message(chat_id, &text, markup.as_ref()).await?;
                }
            },
            Reply::EditMarkup { markup } => {
                if let Some(id) = message_id {
                    api.edit_message_reply_markup(chat_id, id, &markup).await?;
                }
            }
        }
    }
    Ok(())
}
