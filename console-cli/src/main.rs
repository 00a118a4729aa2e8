//! Command-line front end for the translation platform admin console.
//!
//! Reads its configuration from the environment (`CONSOLE_API_ADDRESS`,
//! `CONSOLE_WEBSOCKET_ADDRESS`, ...), keeps the session profile in a JSON
//! storage file, and prints alerts to stderr as they are published.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use console_core::commands;
use console_core::{
    AlertMessage, AlertSeverity, ApiClient, Config, ConsoleError, EventBus, FileStorage,
    GuardDecision, HistoryNavigator, Navigator, ReferenceStore, RouteGuard, ALERT_MESSAGE_KEY,
};

use cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();
    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<ExitCode, ConsoleError> {
    let config = Arc::new(Config::from_env()?);
    let storage_path = match args.storage.clone().or_else(|| config.storage_path.clone()) {
        Some(path) => path,
        None => FileStorage::default_path()?,
    };
    let storage = Arc::new(FileStorage::open(storage_path)?);
    let navigator = Arc::new(HistoryNavigator::new());
    let bus = Arc::new(EventBus::new());
    bus.on(ALERT_MESSAGE_KEY, print_alert);

    let client = ApiClient::new(config.clone(), bus, storage.clone(), navigator.clone())?;

    if let Some((email, password)) = args.credentials() {
        if !commands::login(&client, email, password).await? {
            return Ok(ExitCode::FAILURE);
        }
    }

    match args.command {
        Command::Me => {
            if !commands::fetch_personal_info(&client, true).await? {
                eprintln!("Not signed in");
                return Ok(ExitCode::FAILURE);
            }
            if let Some(info) = commands::cached_user_info(storage.as_ref()) {
                println!("{}", serde_json::to_string_pretty(&info)?);
            }
        }
        Command::Logout => commands::logout(&client).await?,
        Command::Article { id } => match commands::get_article(&client, &id).await? {
            Some(article) => println!("{}", serde_json::to_string_pretty(&article)?),
            None => return Ok(ExitCode::FAILURE),
        },
        Command::References => {
            let store = ReferenceStore::new();
            commands::load_reference_tables(&client, &store).await?;
            println!("{}", serde_json::to_string_pretty(&store.snapshot().await)?);
        }
        Command::Guard { path } => {
            let guard = RouteGuard::new(storage)?;
            match guard.navigate(navigator.as_ref(), &path) {
                GuardDecision::Allow => println!("allow {}", navigator.current_path()),
                GuardDecision::Redirect(target) => {
                    println!("redirect {} -> {}", path, target);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Watch { path } => {
            let url = config.websocket_url(&path);
            let Some(mut socket) = client.websocket_connector().get_websocket(&url).await else {
                return Ok(ExitCode::FAILURE);
            };
            while let Some(frame) = socket.next().await {
                match frame {
                    Ok(Message::Text(text)) => println!("{}", text),
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => return Err(ConsoleError::WebSocket(e.to_string())),
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_alert(alert: &AlertMessage) {
    let title = alert.title.as_deref().unwrap_or_default();
    let text = alert.text.as_deref().unwrap_or_default();
    match alert.severity {
        AlertSeverity::Error => log::error!("[Alert] {} {}", title, text),
        AlertSeverity::Warning => log::warn!("[Alert] {} {}", title, text),
        AlertSeverity::Info | AlertSeverity::Success => log::info!("[Alert] {} {}", title, text),
    }
    let severity = alert.severity.as_str();
    if text.is_empty() {
        eprintln!("[{}] {}", severity, title);
    } else {
        eprintln!("[{}] {}: {}", severity, title, text);
    }
}
