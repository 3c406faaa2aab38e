//! Interactive OneDrive browser
//!
//! Signs in through the console and runs one drive operation.
//!
//! Run with:
//! ```bash
//! # List the drive root
//! cargo run -p provider-onedrive --example browse -- list
//!
//! # List a folder
//! cargo run -p provider-onedrive --example browse -- list "root:/Documents:"
//!
//! # Create a folder under the root
//! cargo run -p provider-onedrive --example browse -- mkdir Backups
//!
//! # Upload a local file into a folder
//! cargo run -p provider-onedrive --example browse -- upload ./notes.txt Backups
//!
//! # Download a file to stdout
//! cargo run -p provider-onedrive --example browse -- cat Backups/notes.txt
//!
//! # Sign out
//! cargo run -p provider-onedrive --example browse -- logout
//! ```

use bridge_desktop::{ConsoleAuthorizationUi, ReqwestHttpClient};
use bridge_traits::logging::LogLevel;
use core_runtime::config::CoreConfig;
use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LoggingConfig};
use provider_onedrive::{ActionResult, ItemResult, SessionManager, ROOT_PATH};
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();

    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    let config = CoreConfig::builder()
        .http_client(Arc::new(ReqwestHttpClient::new()?))
        .build()?;
    let session = SessionManager::from_config(config);
    let ui = ConsoleAuthorizationUi::new();

    session.register_action_listener(Arc::new(|result: &ActionResult| {
        info!(kind = ?result.kind, success = result.success, message = ?result.message, "Action completed");
    }));
    session.register_item_listener(Arc::new(print_item));

    match args.first().map(String::as_str).unwrap_or("list") {
        "list" => {
            let path = args.get(1).map(String::as_str).unwrap_or(ROOT_PATH);
            session.list_items(&ui, path).await?;
        }
        "logout" => {
            session.logout(&ui).await?;
        }
        command => {
            if !session.create_client(&ui).await.success {
                return Ok(());
            }

            let tokens = session.client().await?.tokens().await;
            info!(
                access_token = %redact_if_sensitive("access_token", &tokens.access_token),
                expires_at = %tokens.expires_at,
                "Signed in"
            );

            match (command, args.get(1), args.get(2)) {
                ("mkdir", Some(name), _) => {
                    session.create_folder(name).await?;
                }
                ("upload", Some(file), folder) => {
                    let folder = folder.map(String::as_str).unwrap_or("");
                    session.write_file(Path::new(file), folder).await?;
                }
                ("cat", Some(path), _) => {
                    let mut stream = session.read_stream_by_path(path).await?;
                    tokio::io::copy(&mut stream, &mut tokio::io::stdout()).await?;
                }
                _ => eprintln!("usage: browse [list [path] | mkdir <name> | upload <file> [folder] | cat <path> | logout]"),
            }
        }
    }

    Ok(())
}

fn print_item(result: &ItemResult) {
    match result {
        ItemResult::Success(item) => {
            println!("{} ({:?})", item.name, item.kind());
            for child in item.children() {
                let size = child.size.map(|s| s.to_string()).unwrap_or_default();
                println!("  {:<40} {:>12} {:?}", child.name, size, child.kind());
            }
        }
        ItemResult::Failure(message) => eprintln!("error: {}", message),
    }
}
