pub mod cli;
pub mod config;
pub mod models;
pub mod responder;
pub mod store;
pub mod transport;
pub mod widget;

use cli::Args;
use cli::terminal::TerminalView;
use config::WidgetConfig;
use config::embed::EmbedConfig;
use log::info;
use models::Message;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader };
use widget::ChatWidget;

pub use config::ConfigPatch;
pub use widget::{ WidgetHandle, WidgetView };

const HELP: &str =
    "Commands: /open /close /minimize /toggle /chip N /clear /info /history /config name=value /quit";

/// The `n`th (1-based) chip of the most recent message that offers any.
fn nth_suggestion(messages: &[Message], n: usize) -> Option<String> {
    let chips = messages.iter().rev().find_map(|m| m.quick_replies())?;
    n.checked_sub(1).and_then(|i| chips.get(i)).cloned()
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = WidgetConfig::from_patch(&args.resolve_patch());

    info!("--- Widget Configuration ---");
    info!("API URL: {}", config.api_url);
    info!("Demo Mode: {}", config.demo);
    info!("Position: {}", config.position);
    info!("Auto Open: {}", config.auto_open);
    info!("Branding: {} / {}", config.branding.title, config.branding.subtitle);
    info!("Request Timeout: {:?}", config.request_timeout);
    info!("----------------------------");

    let mut widget = ChatWidget::new(config, Arc::new(TerminalView::new())).with_client_context(
        args.client_context()
    );
    let handle = widget.handle();
    widget.init().await;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            "/quit" | "/exit" => break,
            "/open" => handle.open()?,
            "/close" => handle.close()?,
            "/minimize" => handle.minimize()?,
            "/toggle" => handle.toggle()?,
            "/help" => println!("{}", HELP),
            "/clear" => {
                if let Some(controller) = widget.controller() {
                    controller.clear_messages();
                }
            }
            "/info" => {
                if let Some(controller) = widget.controller() {
                    println!("{}", serde_json::to_string_pretty(&controller.session_info())?);
                }
            }
            "/history" => {
                if let Some(controller) = widget.controller() {
                    match controller.fetch_history().await {
                        Ok(history) => println!("{}", serde_json::to_string_pretty(&history)?),
                        Err(e) => println!("Could not load history: {}", e),
                    }
                }
            }
            _ if line.starts_with("/chip ") => {
                let Some(controller) = widget.controller() else {
                    continue;
                };
                match line["/chip ".len()..].trim().parse::<usize>() {
                    Ok(n) => match nth_suggestion(&controller.messages(), n) {
                        Some(chip) => {
                            let controller = controller.clone();
                            tokio::spawn(async move {
                                controller.choose_suggestion(&chip).await;
                            });
                        }
                        None => println!("No suggestion #{} on the last bot message", n),
                    },
                    Err(_) => println!("Usage: /chip N"),
                }
            }
            _ if line.starts_with("/config ") => {
                let pairs: Vec<&str> = line["/config ".len()..].split_whitespace().collect();
                widget.update_config(&EmbedConfig::from_pairs(&pairs).patch);
            }
            _ if line.starts_with('/') => println!("Unknown command. {}", HELP),
            _ => handle.send_message(line)?,
        }
    }

    widget.destroy().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionMode;
    use crate::store::ConversationStore;

    #[test]
    fn chips_are_numbered_from_one() {
        let mut store = ConversationStore::new();
        store.start_session("demo_1_abc", SessionMode::Demo);
        let messages = store.messages();
        assert_eq!(nth_suggestion(messages, 1).as_deref(), Some("Opening Hours"));
        assert_eq!(nth_suggestion(messages, 4).as_deref(), Some("Complaint"));
        assert_eq!(nth_suggestion(messages, 0), None);
        assert_eq!(nth_suggestion(messages, 5), None);
    }
}
