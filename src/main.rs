use std::io::Write;

use dotenv::dotenv;
use grammarbot::{ConversationTurn, GeminiClient, GeminiConfig, Sender, Session, View};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const WELCOME: &str = "Hi! Chat with me and I'll point out any grammar slips along the way. Type /quit to leave.";

struct TerminalView;

impl View for TerminalView {
    fn show_turn(&mut self, turn: &ConversationTurn) {
        match turn.sender {
            // The user's own line is already on screen.
            Sender::User => {}
            Sender::Bot => {
                println!("bot> {}", turn.text);
                if let Some(correction) = &turn.correction {
                    println!("     Grammar Fix: {correction}");
                }
                println!();
            }
        }
    }

    fn set_busy(&mut self, busy: bool) {
        if let Err(e) = draw_typing_indicator(busy) {
            tracing::debug!(error = %e, "Failed to draw typing indicator");
        }
    }
}

fn draw_typing_indicator(busy: bool) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    if busy {
        write!(stderr, "bot is typing...")?;
    } else {
        write!(stderr, "\r\x1b[2K")?;
    }
    stderr.flush()
}

fn prompt() -> std::io::Result<()> {
    print!("you> ");
    std::io::stdout().flush()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = GeminiClient::new(GeminiConfig::from_env()?)?;
    tracing::info!(model = %client.config.model, "Starting chat");

    let mut session = Session::new(client, TerminalView);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{WELCOME}\n");
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        if line.trim() == "/quit" {
            break;
        }

        session.set_input(line);
        session.submit().await;
        prompt()?;
    }

    println!();
    Ok(())
}
