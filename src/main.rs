//! Aegis CLI
//!
//! Command-line interface for the Aegis client:
//! - Talk to the AI companion and get wellness suggestions
//! - Run an in-memory community room
//! - Evaluate the route guard
//! - Print the default config

use aegis::chat::{ChatSession, MessageList};
use aegis::chatbot::{
    load_or_create_user_id, ChatbotClient, ChatbotWidget, ReplyOutcome, Speaker, TranscriptEntry,
    WellnessSuggestion, CRISIS_CLOSING, CRISIS_HEADER, CRISIS_HOTLINES, CRISIS_INTRO,
};
use aegis::config::{generate_default_config, Config};
use aegis::logging::init_logging;
use aegis::routes::{GuardDecision, RouteGuard};
use aegis::store::{MemoryStore, Principal, SignInProvider};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "aegis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Aegis wellness platform client")]
#[command(long_about = "Aegis client tools.\nChat with the AI companion, try a community room and check page access rules.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Companion chat API URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a message to the AI companion
    Chat {
        /// Message text
        message: Vec<String>,
    },

    /// Show recent companion chat history
    History,

    /// Show session insights
    Insights,

    /// Show personalized wellness suggestions
    Wellness,

    /// Clear the companion chat history
    Clear,

    /// Post messages to an in-memory community room and show the room
    Room {
        /// Room id (default: config `chat.default_room`)
        #[arg(short, long)]
        room: Option<String>,
        /// Messages to post
        messages: Vec<String>,
    },

    /// Evaluate page access for a principal
    Guard {
        /// Requested path
        path: String,
        /// No one is signed in
        #[arg(long)]
        signed_out: bool,
        /// Anonymous sign-in
        #[arg(long)]
        anonymous: bool,
        /// Sign-in provider (password, google.com)
        #[arg(long, default_value = "password")]
        provider: String,
        /// Email is verified
        #[arg(long)]
        verified: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.chatbot.api_base_url = url.clone();
    }

    init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Chat { message } => {
            let mut widget = companion(&config)?;
            let text = message.join(" ");
            let before = widget.transcript().len();

            match widget.send(&text).await {
                ReplyOutcome::Ignored => {
                    eprintln!("Nothing to send.");
                    std::process::exit(1);
                }
                outcome => {
                    for entry in &widget.transcript().entries()[before..] {
                        print_entry(entry);
                    }
                    if outcome == ReplyOutcome::ConnectionTrouble {
                        eprintln!();
                        eprintln!(
                            "Cannot reach the companion API at {}",
                            config.chatbot.api_base_url
                        );
                        std::process::exit(1);
                    }
                }
            }
        }

        Commands::History => {
            let mut widget = companion(&config)?;
            let before = widget.transcript().len();

            if widget.load_history().await == 0 {
                println!("No conversation history yet.");
            } else {
                for entry in &widget.transcript().entries()[before..] {
                    print_entry(entry);
                }
            }
        }

        Commands::Insights => {
            let widget = companion(&config)?;
            match widget.insights().await {
                Some(insights) => println!("{}", serde_json::to_string_pretty(&insights)?),
                None => {
                    eprintln!("No insights available.");
                    std::process::exit(1);
                }
            }
        }

        Commands::Wellness => {
            let mut widget = companion(&config)?;
            let before = widget.transcript().len();

            if widget.show_wellness_suggestions().await == 0 {
                eprintln!("No wellness suggestions available.");
                std::process::exit(1);
            }
            for entry in &widget.transcript().entries()[before..] {
                print_entry(entry);
            }
        }

        Commands::Clear => {
            let mut widget = companion(&config)?;
            if widget.clear_history().await {
                println!("Conversation cleared.");
                for entry in widget.transcript().entries() {
                    print_entry(entry);
                }
            } else {
                eprintln!("Failed to clear conversation.");
                std::process::exit(1);
            }
        }

        Commands::Room { room, messages } => {
            let room = room.unwrap_or_else(|| config.chat.default_room.clone());
            run_room(&room, &messages).await?;
        }

        Commands::Guard {
            path,
            signed_out,
            anonymous,
            provider,
            verified,
        } => {
            let principal = if signed_out {
                None
            } else if anonymous {
                Some(Principal::anonymous("cli-anonymous"))
            } else {
                Some(
                    Principal::with_password("cli-user", "user@example.com", verified)
                        .providers(vec![SignInProvider::from(provider)]),
                )
            };

            let guard = RouteGuard::new(config.routes.route_paths());
            match guard.evaluate(&path, principal.as_ref()) {
                GuardDecision::Allow => println!("allow"),
                GuardDecision::Redirect(target) => println!("redirect {}", target),
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn companion(config: &Config) -> anyhow::Result<ChatbotWidget> {
    let path = config.chatbot.user_id_path();
    let user_id = load_or_create_user_id(&path)
        .with_context(|| format!("Failed to load user id from {:?}", path))?;
    let client = ChatbotClient::new(config.chatbot.client_config())?;

    Ok(ChatbotWidget::new(client, user_id).history_limit(config.chatbot.history_limit))
}

fn print_entry(entry: &TranscriptEntry) {
    match entry {
        TranscriptEntry::Message {
            speaker,
            text,
            time_label,
        } => {
            let who = match speaker {
                Speaker::User => "You",
                Speaker::Assistant => "Companion",
            };
            println!("[{}] {}: {}", time_label, who, text);
        }
        TranscriptEntry::TypingIndicator => {}
        TranscriptEntry::WellnessSuggestions(suggestions) => {
            println!("  Wellness Suggestions:");
            for (title, description) in suggestions.iter().filter_map(WellnessSuggestion::parts) {
                match description {
                    Some(description) => println!("    - {}: {}", title, description),
                    None => println!("    - {}", title),
                }
            }
        }
        TranscriptEntry::CommunitySupport(groups) => {
            println!("  Community Support:");
            for group in groups {
                println!("    - {}", group);
            }
        }
        TranscriptEntry::CrisisResources => {
            println!();
            println!("{}", CRISIS_HEADER);
            println!("{}", CRISIS_INTRO);
            for (service, contact) in CRISIS_HOTLINES {
                println!("  {}: {}", service, contact);
            }
            println!("{}", CRISIS_CLOSING);
            println!();
        }
    }
}

/// Two members in one in-memory room: a verified guide greets, then the
/// anonymous CLI user posts `messages`
async fn run_room(room: &str, messages: &[String]) -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::default());

    let mut guide = ChatSession::new(room, store.clone(), store.clone());
    guide
        .open(&Principal::with_password("guide", "guide@aegis.example", true).display_name("Guide"))
        .await?;
    guide
        .send("Welcome! This is a safe space, share whatever you like.")
        .await;

    let mut session = ChatSession::new(room, store.clone(), store);
    session.open(&Principal::anonymous("cli-anonymous")).await?;

    if let Some(identity) = session.identity() {
        println!(
            "Joined #{} as {} ({})",
            room, identity.display_name, identity.initials
        );
    }

    let mut list = MessageList::new();
    for message in messages {
        if let aegis::SendOutcome::Failed { notice } = session.send(message).await {
            list.show_notice(notice);
        }
    }
    session.drain_into(&mut list);

    println!();
    for view in list.items() {
        println!(
            "[{}] {} ({}): {}",
            view.time_label, view.author_label, view.initials, view.text_html
        );
    }
    if let Some(notice) = list.notice() {
        eprintln!("{}", notice);
    }

    session.close();
    guide.close();
    Ok(())
}
