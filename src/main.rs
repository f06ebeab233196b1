//! Viewfeed CLI
//!
//! Command-line client for a views feed:
//! - Show the feed
//! - Post a view (with optional media)
//! - Comment on a view
//! - Watch the feed live and interact with it

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt};

use viewfeed::feed::EMPTY_COMMENT_ALERT;
use viewfeed::{
    ApiClient, ApiError, CommentOutcome, Config, FeedBackend, FeedClient, FeedLoad, LikeOutcome,
    LoggingConfig, Notifier, PostOutcome, PushEvent, PushSink, RealtimeListener, ReconnectPolicy,
};

#[derive(Parser)]
#[command(name = "viewfeed")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for a live feed of views")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/viewfeed/config.toml or ./viewfeed.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a page of the feed
    Feed {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Print HTML markup instead of text
        #[arg(long)]
        html: bool,
    },

    /// Post a new view
    Post {
        /// View text
        text: String,
        /// Image or video to attach
        #[arg(short, long)]
        media: Option<PathBuf>,
    },

    /// Comment on a view
    Comment {
        /// View identifier
        view_id: String,
        /// Comment text
        text: String,
    },

    /// Load the feed, follow live updates and read commands from stdin
    Watch,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Alerts go straight to the terminal
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        println!("! {}", message);
    }
}

/// Applies push events and echoes them to the terminal
struct EchoSink {
    client: FeedClient,
}

#[async_trait::async_trait]
impl PushSink for EchoSink {
    async fn dispatch(&self, event: PushEvent) {
        match &event {
            PushEvent::NewView(view) => println!("+ [{}] {}", view.id, view.text),
            PushEvent::NewComment(added) => {
                println!("+ [{}] comment: {}", added.view_id, added.comment.text)
            }
        }
        self.client.apply_push(event).await;
    }
}

/// A line typed during `watch`
#[derive(Debug, PartialEq, Eq)]
enum WatchCommand {
    Post(String),
    Attach(PathBuf),
    Like(String),
    Comment { view_id: String, text: String },
    Reload,
    Show,
    Html,
    Help,
    Quit,
}

const WATCH_HELP: &str = "commands: post <text> | attach <path> | like <id> | comment <id> <text> | reload | show | html | quit";

impl WatchCommand {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match word {
            "post" => Ok(Self::Post(rest.to_string())),
            "attach" if !rest.is_empty() => Ok(Self::Attach(PathBuf::from(rest))),
            "like" if !rest.is_empty() => Ok(Self::Like(rest.to_string())),
            "comment" if !rest.is_empty() => {
                let (view_id, text) = rest.split_once(' ').unwrap_or((rest, ""));
                Ok(Self::Comment {
                    view_id: view_id.to_string(),
                    text: text.trim().to_string(),
                })
            }
            "reload" => Ok(Self::Reload),
            "show" | "" => Ok(Self::Show),
            "html" => Ok(Self::Html),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(format!("unknown command: {}\n{}", line, WATCH_HELP)),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config decides the real subscriber, so its own messages go through a
    // provisional one
    let mut config = tracing::subscriber::with_default(
        bootstrap_subscriber(std::io::stderr),
        || match &cli.config {
            Some(path) => Config::load_with_env(path),
            None => Ok(Config::load_default()),
        },
    )?;
    if let Some(url) = cli.base_url {
        config.backend.base_url = url;
    }

    init_logging(&config.logging);

    let api = Arc::new(ApiClient::new(&config.backend)?);
    let client = FeedClient::new(
        api.clone(),
        Arc::new(ConsoleNotifier),
        api.base_url(),
        config.backend.page_size,
    );

    match cli.command {
        Commands::Feed { page, html } => {
            if client.load_feed_page(page).await == FeedLoad::Failed {
                eprintln!("Cannot load views from {}", config.backend.base_url);
                std::process::exit(1);
            }
            if html {
                println!("{}", client.render_html().await?);
            } else {
                print!("{}", client.render_text().await);
            }
        }

        Commands::Post { text, media } => {
            client.compose(&text, media).await;
            if client.post_view().await != PostOutcome::Posted {
                std::process::exit(1);
            }
        }

        Commands::Comment { view_id, text } => {
            if text.is_empty() {
                eprintln!("{}", EMPTY_COMMENT_ALERT);
                std::process::exit(1);
            }
            match api.add_comment(&view_id, &text).await {
                Ok(()) => println!("Commented on {}", view_id),
                Err(ApiError::Rejected { detail, .. }) => {
                    eprintln!("{}", detail);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Watch => watch(client, &config).await?,

        Commands::Config { output } => {
            let content = viewfeed::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(())
}

/// Subscriber used while the config is being read
fn bootstrap_subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "viewfeed=warn".into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .finish()
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("viewfeed={}", config.level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Interactive session: the process lifetime is the liked-set's lifetime
async fn watch(client: FeedClient, config: &Config) -> anyhow::Result<()> {
    client.load_feed().await;
    print!("{}", client.render_text().await);

    let listener = if config.realtime.enabled {
        let listener = RealtimeListener::new(
            config.ws_url(),
            ReconnectPolicy::from_config(&config.realtime),
        )?;
        tracing::info!("Listening for updates on {}", listener.url());
        Some(listener.spawn(Arc::new(EchoSink {
            client: client.clone(),
        })))
    } else {
        None
    };

    println!("{}", WATCH_HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match WatchCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            WatchCommand::Quit => break,
            WatchCommand::Help => println!("{}", WATCH_HELP),
            WatchCommand::Show => print!("{}", client.render_text().await),
            WatchCommand::Html => match client.render_html().await {
                Ok(html) => println!("{}", html),
                Err(e) => tracing::error!("Failed to render feed: {}", e),
            },
            WatchCommand::Attach(path) => {
                client
                    .with_state(|s| s.document.compose.media = Some(path))
                    .await;
            }
            // Network actions run in the background so the prompt stays usable
            other => {
                tokio::spawn(run_action(client.clone(), other));
            }
        }
    }

    if let Some(handle) = listener {
        handle.abort();
    }
    Ok(())
}

async fn run_action(client: FeedClient, command: WatchCommand) {
    match command {
        WatchCommand::Post(text) => {
            client
                .with_state(|s| s.document.compose.text = text)
                .await;
            client.post_view().await;
        }
        WatchCommand::Like(view_id) => match client.toggle_like(&view_id).await {
            LikeOutcome::Liked => println!("liked {}", view_id),
            LikeOutcome::Unliked => println!("unliked {}", view_id),
            LikeOutcome::Unchanged => {}
        },
        WatchCommand::Comment { view_id, text } => {
            if !client.type_comment(&view_id, &text).await {
                println!("no view {} on this page", view_id);
                return;
            }
            if client.add_comment(&view_id).await == CommentOutcome::Added {
                println!("commented on {}", view_id);
            }
        }
        WatchCommand::Reload => {
            if let FeedLoad::Loaded(_) = client.load_feed().await {
                print!("{}", client.render_text().await);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch_commands() {
        assert_eq!(
            WatchCommand::parse("post hello there"),
            Ok(WatchCommand::Post("hello there".to_string()))
        );
        assert_eq!(
            WatchCommand::parse("post"),
            Ok(WatchCommand::Post(String::new()))
        );
        assert_eq!(
            WatchCommand::parse("like 65f0"),
            Ok(WatchCommand::Like("65f0".to_string()))
        );
        assert_eq!(
            WatchCommand::parse("comment 65f0 so true"),
            Ok(WatchCommand::Comment {
                view_id: "65f0".to_string(),
                text: "so true".to_string()
            })
        );
        assert_eq!(
            WatchCommand::parse("comment 65f0"),
            Ok(WatchCommand::Comment {
                view_id: "65f0".to_string(),
                text: String::new()
            })
        );
        assert_eq!(
            WatchCommand::parse("attach ./cat.png"),
            Ok(WatchCommand::Attach(PathBuf::from("./cat.png")))
        );
        assert_eq!(WatchCommand::parse("  "), Ok(WatchCommand::Show));
        assert_eq!(WatchCommand::parse("exit"), Ok(WatchCommand::Quit));
    }

    #[test]
    fn test_parse_watch_errors() {
        assert!(WatchCommand::parse("like").is_err());
        assert!(WatchCommand::parse("dance now").is_err());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_broken_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("viewfeed.toml");
        std::fs::write(&broken, "[backend\n").unwrap();

        let captured = Captured::default();
        let writer = captured.clone();
        let config = tracing::subscriber::with_default(
            bootstrap_subscriber(move || writer.clone()),
            || Config::load_first(&[broken]),
        );

        assert_eq!(config.backend.page_size, 10);
        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Failed to load config"), "{}", output);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["viewfeed", "feed", "--page", "2", "--html"]).unwrap();
        assert!(matches!(cli.command, Commands::Feed { page: 2, html: true }));

        let cli = Cli::try_parse_from([
            "viewfeed",
            "--base-url",
            "http://feed.local",
            "post",
            "hi",
            "--media",
            "a.png",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://feed.local"));
        assert!(matches!(cli.command, Commands::Post { media: Some(_), .. }));
    }
}
