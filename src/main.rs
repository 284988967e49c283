use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

use crm_notification_feed::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SEC,
};
use crm_notification_feed::notifications::{FetchState, DEFAULT_PAGE_SIZE};
use crm_notification_feed::store::ToastAction;
use crm_notification_feed::{
    AppStore, FeedError, FeedFilter, HttpNotificationApi, NotificationApi, NotificationFeed,
    UnreadBadgePoller,
};

mod cli_style;
use cli_style::get_styles;

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Base URL of the CRM API, e.g. https://crm.example.com/api
    #[clap(long)]
    pub base_url: Option<String>,

    /// Bearer token sent with every request.
    #[clap(long)]
    pub auth_token: Option<String>,

    /// Timeout in seconds for API requests.
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SEC)]
    pub request_timeout_sec: u64,

    /// Number of notifications fetched per page.
    #[clap(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Interval in seconds between unread count polls.
    #[clap(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub poll_interval_secs: u64,

    /// Don't poll the unread count in the background.
    #[clap(long)]
    pub no_badge: bool,

    /// Initial filter: all, unread or type:<kind>.
    #[clap(long)]
    pub filter: Option<FeedFilter>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            base_url: self.base_url.clone(),
            auth_token: self.auth_token.clone(),
            request_timeout_sec: self.request_timeout_sec,
            page_size: self.page_size,
            poll_interval_secs: self.poll_interval_secs,
            disable_badge: self.no_badge,
            initial_filter: self.filter,
        }
    }
}

#[derive(Parser)]
#[command(styles=get_styles(),name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Shows the notifications loaded so far.
    List,

    /// Loads the next page, as scrolling to the end of the list would.
    More,

    /// Switches the filter: all, unread or type:<kind>.
    Filter { filter: FeedFilter },

    /// Opens a notification, marking it read, and shows its link.
    Open { id: String },

    /// Marks a single notification as read.
    Read { id: String },

    /// Marks every notification as read.
    ReadAll,

    /// Retries the page whose fetch failed.
    Retry,

    /// Reloads the first page from the server.
    Refresh,

    /// Shows the unread badge count.
    Badge {
        /// Poll the server right away instead of waiting for the next tick.
        #[clap(long)]
        refresh: bool,
    },

    /// Shows the dropdown preview of the newest notifications.
    Preview,

    /// Shows the toast messages.
    Toasts {
        /// Dismiss the toast with this id.
        #[clap(long)]
        dismiss: Option<u64>,

        /// Dismiss every toast.
        #[clap(long, conflicts_with = "dismiss")]
        clear: bool,
    },

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

struct Session<'a> {
    rt: &'a Runtime,
    feed: &'a NotificationFeed,
    store: &'a AppStore,
}

fn failed(err: FeedError) -> CommandExecutionResult {
    if err.is_transient() {
        CommandExecutionResult::Error(format!("{}, try again", err))
    } else {
        CommandExecutionResult::Error(err.to_string())
    }
}

fn execute_command(line: String, session: &Session<'_>) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    let cli = match cli {
        Ok(cli) => cli,
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
            return CommandExecutionResult::Ok;
        }
    };

    let Session { rt, feed, store } = *session;
    match cli.command {
        InnerCommand::List => cli_style::print_feed(&feed.view()),
        InnerCommand::More => match rt.block_on(feed.on_sentinel_visible()) {
            Ok(true) => cli_style::print_feed(&feed.view()),
            Ok(false) => match feed.fetch_state() {
                FetchState::Fetching => cli_style::print_warning("A page is already loading"),
                FetchState::Exhausted => cli_style::print_info("No more notifications"),
                FetchState::Idle => {
                    cli_style::print_warning("The first page is not loaded, use `retry`")
                }
            },
            Err(e) => return failed(e),
        },
        InnerCommand::Filter { filter } => match rt.block_on(feed.set_filter(filter)) {
            Ok(_) => {
                cli_style::print_success(&format!("Filter set to {}", filter));
                cli_style::print_feed(&feed.view());
            }
            Err(e) => return failed(e),
        },
        InnerCommand::Open { id } => {
            let notification = feed.view().items.into_iter().find(|n| n.id == id);
            match rt.block_on(feed.on_item_click(&id)) {
                Ok(link) => {
                    if let Some(n) = notification {
                        cli_style::print_notification_detail(&n);
                    }
                    match link {
                        Some(link) => cli_style::print_info(&format!("Navigate to {}", link)),
                        None => cli_style::print_info("This notification has no link"),
                    }
                }
                Err(e) => return failed(e),
            }
        }
        InnerCommand::Read { id } => match rt.block_on(feed.mark_read(&id)) {
            Ok(()) => cli_style::print_success(&format!("Marked {} as read", id)),
            Err(e) => return failed(e),
        },
        InnerCommand::ReadAll => match rt.block_on(feed.on_mark_all_read()) {
            Ok(flipped) => cli_style::print_success(&format!(
                "All notifications marked as read ({} updated locally)",
                flipped
            )),
            Err(e) => return failed(e),
        },
        InnerCommand::Retry => match rt.block_on(feed.retry()) {
            Ok(true) => cli_style::print_feed(&feed.view()),
            Ok(false) => cli_style::print_info("Nothing to retry"),
            Err(e) => return failed(e),
        },
        InnerCommand::Refresh => match rt.block_on(feed.refresh()) {
            Ok(_) => cli_style::print_feed(&feed.view()),
            Err(e) => return failed(e),
        },
        InnerCommand::Badge { refresh } => match feed.badge() {
            Some(badge) => {
                if refresh {
                    badge.refresh_now();
                }
                match badge.count() {
                    Some(count) => cli_style::print_key_value(
                        "Unread",
                        &cli_style::badge_label(count),
                    ),
                    None => cli_style::print_info("Unread count not fetched yet"),
                }
            }
            None => cli_style::print_warning("Badge polling is disabled"),
        },
        InnerCommand::Preview => cli_style::print_notifications(&feed.preview()),
        InnerCommand::Toasts { dismiss, clear } => {
            if let Some(id) = dismiss {
                store.dispatch_toast(ToastAction::Dismiss(id));
            } else if clear {
                store.dispatch_toast(ToastAction::Clear);
            }
            cli_style::print_toasts(&store.toasts().toasts);
        }
        InnerCommand::Exit => return CommandExecutionResult::Exit,
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct CommandHelper {
    commands_names: Vec<String>,
}

impl CommandHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        CommandHelper { commands_names }
    }
}

impl Completer for CommandHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .cloned()
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for CommandHelper {}
impl Validator for CommandHelper {}
impl Helper for CommandHelper {}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let rt = Runtime::new().context("Failed to start the tokio runtime")?;
    let _guard = rt.enter();

    let api: Arc<dyn NotificationApi> = Arc::new(HttpNotificationApi::new(
        &config.base_url,
        config.auth_token.clone(),
        config.request_timeout_sec,
    )?);
    let store = Arc::new(AppStore::new(config.feed.initial_filter));

    let mut feed = NotificationFeed::new(api.clone(), store.clone(), &config.feed);
    if config.badge.enabled {
        info!(
            "Polling unread count every {}s",
            config.badge.poll_interval_secs
        );
        let badge = UnreadBadgePoller::start(api, config.badge.poll_interval());
        feed = feed.with_badge(Arc::new(badge));
    }

    info!("Connecting to {}", config.base_url);
    if let Err(e) = rt.block_on(feed.load_first_page()) {
        cli_style::print_error(&e.to_string());
    }

    InnerCli::command().print_long_help()?;
    cli_style::print_feed(&feed.view());

    let editor_config = Config::builder()
        .completion_type(CompletionType::List)
        .build();
    let mut rl = Editor::<CommandHelper, FileHistory>::with_config(editor_config)?;
    rl.set_helper(Some(CommandHelper::new()));

    let session = Session {
        rt: &rt,
        feed: &feed,
        store: &store,
    };

    loop {
        let prompt = cli_style::get_prompt(feed.badge().and_then(|b| b.count()));
        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line.trim().to_string(), &session) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => cli_style::print_error(&err),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }

    if let Some(badge) = feed.badge() {
        rt.block_on(badge.shutdown());
    }
    Ok(())
}
