use clap::Parser;
use punt::core::config;
use punt::core::identity::UserRef;
use punt::tui;
use punt::tui::components::CommentInputProps;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "punt", about = "Terminal comment composer for prediction markets")]
struct Args {
    /// Market to comment on
    #[arg(short, long)]
    market: String,

    /// Reply to a user, as `id:username` (pre-fills a mention)
    #[arg(long)]
    reply_to: Option<String>,

    /// Reply to a free-response answer outcome
    #[arg(long)]
    answer: Option<String>,

    /// Reply to another comment
    #[arg(long)]
    parent: Option<String>,

    /// Pin a wager to the comment
    #[arg(long)]
    wager: Option<String>,

    /// Disable the Enter-to-submit gesture
    #[arg(long)]
    no_submit_on_enter: bool,
}

fn parse_reply_to(raw: &str) -> Option<UserRef> {
    let (id, username) = raw.split_once(':')?;
    if id.is_empty() || username.is_empty() {
        return None;
    }
    Some(UserRef::new(id, username))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to punt.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("punt.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return Ok(());
        }
    };
    let resolved = config::resolve(&file_config, args.no_submit_on_enter);

    let reply_to = match args.reply_to.as_deref() {
        Some(raw) => match parse_reply_to(raw) {
            some @ Some(_) => some,
            None => {
                eprintln!("--reply-to must be formatted as id:username");
                return Ok(());
            }
        },
        None => None,
    };

    let props = CommentInputProps {
        reply_to,
        parent_answer_outcome: args.answer,
        parent_comment_id: args.parent,
        preset_wager_id: args.wager,
        submit_on_enter: resolved.submit_on_enter,
    };

    log::info!("Punt starting up for market {}", args.market);
    tui::run(resolved, args.market, props)
}
