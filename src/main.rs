use std::fs::{self, File};
use std::path::PathBuf;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use edubot::core::config::{self, default_state_dir};
use edubot::core::store::FileStore;

#[derive(Parser)]
#[command(name = "edubot", version, about = "Terminal client for the EduBot study assistant")]
struct Args {
    /// Backend base URL (overrides EDUBOT_SERVER_URL and config.toml)
    #[arg(short, long)]
    server_url: Option<String>,

    /// Directory for config.toml, state.json and edubot.log (default ~/.edubot)
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Log level written to edubot.log
    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let state_dir = args
        .state_dir
        .or_else(default_state_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&state_dir)?;

    // The terminal belongs to the UI, so logs go to a file only
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(state_dir.join("edubot.log")) {
        let _ = WriteLogger::init(args.log_level, log_config, log_file);
    }

    log::info!("EduBot starting up (state dir {})", state_dir.display());

    let file_config = config::load_config_or_default(&state_dir);
    let resolved = config::resolve(&file_config, args.server_url.as_deref());
    let store = FileStore::open_or_empty(state_dir.join("state.json"));

    edubot::tui::run(resolved, store)
}
