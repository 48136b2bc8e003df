use clap::Parser;
use shopchat::core::config::{self, CliOverrides};
use shopchat::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "shopchat", about = "Terminal chat client for an e-commerce support assistant")]
struct Args {
    /// Backend base URL (overrides SHOPCHAT_API_URL and the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Show bot replies at once instead of typing them out
    #[arg(long)]
    no_animate: bool,

    /// Don't fetch product images to check which source resolves
    #[arg(long)]
    no_images: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let (file_config, config_error) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => (Default::default(), Some(e)),
    };
    let cli = CliOverrides {
        api_url: args.api_url,
        no_animate: args.no_animate,
        no_images: args.no_images,
    };
    let resolved = config::resolve(&file_config, &cli);

    // The terminal belongs to the UI, so logs go to a file
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    if let Some(e) = config_error {
        log::warn!("Using default configuration: {}", e);
    }
    log::info!("shopchat starting up against {}", resolved.api_url);

    tui::run(resolved)
}
