use clap::Parser;
use fable::ImageBackend;
use fable::core::config::{self, CliOverrides};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use std::io;

#[derive(Parser)]
#[command(name = "fable", about = "Choose-your-own-adventure story server")]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(short, long)]
    bind: Option<String>,

    /// Image generation backend
    #[arg(short, long, value_enum)]
    image_provider: Option<ImageBackend>,

    /// Seed sessions without a story with the built-in sailing story
    #[arg(long)]
    demo_story: bool,
}

fn init_logging() {
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Info,
        log_config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    // File logger - writes to fable.log in current directory
    if let Ok(log_file) = File::create("fable.log") {
        loggers.push(WriteLogger::new(LevelFilter::Debug, log_config, log_file));
    }

    let _ = CombinedLogger::init(loggers);
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();
    init_logging();

    let file_config = config::load_config().map_err(io::Error::other)?;
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            bind: args.bind,
            image_backend: args.image_provider,
            demo_story: args.demo_story,
        },
    );

    log::info!(
        "Fable starting up: bind={}, image provider={:?}, demo story={}",
        resolved.bind,
        resolved.image_backend,
        resolved.demo_story
    );

    fable::server::serve(&resolved).await
}
