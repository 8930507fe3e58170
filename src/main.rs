use capture::config::Config;
use clap::Parser;
use tracing::{debug, error, info, warn};

mod log;
mod utils;

#[derive(Parser)]
#[command(version)]
struct Args {
    /// Set config file path
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let (cfg, load_err) = match utils::load::<Config>("framecast".to_string(), args.config) {
        Ok(cfg) => (cfg, None),
        Err(e) => (Config::default(), Some(e)),
    };

    log::set(format!(
        "framecast={},capture={},tower_http={}",
        cfg.log.level, cfg.log.level, cfg.log.level
    ));

    if let Some(e) = load_err {
        error!("config load error, using defaults: {:#}", e);
    }
    warn!("set log level : {}", cfg.log.level);
    debug!("config : {:?}", cfg);

    if let Err(e) = run(cfg).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
    info!("Server shutdown");
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    cfg.validate()?;
    let listener = capture::bind(&cfg.http).await?;
    capture::serve(cfg, listener, utils::shutdown_signal()).await
}
