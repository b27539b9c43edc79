use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use video_tldr::{Config, DurationTier, Language, Pipeline, SearchRequest};

fn cli() -> Command {
    Command::new("video-tldr")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("Search videos and summarize their transcripts")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (defaults to video-tldr.toml lookup)")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("serve").about("Run the HTTP API").arg(
                Arg::new("port")
                    .short('p')
                    .long("port")
                    .value_name("PORT")
                    .help("Port to listen on (overrides config and PORT)")
                    .value_parser(clap::value_parser!(u16)),
            ),
        )
        .subcommand(
            Command::new("search")
                .about("Search, scrape and summarize once, printing JSON")
                .arg(Arg::new("query").required(true).help("Search term"))
                .arg(
                    Arg::new("duration")
                        .short('d')
                        .long("duration")
                        .value_name("TIER")
                        .help("Video duration tier: short, medium or long")
                        .default_value("short"),
                )
                .arg(
                    Arg::new("language")
                        .short('l')
                        .long("language")
                        .value_name("CODE")
                        .help("Summary language code")
                        .default_value("en"),
                ),
        )
        .subcommand(
            Command::new("digest")
                .about("Summarize a single video URL, printing JSON")
                .arg(Arg::new("url").required(true).help("Video watch URL"))
                .arg(
                    Arg::new("language")
                        .short('l')
                        .long("language")
                        .value_name("CODE")
                        .help("Summary language code")
                        .default_value("en"),
                ),
        )
}

fn string_arg<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing argument: {}", name))
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    match matches.get_one::<String>("config") {
        Some(path) => {
            let _ = dotenvy::dotenv();
            let mut config = Config::load_from(path)?;
            config.apply_env();
            Ok(config)
        }
        None => Config::load(),
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("video_tldr=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.server.log_level))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let mut config = load_config(&matches)?;
    init_logging(&config, matches.get_flag("verbose"));

    if let Some(port) = matches
        .subcommand_matches("serve")
        .and_then(|serve| serve.get_one::<u16>("port"))
    {
        config.server.port = *port;
    }

    if let Err(e) = config.validate() {
        warn!("Configuration problem: {}", e);
        return Err(e);
    }
    info!("{}", config.summary());

    let pipeline = Arc::new(Pipeline::from_config(&config).context("building pipeline")?);

    match matches.subcommand() {
        Some(("serve", _)) => serve(pipeline, config.server.port).await,
        Some(("search", sub)) => {
            let tier: DurationTier = string_arg(sub, "duration")?.parse()?;
            let request = SearchRequest {
                query: string_arg(sub, "query")?.to_string(),
                tier,
                language: Language::new(string_arg(sub, "language")?),
            };
            let results = pipeline.run(&request).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Some(("digest", sub)) => {
            let language = Language::new(string_arg(sub, "language")?);
            let digest = pipeline.digest(string_arg(sub, "url")?, &language).await?;
            println!("{}", serde_json::to_string_pretty(&digest)?);
            Ok(())
        }
        _ => Err(anyhow!("unknown command")),
    }
}

#[cfg(feature = "api")]
async fn serve(pipeline: Arc<Pipeline>, port: u16) -> Result<()> {
    video_tldr::api::ApiServer::new(pipeline, port).start().await
}

#[cfg(not(feature = "api"))]
async fn serve(_pipeline: Arc<Pipeline>, _port: u16) -> Result<()> {
    Err(anyhow!("built without the `api` feature; rebuild with --features api"))
}
