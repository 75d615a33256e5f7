//! NHL play-by-play scraper CLI
//!
//! Fetches a game (or every game on a date) and prints the reconciled
//! play-by-play as a table, JSON or CSV.

use clap::{Parser, Subcommand};
use pbp::{Config, Result};

#[derive(Parser)]
#[command(name = "pbp")]
#[command(about = "Scrape and reconcile NHL play-by-play data", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Cache directory for fetched documents
    #[arg(long, global = true)]
    cache: Option<String>,

    /// Use only cached documents (no network requests)
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a single game
    Game {
        /// Game id, e.g. 2023020350
        game_id: i64,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Scrape every game on a date
    Date {
        /// Date as YYYY-MM-DD
        date: chrono::NaiveDate,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Write a default config file
    Init,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let mut config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };
    if cli.cache.is_some() {
        config.data.cache_dir = cli.cache.clone();
    }
    if cli.offline {
        config.data.offline_only = true;
    }

    let result = match cli.command {
        Commands::Game {
            game_id,
            format,
            output,
        } => commands::game(&config, game_id, format, output),
        Commands::Date {
            date,
            format,
            output,
        } => commands::date(&config, date, format, output),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use pbp::data::NhlClient;
    use pbp::pipeline::{self, output, PbpRow};
    use pbp::GameId;
    use std::io::Write;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'pbp game 2023020350' to scrape a game");
        println!("  3. Run 'pbp date 2023-12-20 --format csv -o games.csv' for a whole day");

        Ok(())
    }

    fn client(config: &Config) -> Result<NhlClient> {
        let mut client = NhlClient::new(&config.api)?.offline_only(config.data.offline_only);
        if let Some(dir) = &config.data.cache_dir {
            client = client.with_cache(dir);
        }
        Ok(client)
    }

    pub fn game(
        config: &Config,
        game_id: i64,
        format: OutputFormat,
        output: Option<String>,
    ) -> Result<()> {
        let client = client(config)?;
        let scrape = pipeline::scrape_game(&client, GameId(game_id))?;
        emit(&scrape.rows, format, output)
    }

    pub fn date(
        config: &Config,
        date: chrono::NaiveDate,
        format: OutputFormat,
        output: Option<String>,
    ) -> Result<()> {
        let client = client(config)?;
        let rows = pipeline::scrape_date(&client, date)?;
        log::info!("{} rows scraped for {}", rows.len(), date);
        emit(&rows, format, output)
    }

    fn emit(rows: &[PbpRow], format: OutputFormat, path: Option<String>) -> Result<()> {
        let mut writer: Box<dyn Write> = match &path {
            Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
            None => Box::new(std::io::stdout().lock()),
        };

        match format {
            OutputFormat::Table => write!(writer, "{}", output::format_table(rows))?,
            OutputFormat::Json => {
                output::write_json(&mut writer, rows)?;
                writeln!(writer)?;
            }
            OutputFormat::Csv => output::write_csv(&mut writer, rows)?,
        }
        writer.flush()?;

        if let Some(path) = path {
            println!("Wrote {} rows to {}", rows.len(), path);
        }
        Ok(())
    }
}
