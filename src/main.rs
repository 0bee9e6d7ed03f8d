/// Binary entry point: load configuration and both tables, answer one
/// query from the command line, print the result as JSON.
///
/// All pipeline logic lives in the library; this file only wires
/// configuration, logging, loading, and argument handling together.

use std::error::Error;

use oceanquery_service::config::{self, ServiceConfig};
use oceanquery_service::ingest::{dataset, gazetteer};
use oceanquery_service::logging::{self, LogLevel, LogSource};
use oceanquery_service::model::{DatasetTable, Gazetteer};
use oceanquery_service::query::{QueryEngine, StructuredRequest};

const DEFAULT_CONFIG_PATH: &str = "oceanquery.toml";

const USAGE: &str = "\
usage:
  oceanquery_service [--config <path>] \"<free text question>\"
  oceanquery_service [--config <path>] --lat <deg> --lon <deg> --depth <m> --parameter <name>";

enum CliMode {
    Text(String),
    Structured(StructuredRequest),
}

struct CliArgs {
    config_path: String,
    mode: CliMode,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut config_path = DEFAULT_CONFIG_PATH.to_string();
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;
    let mut depth: f64 = 0.0;
    let mut parameter: Option<String> = None;
    let mut text_parts: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let flag_value = |i: &mut usize| -> Result<String, String> {
            *i += 1;
            args.get(*i)
                .cloned()
                .ok_or_else(|| format!("flag '{}' needs a value", args[*i - 1]))
        };
        match args[i].as_str() {
            "--config" => config_path = flag_value(&mut i)?,
            "--lat" => {
                latitude = Some(parse_number(&flag_value(&mut i)?, "--lat")?);
            }
            "--lon" | "--long" => {
                longitude = Some(parse_number(&flag_value(&mut i)?, "--lon")?);
            }
            "--depth" => {
                depth = parse_number(&flag_value(&mut i)?, "--depth")?;
            }
            "--parameter" | "--param" => parameter = Some(flag_value(&mut i)?),
            other if other.starts_with("--") => {
                return Err(format!("unknown flag '{}'", other));
            }
            other => text_parts.push(other.to_string()),
        }
        i += 1;
    }

    let mode = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => {
            let parameter =
                parameter.ok_or_else(|| "--parameter is required with --lat/--lon".to_string())?;
            CliMode::Structured(StructuredRequest {
                latitude,
                longitude,
                depth,
                parameter,
            })
        }
        (None, None) if !text_parts.is_empty() => CliMode::Text(text_parts.join(" ")),
        (None, None) => return Err("no question given".to_string()),
        _ => return Err("--lat and --lon must be given together".to_string()),
    };

    Ok(CliArgs { config_path, mode })
}

fn parse_number(raw: &str, flag: &str) -> Result<f64, String> {
    raw.parse()
        .map_err(|_| format!("'{}' is not a number for {}", raw, flag))
}

/// Builds the configuration: file if present, defaults otherwise,
/// environment overrides always.
fn build_config(path: &str) -> ServiceConfig {
    match config::load_config(path) {
        Ok(config) => config,
        Err(e) => {
            // A missing config file is normal; anything else is worth a
            // line on stderr before we fall back.
            if !matches!(e, config::ConfigError::Io(_)) {
                eprintln!("warning: {}; using defaults", e);
            }
            let mut config = ServiceConfig::default();
            config::apply_env_overrides(&mut config);
            config
        }
    }
}

/// Loads the measurement table, degrading to an empty one on failure;
/// the table is never partially loaded.
fn build_dataset(config: &ServiceConfig) -> DatasetTable {
    match dataset::load_dataset(&config.dataset_csv) {
        Ok(table) => {
            logging::log_load_summary(LogSource::Dataset, table.len(), "measurement records");
            table
        }
        Err(e) => {
            logging::warn(
                LogSource::Dataset,
                &format!("load failed ({}); continuing with an empty table", e),
            );
            DatasetTable::empty()
        }
    }
}

fn build_gazetteer(config: &ServiceConfig) -> Gazetteer {
    match gazetteer::load_gazetteer(&config.gazetteer_csv) {
        Ok(gazetteer) => {
            logging::log_load_summary(LogSource::Gazetteer, gazetteer.len(), "gazetteer entries");
            gazetteer
        }
        Err(e) => {
            logging::warn(
                LogSource::Gazetteer,
                &format!("load failed ({}); continuing with an empty gazetteer", e),
            );
            Gazetteer::empty()
        }
    }
}

fn run(cli: CliArgs) -> Result<(), Box<dyn Error>> {
    let config = build_config(&cli.config_path);
    logging::init_logger(
        LogLevel::parse(&config.log_level),
        config.log_file.as_deref(),
    );

    let engine = QueryEngine::new(
        build_dataset(&config),
        build_gazetteer(&config),
        config.resolve_config(),
    );

    match cli.mode {
        CliMode::Text(text) => {
            logging::info(LogSource::Query, &format!("text query: {}", text));
            let outcome = engine.resolve_text(&text)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        CliMode::Structured(request) => {
            logging::info(
                LogSource::Query,
                &format!(
                    "structured query: {} at ({}, {}) depth {}",
                    request.parameter, request.latitude, request.longitude, request.depth
                ),
            );
            let payload = engine.resolve_structured(&request)?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}

fn main() {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("error: {}\n{}", message, USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
