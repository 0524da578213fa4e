use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use eyre::{Result, WrapErr};
use log::{debug, info};

mod cli;

use cli::Cli;
use ytscribe::artifact::ArtifactStore;
use ytscribe::config::Config;
use ytscribe::transcribe::{DEFAULT_LANGUAGES, PersistPolicy, TranscriptionService};
use ytscribe::youtube::YouTubeCaptions;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ARTIFACT: &str = "transcription.json";

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytscribe.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytscribe")
        .join("logs")
}

fn build_after_help() -> String {
    format!(
        "\nConfig file: {}\nLogs are written to: {}",
        ytscribe::config::config_path().display(),
        log_dir().join("ytscribe.log").display()
    )
}

/// Effective settings after layering CLI flags over the config file over defaults
#[derive(Debug, PartialEq)]
struct Settings {
    addr: SocketAddr,
    languages: Vec<String>,
    artifact: PathBuf,
    persist_policy: PersistPolicy,
}

impl Settings {
    fn resolve(cli: &Cli, config: Config) -> Result<Self> {
        let host = cli
            .host
            .clone()
            .or(config.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(config.port).unwrap_or(DEFAULT_PORT);
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .wrap_err_with(|| format!("invalid listen address {host}:{port}"))?;

        let languages = if !cli.langs.is_empty() {
            cli.langs.clone()
        } else {
            config
                .languages
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect())
        };

        let artifact = cli
            .artifact
            .clone()
            .or(config.artifact_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT));

        let persist_policy = if cli.strict_persist || config.strict_persist.unwrap_or(false) {
            PersistPolicy::Strict
        } else {
            PersistPolicy::BestEffort
        };

        Ok(Self {
            addr,
            languages,
            artifact,
            persist_policy,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();
    let settings = Settings::resolve(&cli, config)?;
    debug!("Resolved settings: {settings:?}");

    if cli.verbose {
        let config_path = ytscribe::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        eprintln!(
            "Listening: http://{}\nLanguages: {}\nArtifact: {}\nPersist: {:?}",
            settings.addr,
            settings.languages.join(", "),
            settings.artifact.display(),
            settings.persist_policy,
        );
    }

    let provider = Arc::new(YouTubeCaptions::new(reqwest::Client::new()));
    let service = TranscriptionService::new(
        provider,
        ArtifactStore::new(settings.artifact),
        settings.languages,
        settings.persist_policy,
    );

    let app = ytscribe::server::router(Arc::new(service));
    ytscribe::server::serve(settings.addr, app).await
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let cli = Cli::parse_from(["ytscribe"]);
        let settings = Settings::resolve(&cli, Config::default()).unwrap();
        assert_eq!(settings.addr, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(settings.languages, vec!["fr", "en"]);
        assert_eq!(settings.artifact, PathBuf::from("transcription.json"));
        assert_eq!(settings.persist_policy, PersistPolicy::BestEffort);
    }

    #[test]
    fn test_resolve_config_then_cli() {
        let config = Config {
            host: Some("0.0.0.0".to_string()),
            port: Some(8080),
            languages: Some(vec!["de".to_string()]),
            artifact_path: Some(PathBuf::from("from-config.json")),
            strict_persist: Some(true),
        };
        let cli = Cli::parse_from(["ytscribe", "--port", "9000", "--lang", "en"]);
        let settings = Settings::resolve(&cli, config).unwrap();
        assert_eq!(settings.addr, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(settings.languages, vec!["en"]);
        assert_eq!(settings.artifact, PathBuf::from("from-config.json"));
        assert_eq!(settings.persist_policy, PersistPolicy::Strict);
    }

    #[test]
    fn test_resolve_empty_config_languages_uses_default() {
        let config = Config {
            languages: Some(vec![]),
            ..Config::default()
        };
        let cli = Cli::parse_from(["ytscribe"]);
        let settings = Settings::resolve(&cli, config).unwrap();
        assert_eq!(settings.languages, vec!["fr", "en"]);
    }

    #[test]
    fn test_resolve_bad_host() {
        let cli = Cli::parse_from(["ytscribe", "--host", "not a host"]);
        assert!(Settings::resolve(&cli, Config::default()).is_err());
    }
}
