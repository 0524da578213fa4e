use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytscribe",
    about = "Serve YouTube transcripts over HTTP",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Address to bind (default 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (default 5000)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Preferred caption language, repeat for fallbacks (default: fr, en)
    #[arg(short, long = "lang")]
    pub langs: Vec<String>,

    /// File that receives the last successful transcription
    #[arg(short, long)]
    pub artifact: Option<PathBuf>,

    /// Fail the request when the artifact file cannot be written
    #[arg(long)]
    pub strict_persist: bool,

    /// Print resolved settings on startup
    #[arg(short, long)]
    pub verbose: bool,
}
