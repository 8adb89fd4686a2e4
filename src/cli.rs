use clap::Parser;
use std::path::PathBuf;

/// Scholar - a note-aware student chat assistant
#[derive(Parser, Debug, Clone)]
#[command(name = "scholar", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "SCHOLAR_CONFIG", default_value = "scholar.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "SCHOLAR_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "SCHOLAR_PORT")]
    pub port: Option<u16>,

    /// Model identifier for new chats
    #[arg(long, env = "SCHOLAR_MODEL")]
    pub model: Option<String>,
}
