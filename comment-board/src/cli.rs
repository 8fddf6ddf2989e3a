use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "comment-board")]
#[command(about = "Questions and answers comment board over HTTP")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
