use std::path::PathBuf;

use clap::Parser;
use doccreft_core::ToolMode;

use super::logging::LogDestination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// Images to PDF, PDF merge and page editing.
    Convert,
    /// Batch JPEG compression.
    Compress,
}

impl From<ModeArg> for ToolMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Convert => ToolMode::Convert,
            ModeArg::Compress => ToolMode::Compress,
        }
    }
}

/// Terminal client for the DocCreft conversion and compression service.
#[derive(Debug, Parser)]
#[command(name = "doccreft", version)]
pub struct Cli {
    /// RON configuration file.
    #[arg(long, default_value = "doccreft.ron")]
    pub config: PathBuf,
    /// Backend API base, e.g. http://localhost:5001/api
    #[arg(long)]
    pub api_base: Option<String>,
    /// Directory that saved downloads are written to.
    #[arg(long)]
    pub download_dir: Option<PathBuf>,
    /// Where log output goes.
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,
    /// Tool to start in.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    /// Files to upload at startup.
    pub files: Vec<PathBuf>,
}
