use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clipper_core::CrawlMode;

use crate::platform::config::{ClipperConfig, DEFAULT_CONFIG_FILENAME};

/// Converts web pages to markdown through a conversion backend.
#[derive(Parser, Debug)]
#[command(name = "clipper")]
#[command(version)]
pub struct Cli {
    /// RON config file.
    #[arg(long, value_name = "FILE", global = true, default_value = DEFAULT_CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Backend base URL; overrides the config file.
    #[arg(long, value_name = "URL", global = true, env = "CLIPPER_BASE_URL")]
    pub base_url: Option<String>,

    /// Directory saved markdown goes to; overrides the config file.
    #[arg(long, value_name = "DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Polling interval used when the push channel is unavailable.
    #[arg(long, value_name = "MS", global = true)]
    pub poll_interval_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a URL and wait for its markdown.
    Convert(ConvertArgs),
    /// Ask the backend whether it is up.
    Health,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// A URL, or any text containing one.
    #[arg(value_name = "URL-OR-TEXT")]
    pub input: String,

    #[arg(long, value_enum, default_value = "single")]
    pub mode: ModeArg,

    /// Deprecated spelling of `--mode sitemap`.
    #[arg(long, hide = true, conflicts_with = "mode")]
    pub sitemap: bool,

    /// Page limit for smart crawls.
    #[arg(long, value_name = "N")]
    pub max_pages: Option<u32>,

    /// Log in interactively before submitting and send the captured cookies.
    #[arg(long, conflicts_with = "cookie_header")]
    pub login: bool,

    /// Cookies to send, as a `Cookie` header value (`a=1; b=2`).
    #[arg(long, value_name = "HEADER")]
    pub cookie_header: Option<String>,

    /// Save the markdown into the output directory.
    #[arg(long)]
    pub save: bool,

    /// Upload the markdown to cloud storage (needs CLIPPER_ACCESS_TOKEN).
    #[arg(long)]
    pub upload: bool,

    /// File name for the upload; the backend picks one when omitted.
    #[arg(long, value_name = "NAME", requires = "upload")]
    pub upload_name: Option<String>,

    /// Write the markdown to stdout.
    #[arg(long)]
    pub print: bool,

    #[arg(long, env = "CLIPPER_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Single,
    Sitemap,
    Smart,
}

impl From<ModeArg> for CrawlMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => CrawlMode::Single,
            ModeArg::Sitemap => CrawlMode::Sitemap,
            ModeArg::Smart => CrawlMode::Smart,
        }
    }
}

impl ConvertArgs {
    pub fn crawl_mode(&self) -> CrawlMode {
        if self.sitemap {
            CrawlMode::from_legacy(true)
        } else {
            self.mode.into()
        }
    }
}

impl Cli {
    /// Applies command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut ClipperConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(interval) = self.poll_interval_ms {
            config.poll_interval_ms = interval;
        }
    }
}
