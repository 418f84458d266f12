use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the Inkpress binary.
#[derive(Debug, Parser)]
#[command(name = "inkpress", version, about = "Inkpress blog read service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "INKPRESS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the public HTTP service.
    Serve(Box<ServeArgs>),
    /// Print the slug for one or more titles.
    Slugify(SlugifyArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentSourceOverrides {
    /// Override the CMS project identifier.
    #[arg(long = "sanity-project-id", value_name = "ID")]
    pub project_id: Option<String>,

    /// Override the CMS dataset name.
    #[arg(long = "sanity-dataset", value_name = "NAME")]
    pub dataset: Option<String>,

    /// Override the CMS API version (YYYY-MM-DD).
    #[arg(long = "sanity-api-version", value_name = "DATE")]
    pub api_version: Option<String>,

    /// Toggle the CMS edge cache.
    #[arg(
        long = "sanity-use-cdn",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub use_cdn: Option<bool>,

    /// Read drafts through the preview perspective (requires a token).
    #[arg(
        long = "sanity-preview",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub preview: Option<bool>,

    /// Override the content source request timeout.
    #[arg(long = "sanity-timeout-seconds", value_name = "SECONDS")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content_source: ContentSourceOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the number of posts per listing page.
    #[arg(long = "listing-page-size", value_name = "COUNT")]
    pub page_size: Option<u32>,

    /// Override the number of page links shown around the current page.
    #[arg(long = "listing-visible-pages", value_name = "COUNT")]
    pub visible_pages: Option<u32>,

    /// Override the number of related posts shown under a post.
    #[arg(long = "listing-related-max", value_name = "COUNT")]
    pub related_max: Option<u32>,

    /// Override the public site URL used for canonical links.
    #[arg(long = "site-public-url", value_name = "URL")]
    pub public_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SlugifyArgs {
    /// Titles to normalize.
    #[arg(value_name = "TITLE", required = true)]
    pub titles: Vec<String>,

    /// Slugs that already exist; collisions get a numeric suffix.
    #[arg(long = "taken", value_name = "SLUG")]
    pub taken: Vec<String>,
}
