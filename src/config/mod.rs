//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU32, NonZeroUsize},
    str::FromStr,
    time::Duration,
};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::pagination::{DEFAULT_PAGE_SIZE, DEFAULT_VISIBLE_PAGES};
use crate::application::related::DEFAULT_RELATED_MAX;

mod cli;

pub use cli::{
    CliArgs, Command, ContentSourceOverrides, ServeArgs, ServeOverrides, SlugifyArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "inkpress";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DATASET: &str = "production";
const DEFAULT_API_VERSION: &str = "2024-01-01";
const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FEATURED_COUNT: NonZeroUsize = NonZeroUsize::new(3).unwrap();
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
const DEFAULT_BLOG_TITLE: &str = "Blog";
const DEFAULT_BLOG_DESCRIPTION: &str = "Insights, tutorials, and stories from our team.";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content_source: ContentSourceSettings,
    pub listing: ListingSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Which document revisions the CMS returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    Published,
    PreviewDrafts,
}

impl Perspective {
    pub fn as_str(self) -> &'static str {
        match self {
            Perspective::Published => "published",
            Perspective::PreviewDrafts => "previewDrafts",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentSourceSettings {
    pub project_id: Option<String>,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
    pub perspective: Perspective,
    pub timeout: Duration,
    /// Replaces the derived API host; used for self-hosted proxies and tests.
    pub base_url: Option<Url>,
}

/// Sizes used by listing pages. Every value is injected into the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSettings {
    pub page_size: NonZeroU32,
    pub visible_pages: NonZeroU32,
    pub related_max: NonZeroUsize,
    pub featured_count: NonZeroUsize,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            visible_pages: DEFAULT_VISIBLE_PAGES,
            related_max: DEFAULT_RELATED_MAX,
            featured_count: DEFAULT_FEATURED_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub public_url: String,
    pub blog_title: String,
    pub blog_description: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            blog_title: DEFAULT_BLOG_TITLE.to_string(),
            blog_description: DEFAULT_BLOG_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("INKPRESS").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Slugify(_)) => {}
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    use clap::Parser;

    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content_source: RawContentSourceSettings,
    listing: RawListingSettings,
    site: RawSiteSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(size) = overrides.page_size {
            self.listing.page_size = Some(size);
        }
        if let Some(visible) = overrides.visible_pages {
            self.listing.visible_pages = Some(visible);
        }
        if let Some(max) = overrides.related_max {
            self.listing.related_max = Some(max);
        }
        if let Some(url) = overrides.public_url.as_ref() {
            self.site.public_url = Some(url.clone());
        }
        self.apply_content_source_overrides(&overrides.content_source);
    }

    fn apply_content_source_overrides(&mut self, overrides: &ContentSourceOverrides) {
        if let Some(project_id) = overrides.project_id.as_ref() {
            self.content_source.project_id = Some(project_id.clone());
        }
        if let Some(dataset) = overrides.dataset.as_ref() {
            self.content_source.dataset = Some(dataset.clone());
        }
        if let Some(version) = overrides.api_version.as_ref() {
            self.content_source.api_version = Some(version.clone());
        }
        if let Some(use_cdn) = overrides.use_cdn {
            self.content_source.use_cdn = Some(use_cdn);
        }
        if let Some(preview) = overrides.preview {
            self.content_source.preview = Some(preview);
        }
        if let Some(seconds) = overrides.timeout_seconds {
            self.content_source.timeout_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        Ok(Self {
            server: build_server_settings(raw.server)?,
            logging: build_logging_settings(raw.logging)?,
            content_source: build_content_source_settings(raw.content_source)?,
            listing: build_listing_settings(raw.listing)?,
            site: build_site_settings(raw.site)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    let addr =
        parse_socket_addr(&host, port).map_err(|err| LoadError::invalid("server.host", err))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_source_settings(
    source: RawContentSourceSettings,
) -> Result<ContentSourceSettings, LoadError> {
    let project_id = non_blank(source.project_id);
    if let Some(id) = project_id.as_deref()
        && !id.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
    {
        return Err(LoadError::invalid(
            "content_source.project_id",
            "must contain only letters, digits and hyphens",
        ));
    }

    let dataset = non_blank(source.dataset).unwrap_or_else(|| DEFAULT_DATASET.to_string());
    let api_version =
        non_blank(source.api_version).unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
    let api_version = api_version.trim_start_matches('v').to_string();
    time::Date::parse(
        &api_version,
        time::macros::format_description!("[year]-[month]-[day]"),
    )
    .map_err(|err| {
        LoadError::invalid(
            "content_source.api_version",
            format!("expected YYYY-MM-DD: {err}"),
        )
    })?;

    let token = non_blank(source.token);
    let perspective = if source.preview.unwrap_or(false) {
        if token.is_none() {
            return Err(LoadError::invalid(
                "content_source.preview",
                "preview perspective requires `content_source.token`",
            ));
        }
        Perspective::PreviewDrafts
    } else {
        Perspective::Published
    };

    let timeout_secs = source
        .timeout_seconds
        .unwrap_or(DEFAULT_SOURCE_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "content_source.timeout_seconds",
            "must be greater than zero",
        ));
    }

    let base_url = non_blank(source.base_url)
        .map(|value| Url::parse(&value))
        .transpose()
        .map_err(|err| LoadError::invalid("content_source.base_url", err.to_string()))?;

    Ok(ContentSourceSettings {
        project_id,
        dataset,
        api_version,
        // Authenticated and preview reads bypass the edge cache.
        use_cdn: source.use_cdn.unwrap_or(false) && perspective == Perspective::Published,
        token,
        perspective,
        timeout: Duration::from_secs(timeout_secs),
        base_url,
    })
}

fn build_listing_settings(listing: RawListingSettings) -> Result<ListingSettings, LoadError> {
    let defaults = ListingSettings::default();

    let page_size = match listing.page_size {
        Some(value) => non_zero_u32(value, "listing.page_size")?,
        None => defaults.page_size,
    };
    let visible_pages = match listing.visible_pages {
        Some(value) => non_zero_u32(value, "listing.visible_pages")?,
        None => defaults.visible_pages,
    };
    let related_max = match listing.related_max {
        Some(value) => non_zero_usize(value, "listing.related_max")?,
        None => defaults.related_max,
    };
    let featured_count = match listing.featured_count {
        Some(value) => non_zero_usize(value, "listing.featured_count")?,
        None => defaults.featured_count,
    };

    Ok(ListingSettings {
        page_size,
        visible_pages,
        related_max,
        featured_count,
    })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let defaults = SiteSettings::default();
    let public_url = non_blank(site.public_url).unwrap_or(defaults.public_url);
    Url::parse(&public_url)
        .map_err(|err| LoadError::invalid("site.public_url", err.to_string()))?;

    Ok(SiteSettings {
        public_url,
        blog_title: non_blank(site.blog_title).unwrap_or(defaults.blog_title),
        blog_description: non_blank(site.blog_description).unwrap_or(defaults.blog_description),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSourceSettings {
    project_id: Option<String>,
    dataset: Option<String>,
    api_version: Option<String>,
    use_cdn: Option<bool>,
    token: Option<String>,
    preview: Option<bool>,
    timeout_seconds: Option<u64>,
    base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawListingSettings {
    page_size: Option<u32>,
    visible_pages: Option<u32>,
    related_max: Option<u32>,
    featured_count: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    public_url: Option<String>,
    blog_title: Option<String>,
    blog_description: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    format!("{host}:{port}")
        .parse::<SocketAddr>()
        .map_err(|err| format!("invalid listener address `{host}:{port}`: {err}"))
}

fn non_zero_u32(value: u32, key: &'static str) -> Result<NonZeroU32, LoadError> {
    NonZeroU32::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

fn non_zero_usize(value: u32, key: &'static str) -> Result<NonZeroUsize, LoadError> {
    let value = usize::try_from(value)
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for usize"))?;
    NonZeroUsize::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
