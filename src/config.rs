use std::time::Duration;

use clap::Args;

use crate::assets::IconSource;

pub const DEFAULT_LISTING_FALLBACK: &str = "https://www.google.com";
pub const DEFAULT_MAP_BASE: &str = "https://www.google.com/maps/dir/";
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;
pub const BODY_LIMIT: usize = 1024 * 1024;

/// Report options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Listing link encoded when a submission has no URL
    #[arg(long, env = "NEST_NOTES_LISTING_FALLBACK", default_value = DEFAULT_LISTING_FALLBACK)]
    pub listing_fallback: String,

    /// Base of the map-directions link
    #[arg(long, env = "NEST_NOTES_MAP_BASE", default_value = DEFAULT_MAP_BASE)]
    pub map_base: String,

    /// Fetch the car icon from this URL instead of using the bundled one
    #[arg(long, env = "NEST_NOTES_ICON_URL")]
    pub icon_url: Option<String>,

    /// Give up on remote images after this many seconds (default: wait indefinitely)
    #[arg(long, env = "NEST_NOTES_FETCH_TIMEOUT_SECS")]
    pub fetch_timeout_secs: Option<u64>,

    /// Size in bytes of each chunk of the returned document
    #[arg(long, env = "NEST_NOTES_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listing_fallback: String,
    pub map_base: String,
    pub icon: IconSource,
    pub fetch_timeout: Option<Duration>,
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listing_fallback: DEFAULT_LISTING_FALLBACK.to_string(),
            map_base: DEFAULT_MAP_BASE.to_string(),
            icon: IconSource::Embedded,
            fetch_timeout: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl From<&ReportArgs> for Config {
    fn from(args: &ReportArgs) -> Self {
        Config {
            listing_fallback: args.listing_fallback.clone(),
            map_base: args.map_base.clone(),
            icon: match &args.icon_url {
                Some(url) => IconSource::Remote(url.clone()),
                None => IconSource::Embedded,
            },
            fetch_timeout: args.fetch_timeout_secs.map(Duration::from_secs),
            chunk_size: args.chunk_size.max(1),
        }
    }
}
