/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Source defaults
pub const DEFAULT_SOURCE_NAME: &str = "Animevietsub";

// Webhook defaults
pub const DEFAULT_EMBED_COLOR: u32 = 0x1abc9c;

// Polling defaults
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 30;

// Storage defaults
pub const DEFAULT_HISTORY_PATH: &str = "AnimeVnSub.json";
pub const DEFAULT_MAX_HISTORY: usize = 30;

// Listing page selectors
pub const DEFAULT_LISTING_CONTAINER: &str = ".MovieList";
pub const DEFAULT_LISTING_ITEM: &str = ".MovieList .TPostMv";
pub const DEFAULT_TITLE: &str = ".Title";
pub const DEFAULT_EPISODE: &str = ".mli-eps i";
pub const DEFAULT_LINK: &str = "a[href]";
pub const DEFAULT_IMAGE: &str = "img[src]";
pub const DEFAULT_RATING: &str = ".anime-avg-user-rating";
pub const DEFAULT_GENRE: &str = ".Genre a";

// Detail page selectors
pub const DEFAULT_DESCRIPTION: &str = ".Description";
pub const DEFAULT_BACKGROUND_IMAGE: &str = ".TPostBg.Objf img";
