pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};

pub use db::{CatalogSource, RestCatalogSource};
pub use models::{ContentItem, ContentItemRecord, RankedItem, TrackStats};
pub use services::{FeedController, FeedEvent, FeedSnapshot, FeedState, TrendingService};
