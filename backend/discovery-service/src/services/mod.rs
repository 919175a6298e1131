//! Service layer for discovery-service
//!
//! - trending: one aggregation pass over the catalog
//! - feed_state: owns the latest trending list and refresh generations

pub mod feed_state;
pub mod trending;

pub use feed_state::{FeedController, FeedEvent, FeedSnapshot, FeedState};
pub use trending::TrendingService;
