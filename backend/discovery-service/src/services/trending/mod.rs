/// Trending/Discovery Service
///
/// Freshness-weighted popularity ranking of recent public projects
pub mod algorithm;
pub mod service;

pub use service::TrendingService;
