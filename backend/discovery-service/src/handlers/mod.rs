pub mod discovery;

pub use discovery::{configure, DiscoveryHandlerState, TrendingResponse};
