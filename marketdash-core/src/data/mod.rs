//! External data sources and the tabular price input.

pub mod circuit_breaker;
pub mod frame;
pub mod google_news;
pub mod http;
pub mod provider;
pub mod wikipedia;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use frame::{metrics_from_frame, FramePriceSource, PriceFrame};
pub use google_news::GoogleNews;
pub use http::HttpFetcher;
pub use provider::{NewsSource, PriceSource, RawTable, TableSource};
pub use wikipedia::WikipediaTables;
pub use yahoo::YahooPriceSource;
