//! Domain types shared by every stage of the pipeline.

pub mod bar;
pub mod constituent;
pub mod decision;
pub mod holding;
pub mod metrics;
pub mod news;

pub use bar::PriceBar;
pub use constituent::Constituent;
pub use decision::Decision;
pub use holding::Holding;
pub use metrics::{Horizon, MetricsRow};
pub use news::{Headline, NewsDigest};
