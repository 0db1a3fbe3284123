//! Client-side data feeds built on a [`QuoteSource`].

pub mod demo;
pub mod historical;
pub mod quotes;
pub mod source;

pub use demo::demo_quotes;
pub use historical::HistoricalFeed;
pub use quotes::{
    PollerConfig, PollerHandle, PollerNotice, QuotePoller, QuoteSnapshot, SnapshotOrigin,
    DEFAULT_POLL_INTERVAL,
};
pub use source::QuoteSource;
