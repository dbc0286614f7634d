mod watched;

pub use watched::{WatchedEntry, WatchedSummary, MAX_RATING};
