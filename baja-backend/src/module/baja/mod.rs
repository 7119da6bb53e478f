///! Baja data snapshot module
///!
///! Asks the generative backend for the town's weather, river level and
///! sun/moon times and turns the answer into a `Snapshot`.

pub mod error;
pub mod prompt;
pub mod parser;
pub mod fetcher;

pub use error::{FetchError, QUOTA_EXCEEDED_MESSAGE};
pub use fetcher::{Clock, DataFetcher, LAST_UPDATED_FORMAT, SystemClock};
