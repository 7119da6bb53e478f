///! Dashboard state and presentation
///!
///! - `DashboardController`: loading/ready/failed lifecycle around the fetcher
///! - `view`: state → cards (number extraction, placeholders)
///! - `DashboardRenderer`: cards → HTML page

pub mod controller;
pub mod view;
pub mod renderer;

pub use controller::{DashboardController, DashboardState, GENERIC_ERROR_MESSAGE, LoadOutcome, Trigger};
pub use view::{build_view, display_numeric, display_text, extract_numeric_token};
pub use renderer::DashboardRenderer;
