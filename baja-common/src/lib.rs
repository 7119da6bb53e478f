//! Types shared between the dashboard backend and anything that draws it.

mod types;

pub use types::{
    Card, DashboardView, FIELD_NAMES, NO_DATA, PLACEHOLDER, Readings, Snapshot, ViewStatus,
};
