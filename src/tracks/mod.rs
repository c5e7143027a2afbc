mod ingest;
mod selector;
mod store;
mod types;

pub use ingest::{run_ingest, run_sweep, SWEEP_INTERVAL};
pub use selector::{select_nearest, Nearest};
pub use store::TrackStore;
pub use types::{PositionPoint, Track};
