pub mod app;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod seed;
pub mod stats;
pub mod storage;
pub mod tracker;
pub mod ui;
pub mod state;

pub use app::router;
pub use state::AppState;
pub use storage::{import_snapshot_file, resolve_import_path, resolve_port};
