use crate::parser::RecordParser;
use crate::tracker::Tracker;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub parser: RecordParser,
    pub tracker: Arc<Mutex<Tracker>>,
}

impl AppState {
    pub fn new(parser: RecordParser, tracker: Tracker) -> Self {
        Self {
            parser,
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }
}
