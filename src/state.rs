use std::sync::{Arc, Mutex};

use rusqlite::Connection;

/// Shared application state: the store handle is constructed once at
/// startup and held for the process lifetime.
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
}
