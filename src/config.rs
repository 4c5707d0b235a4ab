//! Support for library configuration options

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// Base URL of the task API, used when a [`Client`](crate::client::Client) is built without an explicit URL.
/// Feel free to override it when initing this library.
pub static API_URL: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("http://localhost:8080/api".to_string())));

/// The `User-Agent` header sent with every request.
/// Feel free to override it when initing this library.
pub static USER_AGENT: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new(format!("taskify-client/{}", env!("CARGO_PKG_VERSION")))));

/// How many tasks are requested per page when no size is given
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// How many days the calendar strip spans, starting today
pub const CALENDAR_SPAN_DAYS: usize = 14;

/// How many days are shown at once in the calendar strip
pub const DAYS_PER_PAGE: usize = 7;

pub const MAX_TITLE_LEN: usize = 60;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_NAME_LEN: usize = 60;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Where the credentials are stored by default (e.g. `~/.config/taskify/credentials.json` on Linux)
pub fn default_credentials_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskify")
        .join("credentials.json")
}

pub(crate) fn api_url() -> String {
    match API_URL.lock() {
        Ok(url) => url.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub(crate) fn user_agent() -> String {
    match USER_AGENT.lock() {
        Ok(ua) => ua.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
