//! Support for library configuration options

use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};

/// API key for the weather collaborator (see [`crate::weather`]).
/// Set it when initing this library; weather requests fail without it.
pub static WEATHER_API_KEY: Lazy<Arc<Mutex<String>>> =
    Lazy::new(|| Arc::new(Mutex::new(String::new())));

/// Fallback `(latitude, longitude)` used when the caller has no position of its own.
/// Defaults to Tokyo. Feel free to override it when initing this library.
pub static DEFAULT_COORDS: Lazy<Arc<Mutex<(f64, f64)>>> =
    Lazy::new(|| Arc::new(Mutex::new((35.6762, 139.6503))));
