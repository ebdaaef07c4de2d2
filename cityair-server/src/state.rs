use std::sync::Arc;
use tokio::sync::Mutex;

use cityair_core::WeatherService;

/// Shared application state.
///
/// One coarse lock guards the whole service: both the geocoding cache and the
/// history's read-modify-rewrite cycle are mutated per request, and expected
/// throughput does not justify anything finer-grained.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Mutex<WeatherService>>,
}

impl AppState {
    pub fn new(service: WeatherService) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
        }
    }
}
