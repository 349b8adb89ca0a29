use crate::auth::session::SessionStore;
use crate::config::Config;
use crate::models::pincode::Pincode;
use crate::observability::metrics::Metrics;
use crate::store::orders::OrderStore;
use crate::store::riders::RiderStore;

pub struct AppState {
    pub orders: OrderStore,
    pub riders: RiderStore,
    pub sessions: SessionStore,
    pub pincodes: Vec<Pincode>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let pincodes = config
            .serviceable_pincodes
            .iter()
            .map(|code| Pincode {
                code: code.clone(),
                delivery_available: true,
            })
            .collect();

        Self {
            orders: OrderStore::new(),
            riders: RiderStore::new(),
            sessions: SessionStore::new(config.session_ttl_secs),
            pincodes,
            metrics: Metrics::new(),
        }
    }

    /// An empty pincode list means every pincode is served.
    pub fn is_serviceable(&self, pincode: &str) -> bool {
        self.pincodes.is_empty()
            || self
                .pincodes
                .iter()
                .any(|p| p.delivery_available && p.code == pincode)
    }
}
