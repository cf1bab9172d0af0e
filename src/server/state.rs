use std::sync::Arc;

use crate::config::Settings;
use crate::provider::{ProviderError, ProviderGateway};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub gateway: Arc<ProviderGateway>,
}

impl AppState {
    /// Build the shared state; fails when the gateway's credentials are
    /// absent so misconfiguration surfaces at startup.
    pub fn new(settings: Settings) -> Result<Self, ProviderError> {
        let gateway = Arc::new(ProviderGateway::new(&settings.onesignal)?);

        Ok(Self {
            settings: Arc::new(settings),
            gateway,
        })
    }
}
