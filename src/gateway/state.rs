use std::sync::Arc;

use crate::service::LedgerApi;

/// Gateway 应用状态 (共享)
#[derive(Clone)]
pub struct AppState {
    /// Ledger facade, backend erased
    pub ledger: Arc<dyn LedgerApi>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn LedgerApi>) -> Self {
        Self { ledger }
    }
}
