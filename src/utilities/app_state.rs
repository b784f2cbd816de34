use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    features::wizard::sessions::WizardSessions,
    services::{database::Database, storage::ObjectStorage},
    utilities::config::Config,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub database: Database,
    pub storage: Arc<dyn ObjectStorage>,
    pub wizards: WizardSessions,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.database.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ObjectStorage> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.storage)
    }
}

impl FromRef<AppState> for WizardSessions {
    fn from_ref(state: &AppState) -> Self {
        state.wizards.clone()
    }
}
