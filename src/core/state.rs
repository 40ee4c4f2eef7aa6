use std::sync::Arc;

use axum::extract::FromRef;

use crate::controllers::user::UserController;
use crate::core::config::Args;
use crate::core::error::ConfigError;
use crate::core::session::SessionConfig;
use crate::core::store::Store;

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) user_controller: UserController,
    pub(crate) session: SessionConfig,
}

impl AppState {
    pub(crate) fn new(store: Arc<dyn Store>, config: &Args) -> Result<Self, ConfigError> {
        Ok(AppState {
            user_controller: UserController::new(store.clone(), config.bcrypt_cost)?,
            session: SessionConfig::new(config.secret.as_bytes(), config.secure_cookies),
            store,
        })
    }
}

impl FromRef<AppState> for SessionConfig {
    fn from_ref(state: &AppState) -> Self {
        state.session.clone()
    }
}
