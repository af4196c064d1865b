use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub jwt: JwtKeys,
}

impl AppState {
    /// Derives the JWT keys from the config once; a bad `JWT_ALGORITHM`
    /// fails startup instead of every request.
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> anyhow::Result<Self> {
        let jwt = JwtKeys::new(&config.auth)?;
        Ok(Self {
            config: Arc::new(config),
            store,
            jwt,
        })
    }
}
