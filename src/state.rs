use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, SeaOrmAuthService, SeaOrmSectionService, SeaOrmTokenService, SectionService,
    TokenService,
};

/// Services shared between the HTTP layer and CLI commands.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub token_service: Arc<dyn TokenService>,

    pub auth_service: Arc<dyn AuthService>,

    pub section_service: Arc<dyn SectionService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let token_service: Arc<dyn TokenService> = Arc::new(SeaOrmTokenService::new(
            store.clone(),
            config.security.token_length,
        ));

        let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            token_service.clone(),
            config.security.clone(),
        ));

        let section_service: Arc<dyn SectionService> =
            Arc::new(SeaOrmSectionService::new(store.clone()));

        Self {
            config: Arc::new(config),
            store,
            token_service,
            auth_service,
            section_service,
        }
    }
}
