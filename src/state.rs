use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::{ApartmentDirectory, UserDirectory};
use crate::mail::Mailer;

/// Shared per-process state handed to every handler. Built once in main
/// from the loaded configuration; nothing here is mutable.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: PgPool,
    pub tokens: TokenService,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let tokens = TokenService::new(&config.security);
        let mailer = Mailer::new(config.mail.clone());
        Self {
            config: Arc::new(config),
            pool,
            tokens,
            mailer,
        }
    }

    pub fn users(&self) -> UserDirectory {
        UserDirectory::new(self.pool.clone())
    }

    pub fn apartments(&self) -> ApartmentDirectory {
        ApartmentDirectory::new(self.pool.clone())
    }
}
