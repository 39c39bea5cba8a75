pub mod apartments;
pub mod models;
pub mod users;

pub use apartments::ApartmentDirectory;
pub use users::UserDirectory;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::auth::password;
use crate::config::AppConfig;
use crate::database::models::{NewUser, Role};

pub async fn connect(config: &crate::config::DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Pings the database to confirm connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Idempotent admin bootstrap. Any existing admin account, whatever its
/// email, suppresses creation; the seed never mutates an existing record.
pub async fn seed_admin(pool: &PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let users = UserDirectory::new(pool.clone());

    if users.any_with_role(Role::Admin).await? {
        return Ok(());
    }

    let password_hash = password::hash(&config.seed.admin_password, &config.security)?;
    let admin = users
        .create(NewUser {
            email: config.seed.admin_email.clone(),
            password_hash,
            firstname: "Admin".into(),
            lastname: "User".into(),
            role: Role::Admin,
            verified: true,
        })
        .await?;

    info!("seeded admin account {}", admin.email);
    Ok(())
}
