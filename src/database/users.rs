use sqlx::PgPool;
use uuid::Uuid;

use super::models::{NewUser, Role, User, UserChanges};

/// Typed access to the users table. Uniqueness of `email` is enforced by
/// the database; violations surface as `sqlx::Error::Database` with the
/// unique-violation code and are mapped to a conflict upstream.
#[derive(Clone)]
pub struct UserDirectory {
    pool: PgPool,
}

impl UserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, firstname, lastname, role, verified) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.firstname)
        .bind(&new_user.lastname)
        .bind(new_user.role)
        .bind(new_user.verified)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    /// All users whose role is in the given set. Roles are a closed set
    /// of static identifiers, so they are rendered inline.
    pub async fn find_by_roles(&self, roles: &[Role]) -> Result<Vec<User>, sqlx::Error> {
        if roles.is_empty() {
            return Ok(vec![]);
        }
        let role_list = roles
            .iter()
            .map(|role| format!("'{}'", role.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT * FROM users WHERE role IN ({role_list}) ORDER BY created");
        sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await
    }

    pub async fn any_with_role(&self, role: Role) -> Result<bool, sqlx::Error> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE role = $1 LIMIT 1")
            .bind(role)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Partial field merge; untouched fields keep their stored values.
    /// An empty change set is a no-op.
    pub async fn update(&self, id: Uuid, changes: UserChanges) -> Result<(), sqlx::Error> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut sets = Vec::new();
        let mut index = 0;
        let mut next = |column: &str| {
            index += 1;
            sets.push(format!("{column} = ${index}"));
        };

        if changes.email.is_some() {
            next("email");
        }
        if changes.password_hash.is_some() {
            next("password_hash");
        }
        if changes.firstname.is_some() {
            next("firstname");
        }
        if changes.lastname.is_some() {
            next("lastname");
        }
        if changes.role.is_some() {
            next("role");
        }
        if changes.verified.is_some() {
            next("verified");
        }

        let sql = format!("UPDATE users SET {} WHERE id = ${}", sets.join(", "), index + 1);
        let mut query = sqlx::query(&sql);

        if let Some(email) = changes.email {
            query = query.bind(email);
        }
        if let Some(password_hash) = changes.password_hash {
            query = query.bind(password_hash);
        }
        if let Some(firstname) = changes.firstname {
            query = query.bind(firstname);
        }
        if let Some(lastname) = changes.lastname {
            query = query.bind(lastname);
        }
        if let Some(role) = changes.role {
            query = query.bind(role);
        }
        if let Some(verified) = changes.verified {
            query = query.bind(verified);
        }

        query.bind(id).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn set_verified(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET verified = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Returns whether a row was actually removed
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
