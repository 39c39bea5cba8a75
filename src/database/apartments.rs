use sqlx::postgres::PgArguments;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::models::{Apartment, ApartmentChanges, NewApartment};
use crate::filter::{Predicate, SqlParam};

/// Typed access to the apartments table
#[derive(Clone)]
pub struct ApartmentDirectory {
    pool: PgPool,
}

impl ApartmentDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewApartment) -> Result<Apartment, sqlx::Error> {
        sqlx::query_as::<_, Apartment>(
            "INSERT INTO apartments \
             (name, description, floor_area_size, price_per_month, number_of_rooms, \
              address, latitude, longitude, status, realtor) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.floor_area_size)
        .bind(new.price_per_month)
        .bind(new.number_of_rooms)
        .bind(&new.address)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(new.status)
        .bind(new.realtor)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Apartment>, sqlx::Error> {
        sqlx::query_as::<_, Apartment>("SELECT * FROM apartments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Query by predicate: the user filter AND the role scope, already
    /// merged by the caller. An empty predicate returns everything.
    pub async fn find_many(&self, predicate: &Predicate) -> Result<Vec<Apartment>, sqlx::Error> {
        let rendered = predicate.to_sql(0);
        let sql = if rendered.clause.is_empty() {
            "SELECT * FROM apartments ORDER BY created DESC".to_string()
        } else {
            format!(
                "SELECT * FROM apartments WHERE {} ORDER BY created DESC",
                rendered.clause
            )
        };

        let mut query = sqlx::query_as::<_, Apartment>(&sql);
        for param in &rendered.params {
            query = bind_param(query, param);
        }
        query.fetch_all(&self.pool).await
    }

    /// Partial field merge; untouched fields keep their stored values.
    /// An empty change set is a no-op.
    pub async fn update(&self, id: Uuid, changes: ApartmentChanges) -> Result<(), sqlx::Error> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut sets = Vec::new();
        let mut index = 0;
        let mut next = |column: &str| {
            index += 1;
            sets.push(format!("{column} = ${index}"));
        };

        if changes.name.is_some() {
            next("name");
        }
        if changes.description.is_some() {
            next("description");
        }
        if changes.floor_area_size.is_some() {
            next("floor_area_size");
        }
        if changes.price_per_month.is_some() {
            next("price_per_month");
        }
        if changes.number_of_rooms.is_some() {
            next("number_of_rooms");
        }
        if changes.address.is_some() {
            next("address");
        }
        if changes.latitude.is_some() {
            next("latitude");
        }
        if changes.longitude.is_some() {
            next("longitude");
        }
        if changes.status.is_some() {
            next("status");
        }
        if changes.realtor.is_some() {
            next("realtor");
        }

        let sql = format!("UPDATE apartments SET {} WHERE id = ${}", sets.join(", "), index + 1);
        let mut query = sqlx::query(&sql);

        if let Some(name) = changes.name {
            query = query.bind(name);
        }
        if let Some(description) = changes.description {
            query = query.bind(description);
        }
        if let Some(floor_area_size) = changes.floor_area_size {
            query = query.bind(floor_area_size);
        }
        if let Some(price_per_month) = changes.price_per_month {
            query = query.bind(price_per_month);
        }
        if let Some(number_of_rooms) = changes.number_of_rooms {
            query = query.bind(number_of_rooms);
        }
        if let Some(address) = changes.address {
            query = query.bind(address);
        }
        if let Some(latitude) = changes.latitude {
            query = query.bind(latitude);
        }
        if let Some(longitude) = changes.longitude {
            query = query.bind(longitude);
        }
        if let Some(status) = changes.status {
            query = query.bind(status);
        }
        if let Some(realtor) = changes.realtor {
            query = query.bind(realtor);
        }

        query.bind(id).execute(&self.pool).await?;
        Ok(())
    }

    /// Returns whether a row was actually removed
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM apartments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn bind_param<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    param: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match param {
        SqlParam::Float(f) => query.bind(*f),
        SqlParam::Int(i) => query.bind(*i),
        SqlParam::Uuid(id) => query.bind(*id),
        SqlParam::Status(status) => query.bind(*status),
    }
}
