use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "apartment_status")]
pub enum ApartmentStatus {
    Available,
    Rented,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Apartment {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub floor_area_size: f64,
    pub price_per_month: f64,
    pub number_of_rooms: i32,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ApartmentStatus,
    /// Owning realtor; unowned listings are possible after a realtor
    /// account is deleted.
    pub realtor: Option<Uuid>,
    pub created: DateTime<Utc>,
}

/// Insert payload for the listing directory
#[derive(Debug, Clone)]
pub struct NewApartment {
    pub name: String,
    pub description: String,
    pub floor_area_size: f64,
    pub price_per_month: f64,
    pub number_of_rooms: i32,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ApartmentStatus,
    pub realtor: Option<Uuid>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ApartmentChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub floor_area_size: Option<f64>,
    pub price_per_month: Option<f64>,
    pub number_of_rooms: Option<i32>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<ApartmentStatus>,
    pub realtor: Option<Uuid>,
}

impl ApartmentChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.floor_area_size.is_none()
            && self.price_per_month.is_none()
            && self.number_of_rooms.is_none()
            && self.address.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.status.is_none()
            && self.realtor.is_none()
    }
}
