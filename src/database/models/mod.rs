pub mod apartment;
pub mod user;

pub use apartment::{Apartment, ApartmentChanges, ApartmentStatus, NewApartment};
pub use user::{NewUser, Role, User, UserChanges};
