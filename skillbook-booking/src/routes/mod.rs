pub mod availability;
pub mod bookings;
pub mod health;
pub mod payments;
pub mod slots;
pub mod teachers;
