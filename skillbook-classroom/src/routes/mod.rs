pub mod classes;
pub mod health;
