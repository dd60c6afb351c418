pub mod admin;
pub mod health;
pub mod search;
pub mod status;
