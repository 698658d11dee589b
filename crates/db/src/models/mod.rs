pub mod bin;
pub mod transaction;
pub mod user;
