pub mod bins;
pub mod categories;
pub mod classify;
pub mod deposits;
pub mod upload;
pub mod users;
