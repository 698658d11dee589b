//! Repository layer: one unit struct per table with `async fn` queries.

pub mod bin_repo;
pub mod transaction_repo;
pub mod user_repo;

pub use bin_repo::BinRepo;
pub use transaction_repo::TransactionRepo;
pub use user_repo::UserRepo;
