//! Domain logic for the ReMat deposit service.
//!
//! No database or HTTP code lives here. Storage and the image classifier are
//! reached through the [`deposit::DepositUnitOfWork`] and
//! [`classification::Classifier`] traits.

pub mod bin;
pub mod classification;
pub mod deposit;
pub mod error;
pub mod scoring;
pub mod types;
pub mod waste;
