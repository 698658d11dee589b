//! Client for the external waste-image model server.
//!
//! [`InferenceClient`] implements [`remat_core::classification::Classifier`]
//! so it can be injected into the classification adapter.

pub mod client;

pub use client::{InferenceClient, InferenceError};
