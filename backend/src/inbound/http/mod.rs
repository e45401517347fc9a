//! HTTP inbound adapter exposing the REST endpoints.

pub mod error;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod session;
pub mod state;
pub mod tags;
pub mod users;
pub mod validation;

pub use crate::domain::ApiResult;
