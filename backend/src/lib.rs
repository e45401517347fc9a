//! Larder backend library modules.
//!
//! A recipe-box service: email-keyed user accounts plus owner-scoped
//! tags, ingredients, and recipes exposed over a session-authenticated
//! JSON API. Layout is hexagonal: `domain` holds entities and ports,
//! `inbound` the HTTP adapter, `outbound` the persistence and media
//! adapters, and `server` the wiring.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
