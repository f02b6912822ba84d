//! Custom Axum extractors.
//!
//! Each one turns a framework rejection into the API's JSON error body.

pub mod path;
pub mod request;
pub mod user_auth;

pub use path::{EventPath, TaskPath};
pub use request::{AppJson, AppQuery};
