//! Shared utilities for the Event Planner backend.
//!
//! This crate provides the credential subsystem and input helpers used by
//! the other crates:
//! - Password hashing with Argon2id
//! - Bearer token issuing and verification (HS256 JWT)
//! - Date, time-of-day and email normalization

pub mod jwt;
pub mod password;
pub mod validation;
