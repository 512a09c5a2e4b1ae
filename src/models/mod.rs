//! Core data models for the file gateway.
//!
//! `object` describes what the gateway knows about stored objects (it never
//! holds their content itself). `user` maps the read-only `users` table via
//! `sqlx::FromRow` and serializes as JSON via `serde`.

pub mod object;
pub mod user;
