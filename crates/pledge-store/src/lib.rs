//! # pledge-store
//!
//! SQLite persistence for the Pledge4Peace platform.  The crate exposes a
//! synchronous `Database` handle that wraps a `rusqlite::Connection` and
//! provides typed CRUD helpers for every domain model: users, solutions,
//! interactions, comments, pledges, and Peace Seal companies.
//!
//! Soft deletion is a status flip, never a row deletion; every aggregate
//! read filters on the active status value.

pub mod comments;
pub mod companies;
pub mod database;
pub mod interactions;
pub mod migrations;
pub mod models;
pub mod pledges;
pub mod query;
pub mod solutions;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
pub use pledges::PledgeWithUser;
