//! Campus account storage abstractions.
//!
//! This crate defines the storage contract the identity resolver runs against:
//! - lookup of account rows by case-insensitive email
//! - keyed insertion of new account rows (never updates, never deletes)
//! - operator reads (by id, paged listing)
//!
//! Design stance:
//! - The hosted relational store owns every account row and enforces email
//!   uniqueness.
//! - The in-memory adapter mirrors that uniqueness so tests observe the same
//!   conflict behaviour as production.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
mod model;
#[cfg(feature = "postgres")]
pub mod postgres;
mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryAccountStore;
pub use model::{normalize_email, AccountRecord, CanonicalId, RoleTag, UnknownRole};
pub use traits::{AccountStore, QueryWindow};
