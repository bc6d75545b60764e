//! Campus Identity - canonical account resolution
//!
//! Request handlers receive user references in three shapes: an email, a
//! legacy numeric demo id, or an already-issued opaque id. This crate maps all
//! of them onto one canonical account id, lazily provisioning the backing row
//! for identities a seed provider can vouch for.

#![deny(unsafe_code)]

mod error;
mod reference;
mod resolver;
mod seed;

pub use campus_storage::{AccountRecord, AccountStore, CanonicalId, RoleTag};
pub use error::{IdentityError, IdentityResult};
pub use reference::AccountReference;
pub use resolver::{
    IdentityResolver, NotFoundReason, RaceRecovery, ResolutionOutcome, ResolverConfig,
};
pub use seed::{SeedAccount, SeedAccountProvider, StaticSeedAccounts};
