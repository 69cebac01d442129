//! Domain primitives shared by the giveaway service.
//!
//! Pure functions and types only: hashing, deduplication fingerprints,
//! email normalization and pagination. No framework or datastore dependencies.

pub mod email;
pub mod fingerprint;
pub mod hash;
pub mod pagination;
