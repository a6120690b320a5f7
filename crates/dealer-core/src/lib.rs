//! # dealer-core — Foundational Types for the Dealership Reviews Service
//!
//! Defines the identifiers and document shapes shared by every layer of the
//! service. Depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Two distinct dealer identifiers.** The store-assigned [`StoreId`] and
//!    the application-assigned [`DealerNumericId`] are separate newtypes.
//!    Lookups go through the tagged [`DealerLookup`] rather than string
//!    sniffing at the call site.
//!
//! 2. **Opaque descriptive fields.** A [`Dealership`] types only the fields the
//!    service queries on (`_id`, `id`, `state`); everything else is carried
//!    verbatim.
//!
//! 3. **Review ids are application ids.** [`ReviewId`] is assigned by the
//!    service, never by the store.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dealer-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod dealership;
pub mod error;
pub mod identity;
pub mod review;

pub use dealership::{Dealership, DEALERSHIPS};
pub use error::{CoreError, IdentityError};
pub use identity::{DealerLookup, DealerNumericId, ReviewId, StoreId};
pub use review::{DealerRef, NewReview, Review, REVIEWS};
