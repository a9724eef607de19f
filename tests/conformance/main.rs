//! Conformance suite
//!
//! Exercises the whole stack through the public `crudtable` API.
//!
//! ## Test Tiers
//!
//! - **Tier 1**: Prototype resolution
//! - **Tier 2**: Read path normalization and envelope shape
//! - **Tier 3**: Search, allow-list and dispatch errors
//! - **Tier 4**: Concurrency and bulk operations
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test conformance
//! ```

mod test_utils;

// Tier 1: Prototype resolution
mod tier1_prototype;

// Tier 2: Read path and envelope
mod tier2_envelope;

// Tier 3: Search, allow-list, dispatch
mod tier3_dispatch;

// Tier 4: Concurrency and bulk operations
mod tier4_concurrency;
