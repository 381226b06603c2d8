//! Property-based fuzz testing for the case study codec and validation model
//!
//! # Usage
//!
//! ```bash
//! # Run all property-based tests
//! cargo test --release -p dbc-case-study-fuzz
//!
//! # Run the fuzz test runner
//! cargo run --release -p dbc-case-study-fuzz --bin fuzz_all
//!
//! # Run with more iterations
//! PROPTEST_CASES=10000 cargo test --release -p dbc-case-study-fuzz
//! ```

pub mod arbitrary;
pub mod invariants;
pub mod scenarios;

pub use arbitrary::*;
pub use invariants::*;
pub use scenarios::*;

// Include fuzz targets as test modules
#[cfg(test)]
#[path = "../fuzz_targets/codec_roundtrip.rs"]
mod codec_roundtrip_tests;

#[cfg(test)]
#[path = "../fuzz_targets/malformed_input.rs"]
mod malformed_input_tests;

#[cfg(test)]
#[path = "../fuzz_targets/eligibility.rs"]
mod eligibility_tests;

#[cfg(test)]
#[path = "../fuzz_targets/validator_votes.rs"]
mod validator_votes_tests;
