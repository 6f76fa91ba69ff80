//! Fixtures for testing.
//!
//! Available behind the `test-utils` feature flag. A small calculator
//! system: adder, subtractor, calculators that acquire them, a logger with
//! MULTIPLE cardinality, and an adaptor with one advice of each kind.

mod calculator;
mod fixture_loader;

pub use calculator::{
    CALC_REPO, CALC_NAMESPACE, calc_adaptor, calculator_catalog, calculator_documents,
};
pub use fixture_loader::FixtureLoader;
