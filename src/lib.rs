//! Shared test and benchmark utilities for the SciTiger spider workspace.
//!
//! The real functionality lives in `services/gateway`; this crate only
//! carries the e2e harness and fixtures the benches and e2e suites share.

#[cfg(feature = "bench-include")]
pub mod bench_support;
