//! Rollup relayer pipeline tests.

pub mod utils;
