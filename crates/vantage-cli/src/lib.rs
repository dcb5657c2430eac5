//! HTTP surface of the `vantage` binary.

pub mod serve;
