//! # Error handling utilities.
//! Every fallible operation in the calculator returns the generic anyhow
//! error type; the only recovered failure is the catalog load, see
//! `catalog::load_or_builtin`.

pub type Result<T> = anyhow::Result<T>;
