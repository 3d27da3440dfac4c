//! Entity configuration parsing and restricted template evaluation.
//!
//! This crate turns the raw entity configuration into a prompt context in
//! three steps:
//!
//! 1. [`parse_entity_config`] splits the raw value into an ordered sequence
//!    of literal identifiers and template expressions, tolerating unbalanced
//!    markers.
//! 2. [`Evaluator`] renders template expressions against a restricted
//!    environment exposing only read-only state accessors.
//! 3. [`resolve`] combines both over a [`fresco_core::StateSnapshot`] into an
//!    ordered resolved context, which [`flatten`] projects into the
//!    JSON-serializable prompt context.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod eval;
mod parser;
mod resolver;

pub use eval::Evaluator;
pub use parser::{parse_entity_config, ParsedConfig};
pub use resolver::{flatten, resolve};
