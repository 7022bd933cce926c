//! Core bridge logic — types, parsing, mapping, reconciliation.

pub mod mapper;
pub mod parser;
pub mod provider;
pub mod types;
