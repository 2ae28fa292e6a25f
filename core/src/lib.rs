//! Ladder reconciliation and aggregation engine.
//!
//! Raw OCR text of an invasion ladder goes in, reconciled ladders and
//! per-invasion / per-month participation reports come out.
//!
//! RULE: Only `store` talks to the database. Everything else works on
//! values handed to it by the engine.

pub mod config;
pub mod engine;
pub mod error;
pub mod invasion;
pub mod ladder;
pub mod matcher;
pub mod member;
pub mod parser;
pub mod report;
pub mod request;
pub mod roster;
pub mod source;
pub mod store;
pub mod types;
