//! Core types and trait definitions for the persons service.
//!
//! This crate is deliberately free of HTTP and search-cluster dependencies.
//! It holds the document model, its index mapping, the repository
//! abstraction, and an in-process index that honours the same contract.

pub mod blocking;
pub mod codec;
pub mod error;
pub mod mapping;
pub mod memory;
pub mod person;
pub mod query;
pub mod repository;
pub mod service;

pub use error::{Error, Result};
