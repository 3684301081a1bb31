//! Core types and rules for the Cadastro contact registry.
//!
//! This crate is deliberately free of HTTP and terminal dependencies. It
//! holds the contact data model, the field validation rules, the in-memory
//! repository, the form controller policies and the address-lookup seam.
//! Front-ends (`cadastro-api`, `cadastro-tui`) depend on it; it performs no
//! I/O of its own.

pub mod error;
pub mod form;
pub mod handoff;
pub mod lookup;
pub mod record;
pub mod repository;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
