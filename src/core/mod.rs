//! core
//!
//! Core domain types and schemas.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, RefName, Repository, MovableRef
//! - [`version`] - Semantic version parsing and precedence of release tags
//! - [`event`] - The triggering release event
//! - [`config`] - Configuration schema and resolution
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Nothing in this layer talks to the network

pub mod config;
pub mod event;
pub mod types;
pub mod version;
