//! Core use-case services.
//!
//! # Responsibility
//! - Own the in-memory task collection and its mutation rules.
//! - Keep presentation layers decoupled from slot storage details.

pub mod task_store;
