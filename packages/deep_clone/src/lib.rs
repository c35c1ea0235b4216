#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Structural cloning of dynamically typed value graphs.
//!
//! This package provides [`Value`], a dynamically typed value whose structured variants are
//! shared [`Object`] handles, and [`Cloner`], which produces deep or shallow structural copies
//! of such values.
//!
//! # Features
//!
//! - **Deep and shallow clones**: a deep clone shares no mutable nested structure with the
//!   original, a shallow clone copies only the top-level container.
//! - **Cycle safety**: self-referential values are cloned into self-referential copies.
//! - **Sharing preservation**: an object reachable through several paths is copied once and the
//!   copy is reachable through the same paths.
//! - **Many kinds of objects**: records, sequences, maps, sets, dates, patterns, errors, binary
//!   buffers and views, functions and weak collections, each with its own copy strategy.
//! - **Lenient or strict**: unsupported objects are replaced with [`Value::Null`] and reported as
//!   a diagnostic, or fail the clone with a [`CloneError`].
//!
//! # Example
//!
//! ```rust
//! use deep_clone::{Value, clone_value};
//!
//! let node = Value::record();
//! node.set("name", "root");
//! node.set("parent", node.clone());
//!
//! let copy = clone_value(&node, true);
//!
//! assert_eq!(copy.get("name").as_str(), Some("root"));
//! assert!(copy.get("parent").ptr_eq(&copy));
//! assert!(!copy.ptr_eq(&node));
//! ```
//!
//! # Diagnostics
//!
//! Unsupported objects encountered by the lenient clone operations are reported as `tracing`
//! events with the `deep_clone::diagnostics` target. Use [`Cloner::diagnostics()`] to suppress
//! them.

mod binary;
mod cloner;
mod diagnostics;
mod error;
mod graph;
mod object;
mod value;

pub use binary::*;
pub use cloner::*;
pub use diagnostics::Diagnostics;
pub use error::*;
pub(crate) use graph::*;
pub use object::*;
pub use value::*;
