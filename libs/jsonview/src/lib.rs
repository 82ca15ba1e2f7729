//! JSON views - declarative index rows for arbitrary documents
//!
//! A view is a JSON pattern describing how to derive zero or more `(key, value)` rows
//! from a document. This crate parses those patterns and compiles them into index
//! functions an external engine can run once per document.
//!
//! # Pipeline
//!
//! ```text
//! ViewSpec JSON
//!      |
//!   Pattern parser -> Pattern tree
//!      |
//!   ViewCompiler -> IndexFunction (captures the tree)
//!      |
//! per document:
//!   PathResolver + ValueTransformer -> InterpretedValue per pattern
//!      |
//!   RowGenerator -> rows, in order, into an EmitSink
//! ```
//!
//! # Example
//!
//! ```rust
//! use jsonviews_engine::ViewCompiler;
//! use serde_json::json;
//!
//! let view = ViewCompiler::default()
//!     .compile_json(&json!({
//!         "key": ["user", { "access": "tags", "splay": true }, "description"]
//!     }))
//!     .unwrap();
//!
//! let rows = view.index.rows(&json!({
//!     "user": "x", "tags": ["a", "b"], "description": "d"
//! }));
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[0].key, json!(["x", "a", "d"]));
//! assert_eq!(rows[1].key, json!(["x", "b", "d"]));
//! ```

pub mod compiler;
pub mod error;
pub mod interpret;
pub mod path;
pub mod pattern;
pub mod rows;
mod temporal_parse;
pub mod transform;
pub mod value;

// Re-export main types
pub use compiler::{compile, CompileOptions, CompiledView, EmitSink, IndexFunction, ViewCompiler};
pub use error::{Error, Result};
pub use interpret::{interpret, Interpreter};
pub use pattern::{AccessPattern, KeyPattern, Pattern, PropertyPath, TransformKind, ViewSpec};
pub use rows::{generate, InterpretedKey, Row};
pub use transform::Timestamp;
pub use value::InterpretedValue;
