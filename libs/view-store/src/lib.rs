//! Design-document management for JSON index views
//!
//! Views are persisted as declarative pattern definitions inside `_design/<group>`
//! documents of an external document store:
//!
//! ```json
//! {
//!   "_id": "_design/blog",
//!   "_rev": "2-8f14e45fceea467a9b1a6c2d1f3b0e7c",
//!   "views": {
//!     "by_tag": {
//!       "map": { "key": [{ "access": "tags", "splay": true }, "createdAt"] },
//!       "reduce": "_count"
//!     }
//!   }
//! }
//! ```
//!
//! [`ViewManager`] implements add/put/remove on top of any [`DocumentStore`];
//! [`MemoryStore`] and [`JsonFileStore`] are bundled backends.

pub mod error;
pub mod file;
pub mod manager;
pub mod memory;
pub mod models;
mod revision;
pub mod traits;

pub use error::{Result, StoreError, ViewError};
pub use file::JsonFileStore;
pub use manager::{PutOutcome, ViewManager};
pub use memory::MemoryStore;
pub use models::{design_doc_id, DesignDocument, ViewDefinition};
pub use traits::DocumentStore;
