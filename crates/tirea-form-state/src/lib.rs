//! Path-addressed JSON documents for schema-driven forms.
//!
//! `tirea-form-state` is the document layer underneath `tirea-form`: a JSON
//! value model that keeps object insertion order, string-segment paths, and
//! pure get/set/delete operations over them.
//!
//! # Core Concepts
//!
//! - **JsonValue**: the document tree
//! - **Path**: an ordered list of string segments, the key of every per-field map
//!
//! ```text
//! Doc' = doc.set(path, value)
//! ```
//!
//! Every operation returns a new document and leaves its input untouched.
//!
//! # Quick Start
//!
//! ```
//! use tirea_form_state::{path, JsonValue};
//! use serde_json::json;
//!
//! let doc = JsonValue::from(json!({"name": "counter"}));
//! let next = doc.set(&path!("tags", 0), "new".into()).unwrap();
//!
//! assert_eq!(serde_json::Value::from(next), json!({"name": "counter", "tags": ["new"]}));
//! assert!(doc.get(&path!("tags")).is_err()); // Original unchanged
//! ```

mod error;
mod path;
mod value;

pub use error::{value_type_name, FormStateError, FormStateResult};
pub use path::{seg_index, Path};
pub use value::JsonValue;
