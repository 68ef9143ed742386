//! Calculator model catalog and token tables.
//!
//! These are the lookup tables the variable file codec consumes:
//!
//! - [`models`]: the catalog of calculator models, their header signatures,
//!   product ids and feature flags
//! - [`tokens`]: per-generation token vocabularies mapping token bytes to
//!   display text and back
//!
//! # Example
//!
//! ```
//! use tivar_standards::models::{BuiltinCatalog, ModelCatalog};
//! use tivar_standards::tokens::{BuiltinTokens, TokenSource};
//!
//! let model = BuiltinCatalog.find("TI-84+CE").unwrap();
//! let table = BuiltinTokens.table_for(model).unwrap();
//! assert_eq!(table.single(0xDE), Some("Disp "));
//! ```

pub mod embedded;
pub mod error;
pub mod models;
pub mod tokens;

pub use error::{Result, StandardsError};
pub use models::{BuiltinCatalog, Features, MODELS, Model, ModelCatalog, Signature, TokenSet};
pub use tokens::{BuiltinTokens, TokenSource, TokenTable};
