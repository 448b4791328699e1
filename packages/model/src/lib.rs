//! # Quillpad Model
//!
//! The content tree every editing component operates on.
//!
//! ```text
//! Document
//!  └─ Block (p | h1..h3 | div)
//!      └─ Inline (text | b/i/u/span/a | br | embed)
//!                                          ├─ Image
//!                                          └─ Table → Row → Cell → Block …
//! ```
//!
//! The model is presentation-free. [`Serializer`] renders it to markup for
//! export and preview; nothing ever parses markup back into the model.

pub mod document;
pub mod error;
pub mod id_generator;
pub mod node;
pub mod serializer;

pub use document::{Document, NodeRef, Slot};
pub use error::{ModelError, ModelResult};
pub use id_generator::IdGenerator;
pub use node::*;
pub use serializer::{escape, serialize, Serializer};
