//! Drives parsed speeches into a [`Sink`](sayit_store::Sink).
//!
//! One document is one transaction: its instance, sections, speakers and
//! speeches are written together or not at all. A batch keeps going past
//! documents that fail and reports them at the end.

pub mod document;
pub mod driver;
pub mod error;

pub use document::SourceDocument;
pub use driver::{markup, BatchReport, DocumentOutcome, Importer};
pub use error::{ImportError, Result};
