//! Review-form core: compiles openEHR web templates into a question tree
//! and manages the comments reviewers attach to it.
//!
//! The pipeline is `webtemplate` (strict parse) -> [`compile`] (question
//! tree) -> [`index`] (flat rows) -> [`export`] (CSV), with [`cache`]
//! wrapping the compile step and [`comments`] providing the persistent
//! store. Compilation never fails outward; malformed templates become
//! sentinel compositions.

pub mod cache;
pub mod classify;
pub mod comments;
pub mod compile;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod index;
pub mod naming;
pub mod values;

pub use cache::QuestionnaireService;
pub use classify::{ContainerQuestion, LeafQuestion, QuestionNode};
pub use comments::{Comment, CommentStore};
pub use compile::{compile, Composition};
pub use config::CoreConfig;
pub use error::{ReviewError, ReviewResult};
pub use export::{export_rows, write_csv, ExportRow};
pub use index::{flatten, FlatQuestion};
pub use values::ValueStructure;
