//! Report XML Definition Database
//!
//! Reusable definitions and their expansion into concrete reports.
//!
//! # Overview
//!
//! - **Database**: thread-safe store of `definition` nodes keyed by `defines`
//! - **Resolver**: depth-bounded expansion of templates and references
//! - **ResolveConfig**: default depth budget
//!
//! # Example
//!
//! ```rust
//! use reportxml_db::Database;
//!
//! let db = Database::new();
//! db.add_report_xml(
//!     r#"<report><definition defines="d1"><state><text>ok</text></state></definition></report>"#,
//! )
//! .unwrap();
//!
//! let report = db.build_report("d1", None).unwrap();
//! let xml = report.to_xml_string().unwrap();
//! assert!(xml.contains(r#"<incident><state definition="d1"><text>ok</text></state></incident>"#));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod database;
pub mod error;
pub mod resolve;

// Re-exports
pub use config::ResolveConfig;
pub use database::Database;
pub use error::{DatabaseError, ResolveError, ResolveResult};
pub use resolve::{Resolved, Resolver};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for definition resolution
    pub use crate::{Database, ResolveConfig, ResolveError, ResolveResult, Resolved, Resolver};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
