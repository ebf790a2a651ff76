//! Definition database
//!
//! Stores independent copies of the `definition` nodes found at the top
//! level of imported reports, indexed by their `defines` value.

use crate::config::ResolveConfig;
use crate::error::{DatabaseError, ResolveResult};
use crate::resolve::{Resolved, Resolver};
use indexmap::IndexMap;
use parking_lot::Mutex;
use reportxml_core::{Document, Node, NodeType};

/// Thread-safe store of definitions
///
/// The lock is held only for each import and each lookup, so lookups made
/// while a resolution is in flight may observe a concurrent import partway.
#[derive(Debug, Default)]
pub struct Database {
    index: Mutex<DefinitionIndex>,
}

#[derive(Debug, Default)]
struct DefinitionIndex {
    /// Entries per `defines` value, in insertion order
    keyed: IndexMap<String, Vec<Node>>,

    /// Definitions without `defines`; never returned by lookups
    unkeyed: Vec<Node>,
}

impl Database {
    /// Create an empty database
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Import every top-level definition of a report
    ///
    /// Each definition is deep-copied, so later changes to `doc` do not
    /// reach the database. Other root children are ignored. Returns the
    /// number of definitions stored.
    pub fn add_report(&self, doc: &Document) -> usize {
        let copies: Vec<(Option<String>, Node)> = doc
            .root()
            .children()
            .into_iter()
            .filter(|child| child.node_type() == NodeType::Definition)
            .map(|def| (def.attribute("defines"), def.deep_copy()))
            .collect();

        let count = copies.len();
        let mut index = self.index.lock();
        for (key, node) in copies {
            match key {
                Some(key) => {
                    tracing::debug!(defines = %key, "Imported definition");
                    index.keyed.entry(key).or_default().push(node);
                }
                None => {
                    tracing::debug!("Imported definition without defines attribute");
                    index.unkeyed.push(node);
                }
            }
        }

        count
    }

    /// Parse report XML and import its definitions
    ///
    /// # Errors
    /// Returns [`DatabaseError::Parse`] if the text is not a valid report;
    /// nothing is imported in that case.
    pub fn add_report_xml(&self, xml: &str) -> Result<usize, DatabaseError> {
        let doc = Document::from_xml_str(xml)?;
        Ok(self.add_report(&doc))
    }

    /// First definition stored under `id`
    ///
    /// The returned handle is shared with the database and must not be
    /// mutated.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<Node> {
        self.index
            .lock()
            .keyed
            .get(id)
            .and_then(|entries| entries.first().cloned())
    }

    /// Every definition stored under `id`, in insertion order
    #[must_use]
    pub fn find_all(&self, id: &str) -> Vec<Node> {
        self.index
            .lock()
            .keyed
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of stored definitions
    #[must_use]
    pub fn len(&self) -> usize {
        let index = self.index.lock();
        index.keyed.values().map(Vec::len).sum::<usize>() + index.unkeyed.len()
    }

    /// True if nothing has been imported
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct `defines` values, in first-import order
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.index.lock().keyed.keys().cloned().collect()
    }

    /// Resolver over this database with the default configuration
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self)
    }

    /// Resolver over this database with the given configuration
    #[inline]
    #[must_use]
    pub fn resolver_with_config(&self, config: ResolveConfig) -> Resolver<'_> {
        Resolver::with_config(self, config)
    }

    /// Shortcut for [`Resolver::build_node`] with the default configuration
    ///
    /// # Errors
    /// See [`Resolver::build_node`].
    pub fn build_node(&self, id: &str, depth: Option<u32>) -> ResolveResult<Resolved> {
        self.resolver().build_node(id, depth)
    }

    /// Shortcut for [`Resolver::build_report`] with the default configuration
    ///
    /// # Errors
    /// See [`Resolver::build_report`].
    pub fn build_report(&self, id: &str, depth: Option<u32>) -> ResolveResult<Document> {
        self.resolver().build_report(id, depth)
    }
}
