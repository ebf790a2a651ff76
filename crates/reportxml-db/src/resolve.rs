//! Definition resolution
//!
//! Expands a definition id into a concrete subtree by following `template`
//! inheritance and inlining `definition` references found on children.
//!
//! Every step that can take part in a cycle spends one unit of the depth
//! budget. A budget of zero fails, so resolution terminates even over cyclic
//! definitions. References that cannot be resolved are kept as literal
//! copies; only a failure of the outermost id is reported.

use crate::config::ResolveConfig;
use crate::database::Database;
use crate::error::{ResolveError, ResolveResult};
use reportxml_core::{Document, Node, NodeType, DEFINITION_ATTR, PRIVATE_DEFINITION_ATTR};

/// An expanded definition
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Fresh `definition` node holding the expanded children
    pub node: Node,

    /// Type shared by every direct child, when there is exactly one
    pub uniform_type: Option<NodeType>,
}

/// Resolves definition ids against a [`Database`]
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'db> {
    db: &'db Database,
    config: ResolveConfig,
}

impl<'db> Resolver<'db> {
    /// Create a resolver with the default configuration
    #[inline]
    #[must_use]
    pub fn new(db: &'db Database) -> Self {
        Self::with_config(db, ResolveConfig::default())
    }

    /// Create a resolver with the given configuration
    #[inline]
    #[must_use]
    pub fn with_config(db: &'db Database, config: ResolveConfig) -> Self {
        Self { db, config }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// Expand `id` into a fresh `definition` node
    ///
    /// `depth` of `None` uses the configured default budget. When all
    /// resulting children share one type, each is stamped with the private
    /// provenance marker set to `id`.
    ///
    /// # Errors
    /// - [`ResolveError::DepthExhausted`] if the budget is zero
    /// - [`ResolveError::NotFound`] if `id` or its template chain is missing
    /// - [`ResolveError::Schema`] if the expansion does not fit the schema
    pub fn build_node(&self, id: &str, depth: Option<u32>) -> ResolveResult<Resolved> {
        self.resolve(id, self.config.depth(depth))
    }

    fn resolve(&self, id: &str, depth: u32) -> ResolveResult<Resolved> {
        if depth == 0 {
            return Err(ResolveError::DepthExhausted { id: id.to_string() });
        }

        let found = self
            .db
            .find(id)
            .ok_or_else(|| ResolveError::NotFound { id: id.to_string() })?;
        tracing::trace!(id, depth, "Resolving definition");

        let basis = match found.attribute("template") {
            Some(template) => self.resolve(&template, depth - 1)?.node.deep_copy(),
            None => Node::new(NodeType::Definition)?,
        };

        // same budget here; the decrement happens when a reference is followed
        for child in found.children() {
            self.attach_resolved_child(&basis, &child, depth)?;
        }

        let uniform_type = uniform_child_type(&basis);
        if uniform_type.is_some() {
            for child in basis.children() {
                child.set_attribute(PRIVATE_DEFINITION_ATTR, id)?;
            }
        }

        Ok(Resolved {
            node: basis,
            uniform_type,
        })
    }

    /// Attach an expanded copy of `child` under `parent`
    ///
    /// If `child` references a definition that resolves within `depth - 1`,
    /// the resolved children are spliced in place of `child`. Otherwise a
    /// copy of `child` is attached whose own children are expanded the same
    /// way with one less unit of budget.
    ///
    /// # Errors
    /// Returns [`ResolveError::Schema`] if an expanded node is not permitted
    /// under its new parent.
    pub fn attach_resolved_child(
        &self,
        parent: &Node,
        child: &Node,
        depth: u32,
    ) -> ResolveResult<()> {
        if let Some(resolved) = self.follow_reference(child, depth) {
            for grandchild in resolved.node.children() {
                self.attach_resolved_child(parent, &grandchild, depth - 1)?;
            }
            return Ok(());
        }

        let copy = self.copy_expanded(child, depth.saturating_sub(1))?;
        parent.add_child(&copy)?;
        Ok(())
    }

    fn follow_reference(&self, child: &Node, depth: u32) -> Option<Resolved> {
        if depth < 2 {
            return None;
        }

        let reference = child.attribute(DEFINITION_ATTR)?;
        match self.resolve(&reference, depth - 1) {
            Ok(resolved) => Some(resolved),
            Err(err) => {
                tracing::debug!(
                    definition = %reference,
                    error = %err,
                    "Keeping unresolved reference as a literal copy"
                );
                None
            }
        }
    }

    fn copy_expanded(&self, node: &Node, depth: u32) -> ResolveResult<Node> {
        if depth == 0 {
            return Ok(node.deep_copy());
        }

        let copy = node.shallow_copy();
        for child in node.children() {
            self.attach_resolved_child(&copy, &child, depth)?;
        }
        Ok(copy)
    }

    /// Resolve `id` and assemble a report from it
    ///
    /// A definition made of incidents becomes a report holding those
    /// incidents. A definition made of states becomes a report with one
    /// incident holding those states. Children of the classified type get a
    /// public `definition` attribute set to `id`. An empty expansion yields
    /// an empty report.
    ///
    /// # Errors
    /// - Any error from [`Resolver::build_node`]
    /// - [`ResolveError::Unsupported`] if the expansion is neither incidents
    ///   nor states
    pub fn build_report(&self, id: &str, depth: Option<u32>) -> ResolveResult<Document> {
        let Resolved { node, uniform_type } = self.build_node(id, depth)?;
        let children = node.children();

        let Some(first) = children.first() else {
            tracing::debug!(id, "Definition expands to nothing, returning empty report");
            return Ok(Document::new());
        };
        let classified = uniform_type.unwrap_or_else(|| first.node_type());

        let doc = Document::new();
        let attach_to = match classified {
            NodeType::Incident => doc.root().clone(),
            NodeType::State => {
                let incident = Node::new(NodeType::Incident)?;
                doc.root().add_child(&incident)?;
                incident
            }
            found => {
                return Err(ResolveError::Unsupported {
                    id: id.to_string(),
                    found,
                })
            }
        };

        for child in children {
            if child.node_type() == classified {
                child.set_attribute(DEFINITION_ATTR, id)?;
            }
            attach_to.add_child(&child)?;
        }

        tracing::debug!(id, kind = %classified, "Built report from definition");
        Ok(doc)
    }
}

/// The single type shared by all children, `None` if mixed or empty
fn uniform_child_type(node: &Node) -> Option<NodeType> {
    let children = node.children();
    let first = children.first()?.node_type();
    children
        .iter()
        .all(|child| child.node_type() == first)
        .then_some(first)
}
