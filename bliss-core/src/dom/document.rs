//! Documents create elements and upgrade them through the registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use super::Node;
use crate::component::Component;
use crate::error::{BlissError, ConfigurationError, Result};
use crate::registry::Registry;

static DOCUMENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

struct DocumentInner {
    id: u64,
    registry: Arc<Registry>,
    body: Node,
}

/// A document: a connected `body` root plus the registry used to upgrade
/// elements it creates.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

impl Document {
    pub fn new(registry: Arc<Registry>) -> Self {
        let id = DOCUMENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let body = Node::new("body", None, id);
        body.mark_connected();
        Self {
            inner: Arc::new(DocumentInner { id, registry, body }),
        }
    }

    /// The connected root element.
    pub fn body(&self) -> Node {
        self.inner.body.clone()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    /// Create an element. Defined autonomous tags are constructed as
    /// components right away; everything else is a plain element.
    pub fn create_element(&self, tag: &str) -> Result<Node> {
        let node = Node::new(tag, None, self.inner.id);
        match self.inner.registry.get(node.local_name()) {
            Some(ty) if ty.extends().is_none() => {
                Component::construct(ty, &node)?;
            }
            Some(ty) => {
                debug!(
                    tag = node.local_name(),
                    extends = ?ty.extends(),
                    "customized built-in requested by name, left unupgraded"
                );
            }
            None => {}
        }
        Ok(node)
    }

    /// Create a customized built-in: a `local_name` element upgraded with
    /// the component defined as `is`.
    pub fn create_element_is(&self, local_name: &str, is: &str) -> Result<Node> {
        let ty = self
            .inner
            .registry
            .get(is)
            .ok_or_else(|| BlissError::NotDefined(is.to_owned()))?;
        let local_name = local_name.to_ascii_lowercase();
        if ty.extends() != Some(local_name.as_str()) {
            return Err(ConfigurationError::ExtendsMismatch {
                name: is.to_owned(),
                expected: ty.extends().unwrap_or("HTMLElement").to_owned(),
                found: local_name,
            }
            .into());
        }

        let node = Node::new(&local_name, Some(is), self.inner.id);
        Component::construct(ty, &node)?;
        Ok(node)
    }

    /// Move `node` into this document.
    ///
    /// The node is detached from its parent first; if it came from another
    /// document every component in the subtree then receives `adopted`.
    pub fn adopt_node(&self, node: &Node) -> Result<()> {
        node.remove()?;
        if node.owner_document() == self.inner.id {
            return Ok(());
        }

        let subtree = node.descendants_inclusive();
        for descendant in &subtree {
            descendant.set_owner_document(self.inner.id);
        }

        let mut first_error = None;
        for descendant in subtree {
            if let Some(component) = descendant.component() {
                if let Err(err) = component.adopted() {
                    warn!(tag = component.tag_name(), %err, "adopted callback failed");
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").field("id", &self.inner.id).finish()
    }
}
