//! The category tree.
//!
//! Categories come from a static JSON document read once at start-up. The
//! document maps category ids to nodes, and each node may carry its own
//! `children` map of the same shape:
//!
//! ```json
//! {
//!   "A": {
//!     "name": "Electronics",
//!     "attributes": ["brand"],
//!     "children": { "A1": { "name": "Phones" } }
//!   }
//! }
//! ```
//!
//! Ids are unique across the whole tree, not just among siblings. A
//! [`CategoryTree`] is an immutable value: build it once, wrap it in an
//! `Arc`, and hand out shared references.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Deepest nesting level accepted (roots are level 0).
pub const MAX_DEPTH: usize = 16;

/// Error building a [`CategoryTree`].
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("malformed category document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate category id: {0}")]
    DuplicateId(String),
    #[error("category {id} is nested deeper than {max} levels", max = MAX_DEPTH)]
    TooDeep { id: String },
}

/// A category node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub level: usize,
    /// Attribute-filter keys offered on this category's listing page.
    pub attributes: Vec<String>,
    /// Listings are services rather than physical goods.
    pub is_service: bool,
    /// Adult-only.
    pub only18: bool,
    /// Sellers must have completed identity verification.
    pub kyc: bool,
    /// Only company accounts may list here.
    pub only_company: bool,
    /// Direct children in document order.
    pub children: Vec<Arc<Self>>,
}

impl Category {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Denormalized row of the flattened tree, for list rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFlat {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub level: usize,
}

/// Immutable, fully indexed category tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryTree {
    by_id: HashMap<String, Arc<Category>>,
    roots: Vec<Arc<Category>>,
    flat: Vec<CategoryFlat>,
}

impl CategoryTree {
    /// Parse and index a category document.
    ///
    /// Building from the same document always yields an equal tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON of the expected
    /// shape, if an id appears twice anywhere in the tree, or if nesting
    /// exceeds [`MAX_DEPTH`].
    pub fn from_json(document: &str) -> Result<Self, CategoryError> {
        let nodes: OrderedNodes = serde_json::from_str(document)?;

        let mut builder = TreeBuilder::default();
        let mut roots = Vec::with_capacity(nodes.0.len());
        for (id, node) in nodes.0 {
            roots.push(builder.visit(id, node, None, 0)?);
        }

        Ok(Self {
            by_id: builder.by_id,
            roots,
            flat: builder.flat,
        })
    }

    /// Look up a category anywhere in the tree.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Category> {
        self.by_id.get(id).map(Arc::as_ref)
    }

    /// Top-level categories in document order.
    #[must_use]
    pub fn roots(&self) -> &[Arc<Category>] {
        &self.roots
    }

    /// Every category in pre-order walk order.
    #[must_use]
    pub fn flat(&self) -> &[CategoryFlat] {
        &self.flat
    }

    /// Attribute-filter keys for a category; empty for unknown ids.
    #[must_use]
    pub fn attributes(&self, id: &str) -> &[String] {
        self.get(id).map(|c| c.attributes.as_slice()).unwrap_or_default()
    }

    /// Category name, or `placeholder` when the id is unknown.
    #[must_use]
    pub fn name_or<'a>(&'a self, id: &str, placeholder: &'a str) -> &'a str {
        self.get(id).map_or(placeholder, |c| c.name.as_str())
    }

    /// Chain of categories from the root down to `id`, inclusive.
    ///
    /// Empty when `id` is unknown.
    #[must_use]
    pub fn path(&self, id: &str) -> Vec<&Category> {
        let mut path = Vec::new();
        let mut current = self.get(id);
        while let Some(category) = current {
            path.push(category);
            current = category.parent_id.as_deref().and_then(|p| self.get(p));
        }
        path.reverse();
        path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// =============================================================================
// Document decoding
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryNode {
    name: String,
    #[serde(default)]
    children: OrderedNodes,
    #[serde(default)]
    attributes: Vec<String>,
    #[serde(default)]
    is_service: bool,
    #[serde(default)]
    only18: bool,
    #[serde(default)]
    kyc: bool,
    #[serde(default)]
    only_company: bool,
}

/// A JSON object of category nodes, keeping document order.
#[derive(Debug, Default)]
struct OrderedNodes(Vec<(String, CategoryNode)>);

impl<'de> Deserialize<'de> for OrderedNodes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NodesVisitor;

        impl<'de> Visitor<'de> for NodesVisitor {
            type Value = OrderedNodes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category id to category")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut nodes = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((id, node)) = map.next_entry::<String, CategoryNode>()? {
                    nodes.push((id, node));
                }
                Ok(OrderedNodes(nodes))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(OrderedNodes::default())
            }
        }

        deserializer.deserialize_any(NodesVisitor)
    }
}

#[derive(Default)]
struct TreeBuilder {
    by_id: HashMap<String, Arc<Category>>,
    flat: Vec<CategoryFlat>,
}

impl TreeBuilder {
    fn visit(
        &mut self,
        id: String,
        node: CategoryNode,
        parent_id: Option<&str>,
        level: usize,
    ) -> Result<Arc<Category>, CategoryError> {
        if level >= MAX_DEPTH {
            return Err(CategoryError::TooDeep { id });
        }

        self.flat.push(CategoryFlat {
            id: id.clone(),
            name: node.name.clone(),
            parent_id: parent_id.map(str::to_owned),
            level,
        });

        let mut children = Vec::with_capacity(node.children.0.len());
        for (child_id, child) in node.children.0 {
            children.push(self.visit(child_id, child, Some(id.as_str()), level + 1)?);
        }

        let category = Arc::new(Category {
            id: id.clone(),
            name: node.name,
            parent_id: parent_id.map(str::to_owned),
            level,
            attributes: node.attributes,
            is_service: node.is_service,
            only18: node.only18,
            kyc: node.kyc,
            only_company: node.only_company,
            children,
        });

        match self.by_id.entry(id) {
            Entry::Occupied(entry) => Err(CategoryError::DuplicateId(entry.key().clone())),
            Entry::Vacant(entry) => Ok(Arc::clone(entry.insert(category))),
        }
    }
}
