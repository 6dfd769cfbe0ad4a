//! Index-based arena holding the decoded object tree.
//!
//! Nodes are stored in a single vector and reference each other by [`NodeId`].
//! Each node is owned by the tree; the parent link is a plain index used only to
//! read the parent's fields while decoding.

use std::fmt;

use crate::sm4::types::models::*;

/// Index of a node inside an [`ObjectTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a node's directory entry was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// The root directory following the file header.
    Root,
    /// The child directory of another object.
    Object(NodeId),
    /// The directory following page `index` inside a page index array.
    Page { array: NodeId, index: usize },
}

/// Decoded contents of an object.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    PageIndexHeader(PageIndexHeader),
    PageIndexArray(Vec<Page>),
    PageHeader(PageHeader),
    /// Samples of an image page; `None` for data types that are not decoded.
    PageData(Option<Vec<i32>>),
    StringData(StringData),
    PrmHeader(PrmHeader),
    ThumbnailHeader(ThumbnailHeader),
    /// Raw bytes of an object without a registered decoder.
    Opaque(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub entry: DirectoryEntry,
    pub parent: Parent,
    pub children: Vec<NodeId>,
    /// `None` until the object's payload has been read.
    pub payload: Option<Payload>,
}

impl Node {
    pub fn object_type(&self) -> Option<ObjectType> {
        self.entry.object_type()
    }

    /// Human-readable type name, empty for ids outside the enumeration.
    pub fn name(&self) -> &'static str {
        self.object_type().map(ObjectType::name).unwrap_or("")
    }

    pub fn is_materialized(&self) -> bool {
        self.payload.is_some()
    }

    pub fn page_index_header(&self) -> Option<&PageIndexHeader> {
        match &self.payload {
            Some(Payload::PageIndexHeader(h)) => Some(h),
            _ => None,
        }
    }

    pub fn pages(&self) -> Option<&[Page]> {
        match &self.payload {
            Some(Payload::PageIndexArray(pages)) => Some(pages),
            _ => None,
        }
    }

    pub fn page_header(&self) -> Option<&PageHeader> {
        match &self.payload {
            Some(Payload::PageHeader(h)) => Some(h),
            _ => None,
        }
    }

    pub fn page_data(&self) -> Option<&[i32]> {
        match &self.payload {
            Some(Payload::PageData(Some(data))) => Some(data),
            _ => None,
        }
    }

    pub fn string_data(&self) -> Option<&StringData> {
        match &self.payload {
            Some(Payload::StringData(s)) => Some(s),
            _ => None,
        }
    }

    pub fn prm_header(&self) -> Option<&PrmHeader> {
        match &self.payload {
            Some(Payload::PrmHeader(h)) => Some(h),
            _ => None,
        }
    }

    pub fn thumbnail_header(&self) -> Option<&ThumbnailHeader> {
        match &self.payload {
            Some(Payload::ThumbnailHeader(h)) => Some(h),
            _ => None,
        }
    }

    /// Raw bytes of an opaque object.
    pub fn contents(&self) -> Option<&[u8]> {
        match &self.payload {
            Some(Payload::Opaque(bytes)) => Some(bytes),
            _ => None,
        }
    }
}

/// The decoded object tree of one SM4 file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl ObjectTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a directory-only node and links it into its parent's child list.
    pub(crate) fn push(&mut self, entry: DirectoryEntry, parent: Parent) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            entry,
            parent,
            children: Vec::new(),
            payload: None,
        });
        match parent {
            Parent::Root => self.roots.push(id),
            Parent::Object(p) => self.nodes[p.0].children.push(id),
            // Page children are recorded on the page itself by the array decoder.
            Parent::Page { .. } => {}
        }
        id
    }

    pub(crate) fn set_payload(&mut self, id: NodeId, payload: Payload) {
        self.nodes[id.0].payload = Some(payload);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Panics if `id` does not come from this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// The page record a node belongs to, if its directory follows a page.
    pub fn owning_page(&self, id: NodeId) -> Option<&Page> {
        match self.node(id).parent {
            Parent::Page { array, index } => self.node(array).pages()?.get(index),
            _ => None,
        }
    }

    /// All nodes in depth-first pre-order, descending through page records.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            let node = self.node(id);
            let mut next: Vec<NodeId> = node.children.clone();
            if let Some(pages) = node.pages() {
                next.extend(pages.iter().flat_map(|p| p.children.iter().copied()));
            }
            stack.extend(next.into_iter().rev());
        }
        order.into_iter().map(move |id| (id, self.node(id)))
    }

    pub fn find_all(&self, object_type: ObjectType) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.entry.type_id == object_type.id())
            .map(|(id, _)| id)
            .collect()
    }

    fn fmt_node(&self, f: &mut fmt::Formatter, id: NodeId, depth: usize) -> fmt::Result {
        let node = self.node(id);
        let indent = "  ".repeat(depth);
        let entry = node.entry;
        match node.object_type() {
            Some(t) if node.is_materialized() && !matches!(node.payload, Some(Payload::Opaque(_))) => {
                writeln!(f, "{}{} @ {} x {}", indent, t, entry.offset, entry.size)?
            }
            _ => writeln!(
                f,
                "{}Object of type {} @ {} x {}",
                indent, entry.type_id, entry.offset, entry.size
            )?,
        }
        match &node.payload {
            Some(Payload::PageIndexArray(pages)) => {
                for (i, page) in pages.iter().enumerate() {
                    writeln!(
                        f,
                        "{}  Page {}: {}, {}",
                        indent,
                        i,
                        page.data_type.name(),
                        page.source_type.name()
                    )?;
                    for &child in &page.children {
                        self.fmt_node(f, child, depth + 2)?;
                    }
                }
            }
            Some(Payload::PageHeader(h)) => {
                writeln!(f, "{}  {} x {} pixels, {:?}", indent, h.x_size, h.y_size, h.page)?
            }
            Some(Payload::StringData(s)) => {
                for text in &s.strings {
                    writeln!(f, "{}  {:?}", indent, text)?;
                }
            }
            Some(Payload::PageData(Some(data))) => {
                writeln!(f, "{}  {} samples", indent, data.len())?
            }
            Some(Payload::PrmHeader(h)) => writeln!(
                f,
                "{}  compression={}, original={}, compressed={}",
                indent, h.compression, h.original_size, h.compressed_size
            )?,
            Some(Payload::ThumbnailHeader(h)) => {
                writeln!(f, "{}  {} x {}, format {}", indent, h.width, h.height, h.format)?
            }
            _ => {}
        }
        for &child in &node.children {
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ObjectTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &root in &self.roots {
            self.fmt_node(f, root, 0)?;
        }
        Ok(())
    }
}
