use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::{debug, info};

use super::codec::compression;
use super::format::registry::{Decoder, Registry};
use super::format::{directory, header, objects};
use super::image::ImageView;
use super::tree::{Node, NodeId, ObjectTree, Parent, Payload};
use super::types::error::{Result, Sm4Error};
use super::types::models::*;
use super::utils;

/// A fully decoded SM4 file.
///
/// Decoding is eager: by the time a constructor returns, every object reachable
/// from the root directory has been read.
#[derive(Debug, Clone)]
pub struct Sm4File {
    header: RootHeader,
    tree: ObjectTree,
    file_len: u64,
}

impl Sm4File {
    /// Read an SM4 file from the given path.
    ///
    /// # Errors
    /// Returns an error if:
    /// - File cannot be opened
    /// - A fixed-size record is cut short by the end of the file
    /// - A directory entry points past the end of the file
    /// - Directories loop back on themselves or nest implausibly deep
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening SM4 file: {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Decode an SM4 file from an open binary stream, using the standard decoders.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_reader_with_registry(reader, &Registry::standard())
    }

    /// Decode an SM4 file, selecting decoders through `registry`.
    pub fn from_reader_with_registry<R: Read + Seek>(mut reader: R, registry: &Registry) -> Result<Self> {
        let file_len = utils::stream_len(&mut reader)?;
        let header = header::parse(&mut reader)?;
        let entries = directory::read_entries(&mut reader, header.object_count)?;

        let mut decoding = Decoding {
            file: reader,
            registry,
            tree: ObjectTree::new(),
            file_len,
            path: Vec::new(),
        };
        let roots: Vec<NodeId> = entries
            .into_iter()
            .map(|entry| decoding.tree.push(entry, Parent::Root))
            .collect();
        for id in roots {
            decoding.read_object(id)?;
        }

        info!(
            "SM4 file decoded: {} pages, {} objects",
            header.page_count,
            decoding.tree.len()
        );

        Ok(Self {
            header,
            tree: decoding.tree,
            file_len,
        })
    }

    pub fn header(&self) -> &RootHeader {
        &self.header
    }

    /// The signature decoded as UTF-16LE, e.g. `"STiMage 005.004 1\0"`.
    pub fn signature(&self) -> String {
        self.header.signature_text()
    }

    pub fn page_count(&self) -> u32 {
        self.header.page_count
    }

    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    pub fn tree(&self) -> &ObjectTree {
        &self.tree
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.tree.node(id)
    }

    /// Immediate children of the root, in directory order.
    pub fn root_children(&self) -> &[NodeId] {
        self.tree.roots()
    }

    /// Every page of every page index array, in file order.
    pub fn pages(&self) -> Vec<PageView<'_>> {
        self.tree
            .find_all(ObjectType::PageIndexArray)
            .into_iter()
            .flat_map(move |array| {
                let count = self.tree.node(array).pages().map_or(0, <[Page]>::len);
                (0..count).map(move |index| PageView { file: self, array, index })
            })
            .collect()
    }

    /// The root PRM parameter block, inflated if its header marks it compressed.
    ///
    /// Returns `Ok(None)` when the file has no PRM object.
    pub fn prm_data(&self) -> Result<Option<Vec<u8>>> {
        let Some(payload) = self.root_of_type(ObjectType::Prm).and_then(Node::contents) else {
            return Ok(None);
        };
        let prm_header = self
            .root_of_type(ObjectType::PrmHeader)
            .and_then(Node::prm_header)
            .ok_or_else(|| Sm4Error::InvalidFormat("PRM object without a PRM header".to_string()))?;
        compression::decompress_prm(payload, prm_header).map(Some)
    }

    fn root_of_type(&self, object_type: ObjectType) -> Option<&Node> {
        self.tree
            .roots()
            .iter()
            .map(|&id| self.tree.node(id))
            .find(|node| node.entry.type_id == object_type.id())
    }
}

impl std::fmt::Display for Sm4File {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.tree)
    }
}

/// Objects nest at most four levels in real files
/// (page index header, array, page header, string data).
const MAX_DEPTH: usize = 8;

/// Depth-first decoding state shared by all objects of one file.
struct Decoding<'a, R> {
    file: R,
    registry: &'a Registry,
    tree: ObjectTree,
    file_len: u64,
    /// Entries of the objects currently being decoded, outermost first.
    path: Vec<DirectoryEntry>,
}

impl<R: Read + Seek> Decoding<'_, R> {
    /// Reads the payload of `id`, then recursively the payloads of the children it declares.
    ///
    /// Directories that point back at an enclosing object, nest deeper than
    /// [`MAX_DEPTH`], or declare more objects than the file has room for are
    /// rejected with [`Sm4Error::InvalidFormat`].
    fn read_object(&mut self, id: NodeId) -> Result<()> {
        let entry = self.tree.node(id).entry;
        if entry.end() > self.file_len {
            return Err(Sm4Error::OutOfBounds {
                type_id: entry.type_id,
                offset: entry.offset as u64,
                size: entry.size as u64,
                file_len: self.file_len,
            });
        }
        if self
            .path
            .iter()
            .any(|outer| outer.type_id == entry.type_id && outer.offset == entry.offset)
        {
            return Err(Sm4Error::InvalidFormat(format!(
                "Object of type {} @ {} lists itself as a descendant",
                entry.type_id, entry.offset
            )));
        }
        if self.path.len() >= MAX_DEPTH {
            return Err(Sm4Error::InvalidFormat(format!(
                "Object of type {} @ {} is nested more than {} levels deep",
                entry.type_id, entry.offset, MAX_DEPTH
            )));
        }
        // every node comes from a distinct 12-byte entry; more means shared subtrees
        if self.tree.len() as u64 * DirectoryEntry::SIZE as u64 > self.file_len {
            return Err(Sm4Error::InvalidFormat(format!(
                "Directories declare {} objects in a file of {} bytes",
                self.tree.len(),
                self.file_len
            )));
        }

        self.path.push(entry);
        self.decode_payload(id, entry)?;
        self.path.pop();
        Ok(())
    }

    fn decode_payload(&mut self, id: NodeId, entry: DirectoryEntry) -> Result<()> {
        let decoder = self.registry.resolve(entry.type_id);
        debug!(
            "Reading object type {} with {:?} @ {} x {}",
            entry.type_id, decoder, entry.offset, entry.size
        );

        match decoder {
            Decoder::PageIndexHeader => {
                let (header, entries) = objects::read_page_index_header(&mut self.file, &entry)?;
                self.tree.set_payload(id, Payload::PageIndexHeader(header));
                self.read_children(id, entries)?;
            }
            Decoder::PageIndexArray => {
                let page_count = self
                    .parent_node(id)
                    .and_then(Node::page_index_header)
                    .map(|h| h.page_count)
                    .ok_or_else(|| {
                        Sm4Error::InvalidFormat(format!(
                            "Page index array @ {} is not owned by a page index header",
                            entry.offset
                        ))
                    })?;
                let records = objects::read_pages(&mut self.file, &entry, page_count)?;

                let mut pages = Vec::with_capacity(records.len());
                let mut pending = Vec::new();
                for (index, (mut page, entries)) in records.into_iter().enumerate() {
                    for child in entries {
                        let child_id = self.tree.push(child, Parent::Page { array: id, index });
                        page.children.push(child_id);
                        pending.push(child_id);
                    }
                    pages.push(page);
                }
                self.tree.set_payload(id, Payload::PageIndexArray(pages));
                for child_id in pending {
                    self.read_object(child_id)?;
                }
            }
            Decoder::PageHeader => {
                let (header, entries) = objects::read_page_header(&mut self.file, &entry)?;
                self.tree.set_payload(id, Payload::PageHeader(header));
                self.read_children(id, entries)?;
            }
            Decoder::PageData => {
                let data_type = self.tree.owning_page(id).map(|page| page.data_type);
                let data = objects::read_page_data(&mut self.file, &entry, data_type)?;
                self.tree.set_payload(id, Payload::PageData(data));
            }
            Decoder::StringData => {
                let count = self
                    .parent_node(id)
                    .and_then(Node::page_header)
                    .map(|h| h.string_count)
                    .ok_or_else(|| {
                        Sm4Error::InvalidFormat(format!(
                            "String data @ {} is not owned by a page header",
                            entry.offset
                        ))
                    })?;
                let strings = objects::read_string_data(&mut self.file, &entry, count)?;
                self.tree.set_payload(id, Payload::StringData(strings));
            }
            Decoder::PrmHeader => {
                let header = objects::read_prm_header(&mut self.file, &entry)?;
                self.tree.set_payload(id, Payload::PrmHeader(header));
            }
            Decoder::ThumbnailHeader => {
                let header = objects::read_thumbnail_header(&mut self.file, &entry)?;
                self.tree.set_payload(id, Payload::ThumbnailHeader(header));
            }
            Decoder::Opaque => {
                let bytes = objects::read_opaque(&mut self.file, &entry)?;
                self.tree.set_payload(id, Payload::Opaque(bytes));
            }
        }
        Ok(())
    }

    fn read_children(&mut self, parent: NodeId, entries: Vec<DirectoryEntry>) -> Result<()> {
        let children: Vec<NodeId> = entries
            .into_iter()
            .map(|entry| self.tree.push(entry, Parent::Object(parent)))
            .collect();
        for child in children {
            self.read_object(child)?;
        }
        Ok(())
    }

    fn parent_node(&self, id: NodeId) -> Option<&Node> {
        match self.tree.node(id).parent {
            Parent::Object(parent) => Some(self.tree.node(parent)),
            Parent::Root | Parent::Page { .. } => None,
        }
    }
}

/// One page of the file together with the objects in its directory.
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    file: &'a Sm4File,
    array: NodeId,
    index: usize,
}

impl<'a> PageView<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn page(&self) -> &'a Page {
        let pages = self.file.tree.node(self.array).pages().unwrap_or(&[]);
        &pages[self.index]
    }

    pub fn children(&self) -> &'a [NodeId] {
        &self.page().children
    }

    /// The first object of `object_type` in the page's directory.
    pub fn child(&self, object_type: ObjectType) -> Option<&'a Node> {
        let tree = &self.file.tree;
        self.children()
            .iter()
            .map(|&id| tree.node(id))
            .find(|node| node.entry.type_id == object_type.id())
    }

    pub fn header_node(&self) -> Option<&'a Node> {
        self.child(ObjectType::PageHeader)
    }

    pub fn header(&self) -> Option<&'a PageHeader> {
        self.header_node().and_then(Node::page_header)
    }

    /// Image samples, `None` for pages whose data type is not decoded.
    pub fn data(&self) -> Option<&'a [i32]> {
        self.child(ObjectType::PageData).and_then(Node::page_data)
    }

    /// The string data object listed under the page header.
    pub fn strings(&self) -> Option<&'a StringData> {
        let tree = &self.file.tree;
        let header = self.header_node()?;
        header
            .children
            .iter()
            .map(|&id| tree.node(id))
            .find_map(Node::string_data)
    }

    pub fn thumbnail_header(&self) -> Option<&'a ThumbnailHeader> {
        self.child(ObjectType::ThumbnailHeader).and_then(Node::thumbnail_header)
    }

    /// Two-dimensional view over the image samples, shaped by the page header.
    pub fn image(&self) -> Result<ImageView<'a>> {
        let header = self
            .header()
            .ok_or_else(|| Sm4Error::InvalidFormat(format!("Page {} has no page header", self.index)))?;
        let data = self.data().ok_or_else(|| {
            Sm4Error::InvalidFormat(format!(
                "Page {} holds no image data ({})",
                self.index,
                self.page().data_type.name()
            ))
        })?;
        ImageView::new(data, header)
    }
}
