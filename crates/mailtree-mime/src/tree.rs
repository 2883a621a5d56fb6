//! The parsed part tree.
//!
//! Parts live in an arena owned by [`MimeTree`] and refer to each other by
//! [`PartId`]. Parts are stored in document order (depth-first pre-order),
//! so the root is always the first entry.

use crate::decode::TransferEncoding;
use crate::error::Result;
use crate::header::Headers;
use std::io::BufRead;

/// Stable index of a part within its [`MimeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PartId(usize);

impl PartId {
    /// The root part.
    pub const ROOT: Self = Self(0);

    /// Position of the part in document order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One MIME body part.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Part {
    pub(crate) parent: Option<PartId>,
    pub(crate) first_child: Option<PartId>,
    pub(crate) next_sibling: Option<PartId>,
    pub(crate) header: Headers,
    pub(crate) content_type: String,
    pub(crate) disposition: String,
    pub(crate) file_name: String,
    pub(crate) content: Vec<u8>,
}

impl Part {
    fn new(parent: Option<PartId>, header: Headers, content_type: String) -> Self {
        Self {
            parent,
            first_child: None,
            next_sibling: None,
            header,
            content_type,
            disposition: String::new(),
            file_name: String::new(),
            content: Vec::new(),
        }
    }

    /// Header fields as they appeared in the message.
    #[must_use]
    pub const fn header(&self) -> &Headers {
        &self.header
    }

    /// Content-Type without parameters, e.g. `text/plain`.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Content-Disposition without parameters; empty if absent or invalid.
    #[must_use]
    pub fn disposition(&self) -> &str {
        &self.disposition
    }

    /// File name from the disposition or the type header; empty if none.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Decoded content; empty for multipart containers.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// A fully parsed message.
///
/// Built by [`parse`](crate::parse) and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MimeTree {
    parts: Vec<Part>,
}

impl MimeTree {
    /// Parses an in-memory message with default options.
    ///
    /// # Errors
    ///
    /// See [`parse`](crate::parse).
    pub fn parse(message: &[u8]) -> Result<Self> {
        crate::parse(message)
    }

    /// Parses a message from a reader with default options.
    ///
    /// # Errors
    ///
    /// See [`parse`](crate::parse).
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        crate::parse(reader)
    }

    pub(crate) fn with_root(header: Headers, content_type: String) -> Self {
        Self {
            parts: vec![Part::new(None, header, content_type)],
        }
    }

    /// Appends a part under `parent`, after `prev_sibling` if any.
    pub(crate) fn push_child(
        &mut self,
        parent: PartId,
        prev_sibling: Option<PartId>,
        header: Headers,
        content_type: String,
    ) -> PartId {
        let id = PartId(self.parts.len());
        self.parts
            .push(Part::new(Some(parent), header, content_type));
        match prev_sibling {
            Some(prev) => self.parts[prev.0].next_sibling = Some(id),
            None => self.parts[parent.0].first_child = Some(id),
        }
        id
    }

    pub(crate) fn part_mut(&mut self, id: PartId) -> &mut Part {
        &mut self.parts[id.0]
    }

    /// Returns the root part.
    #[must_use]
    pub fn root(&self) -> PartRef<'_> {
        PartRef {
            tree: self,
            id: PartId::ROOT,
        }
    }

    /// Returns the part with the given id, if it belongs to this tree.
    #[must_use]
    pub fn get(&self, id: PartId) -> Option<PartRef<'_>> {
        (id.0 < self.parts.len()).then_some(PartRef { tree: self, id })
    }

    /// Number of parts, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Iterates over all parts in document order.
    pub fn iter(&self) -> impl Iterator<Item = PartRef<'_>> {
        (0..self.parts.len()).map(move |i| PartRef {
            tree: self,
            id: PartId(i),
        })
    }

    /// Returns the first part, in document order, matching `predicate`.
    pub fn find<'a, P>(&'a self, mut predicate: P) -> Option<PartRef<'a>>
    where
        P: FnMut(&PartRef<'a>) -> bool,
    {
        self.iter().find(|part| predicate(part))
    }

    /// Returns all parts matching `predicate`, in document order.
    pub fn find_all<'a, P>(&'a self, mut predicate: P) -> Vec<PartRef<'a>>
    where
        P: FnMut(&PartRef<'a>) -> bool,
    {
        self.iter().filter(|part| predicate(part)).collect()
    }

    /// Returns all attachment parts.
    #[must_use]
    pub fn attachments(&self) -> Vec<PartRef<'_>> {
        self.find_all(PartRef::is_attachment)
    }

    /// Returns the first inline `text/plain` body as text.
    #[must_use]
    pub fn text_body(&self) -> Option<String> {
        self.inline_text("text/plain")
    }

    /// Returns the first inline `text/html` body as text.
    #[must_use]
    pub fn html_body(&self) -> Option<String> {
        self.inline_text("text/html")
    }

    fn inline_text(&self, content_type: &str) -> Option<String> {
        self.find(|part| {
            part.content_type() == content_type && part.is_leaf() && !part.is_attachment()
        })
        .map(|part| String::from_utf8_lossy(part.content()).into_owned())
    }
}

/// Cursor to one part of a [`MimeTree`], used for navigation.
#[derive(Debug, Clone, Copy)]
pub struct PartRef<'a> {
    tree: &'a MimeTree,
    id: PartId,
}

impl<'a> PartRef<'a> {
    fn at(&self, id: Option<PartId>) -> Option<Self> {
        id.map(|id| Self {
            tree: self.tree,
            id,
        })
    }

    /// Id of this part.
    #[must_use]
    pub const fn id(&self) -> PartId {
        self.id
    }

    /// The underlying part.
    #[must_use]
    pub fn part(&self) -> &'a Part {
        &self.tree.parts[self.id.0]
    }

    /// Parent of this part (`None` for the root).
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.at(self.part().parent)
    }

    /// First child of this part.
    #[must_use]
    pub fn first_child(&self) -> Option<Self> {
        self.at(self.part().first_child)
    }

    /// Next sibling of this part.
    #[must_use]
    pub fn next_sibling(&self) -> Option<Self> {
        self.at(self.part().next_sibling)
    }

    /// Iterates over the direct children in document order.
    #[must_use]
    pub fn children(&self) -> Children<'a> {
        Children {
            next: self.first_child(),
        }
    }

    /// Returns true if the part has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.part().first_child.is_none()
    }

    /// Number of ancestors; 0 for the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), PartRef::parent).count()
    }

    /// Header fields as they appeared in the message.
    #[must_use]
    pub fn header(&self) -> &'a Headers {
        &self.part().header
    }

    /// Content-Type without parameters.
    #[must_use]
    pub fn content_type(&self) -> &'a str {
        &self.part().content_type
    }

    /// Content-Disposition without parameters.
    #[must_use]
    pub fn disposition(&self) -> &'a str {
        &self.part().disposition
    }

    /// Resolved file name.
    #[must_use]
    pub fn file_name(&self) -> &'a str {
        &self.part().file_name
    }

    /// Decoded content.
    #[must_use]
    pub fn content(&self) -> &'a [u8] {
        &self.part().content
    }

    /// Transfer encoding the content was stored with before decoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        TransferEncoding::from_header(self.header())
    }

    /// Returns true for parts meant to be saved rather than displayed:
    /// an `attachment` disposition, or a file name without an `inline`
    /// disposition.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        let part = self.part();
        part.disposition == "attachment"
            || (!part.file_name.is_empty() && part.disposition != "inline")
    }
}

/// Iterator over the children of a part.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    next: Option<PartRef<'a>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = PartRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_sibling();
        Some(current)
    }
}
