//! MIME document parsing.

use crate::charset::{CharsetRegistry, EncodingRsRegistry};
use crate::decode::{TransferEncoding, decode_section};
use crate::encoding::decode_rfc2047;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::media_type::MediaType;
use crate::options::ParseOptions;
use crate::splitter::{PartSplitter, RawPart, SplitError};
use crate::tree::{MimeTree, PartId};
use std::io::BufRead;
use tracing::{debug, trace, warn};

/// Reads a MIME document and parses it into a tree of parts, using default
/// options and the `encoding_rs` charset registry.
///
/// # Errors
///
/// Returns the first error met anywhere in the document; see
/// [`parse_with`].
pub fn parse<R: BufRead>(reader: R) -> Result<MimeTree> {
    parse_with(reader, &ParseOptions::default(), &EncodingRsRegistry)
}

/// Reads a MIME document and parses it into a tree of parts.
///
/// The top-level header must carry a valid `Content-Type`. A `multipart/*`
/// message is split recursively at its boundaries; anything else is decoded
/// as the root's own content.
///
/// # Errors
///
/// Returns an error if a header block or media type is malformed, if a
/// multipart lacks its boundary, if a sub-part has no `Content-Type`, if
/// nesting exceeds `options.max_depth`, if a body cannot be decoded or if
/// reading fails.
pub fn parse_with<R: BufRead>(
    mut reader: R,
    options: &ParseOptions,
    charsets: &dyn CharsetRegistry,
) -> Result<MimeTree> {
    let header = Headers::read_from(&mut reader)?;
    let media_type = MediaType::parse(header.get("Content-Type").unwrap_or_default())?;
    let encoding = TransferEncoding::from_header(&header);
    let charset = resolve_charset(&media_type, &header);

    let mut tree = MimeTree::with_root(header, media_type.essence().to_string());
    debug!(content_type = media_type.essence(), "parsing message");

    if media_type.is_multipart() {
        let boundary = media_type
            .boundary()
            .filter(|boundary| !boundary.is_empty())
            .ok_or(Error::MissingBoundary)?;
        let mut body = Vec::new();
        reader.read_to_end(&mut body)?;
        TreeBuilder {
            tree: &mut tree,
            options,
            charsets,
        }
        .build_children(PartId::ROOT, &body, boundary, 1)?;
    } else {
        let content = decode_section(encoding, charset.as_deref(), reader, charsets)?;
        tree.part_mut(PartId::ROOT).content = content;
    }

    debug!(parts = tree.len(), "parsed message");
    Ok(tree)
}

/// Charset parameter of the type, else a `charset` field left by
/// [`repair_content_type_params`].
fn resolve_charset(media_type: &MediaType, header: &Headers) -> Option<String> {
    media_type
        .charset()
        .or_else(|| header.get("charset"))
        .map(str::to_string)
}

/// Copies `Content-Type` parameters into fields of their own.
///
/// Some producers emit parameters that end up only reachable as separate
/// fields; every `; `-separated segment after the type that contains `=` is
/// set as a field named by its left-hand side.
fn repair_content_type_params(headers: &mut Headers) {
    let Some(value) = headers.get("Content-Type") else {
        return;
    };
    let params: Vec<(String, String)> = value
        .split("; ")
        .skip(1)
        .filter_map(|segment| segment.split_once('='))
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    for (name, value) in params {
        trace!(%name, %value, "copying Content-Type parameter into header");
        headers.set(name, value);
    }
}

struct TreeBuilder<'a> {
    tree: &'a mut MimeTree,
    options: &'a ParseOptions,
    charsets: &'a dyn CharsetRegistry,
}

impl TreeBuilder<'_> {
    /// Splits `body` at `boundary` and attaches the sub-parts to `parent`,
    /// recursing into nested multiparts.
    fn build_children(
        &mut self,
        parent: PartId,
        body: &[u8],
        boundary: &str,
        depth: usize,
    ) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(Error::DepthExceeded {
                depth,
                limit: self.options.max_depth,
            });
        }

        let boundary_error = |err: SplitError| Error::Boundary {
            boundary: boundary.to_string(),
            reason: err.to_string(),
        };

        let mut splitter = PartSplitter::new(body, boundary);
        let mut prev_sibling: Option<PartId> = None;

        while let Some(RawPart { mut headers, body }) =
            splitter.next_part().map_err(boundary_error)?
        {
            if headers.is_empty() {
                // Usually a last part that ends in "--boundary" instead of
                // "--boundary--". Accepted only at the end of input.
                match splitter.next_part() {
                    Ok(None) | Err(SplitError::UnexpectedEof) => {
                        warn!(boundary, "multipart not closed, treating input end as close");
                        break;
                    }
                    Ok(Some(_)) => {
                        return Err(Error::EmptyHeader {
                            boundary: boundary.to_string(),
                        });
                    }
                    Err(err) => return Err(boundary_error(err)),
                }
            }

            repair_content_type_params(&mut headers);

            let content_type = headers
                .get("Content-Type")
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::MissingContentType {
                    boundary: boundary.to_string(),
                })?;
            let media_type = MediaType::parse(content_type)?;

            let (disposition, mut file_name) = self.resolve_disposition(&headers);
            if file_name.is_empty()
                && let Some(name) = media_type.param("name").filter(|name| !name.is_empty())
            {
                file_name = decode_rfc2047(name, self.charsets);
            }
            let encoding = TransferEncoding::from_header(&headers);
            let charset = resolve_charset(&media_type, &headers);

            let id = self.tree.push_child(
                parent,
                prev_sibling,
                headers,
                media_type.essence().to_string(),
            );
            prev_sibling = Some(id);
            debug!(
                content_type = media_type.essence(),
                %disposition,
                %file_name,
                depth,
                "part"
            );
            let part = self.tree.part_mut(id);
            part.disposition = disposition;
            part.file_name = file_name;

            match media_type.boundary().filter(|nested| !nested.is_empty()) {
                Some(nested) => self.build_children(id, body, nested, depth + 1)?,
                None => {
                    let content = decode_section(encoding, charset.as_deref(), body, self.charsets)?;
                    self.tree.part_mut(id).content = content;
                }
            }
        }

        Ok(())
    }

    /// Returns the disposition and its decoded file name, both empty when
    /// the header is absent or does not parse.
    fn resolve_disposition(&self, headers: &Headers) -> (String, String) {
        let Some(value) = headers.get("Content-Disposition") else {
            return (String::new(), String::new());
        };
        match MediaType::parse(value) {
            Ok(disposition) => {
                let file_name = disposition
                    .param("filename")
                    .map(|name| decode_rfc2047(name, self.charsets))
                    .unwrap_or_default();
                (disposition.essence, file_name)
            }
            Err(err) => {
                debug!(%err, "ignoring Content-Disposition");
                (String::new(), String::new())
            }
        }
    }
}
