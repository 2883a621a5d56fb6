//! # mailtree-mime
//!
//! MIME message parsing into a navigable tree of decoded parts.
//!
//! ## Features
//!
//! - **Part tree**: Nested multiparts become a tree with parent, first-child
//!   and next-sibling links
//! - **Decoding**: Base64 (tolerant of junk bytes), Quoted-Printable, and
//!   charset conversion to UTF-8
//! - **Metadata**: Content type, disposition and file name resolved per
//!   part, including RFC 2047 and RFC 2231 encoded names
//! - **Hardened**: Bounded nesting depth, fail-closed on malformed structure
//!
//! ## Quick Start
//!
//! ```
//! use mailtree_mime::MimeTree;
//!
//! let raw = concat!(
//!     "Content-Type: multipart/mixed; boundary=\"b1\"\r\n",
//!     "\r\n",
//!     "--b1\r\n",
//!     "Content-Type: text/plain; charset=utf-8\r\n",
//!     "\r\n",
//!     "Hello, World!\r\n",
//!     "--b1\r\n",
//!     "Content-Type: application/octet-stream\r\n",
//!     "Content-Disposition: attachment; filename=\"data.bin\"\r\n",
//!     "Content-Transfer-Encoding: base64\r\n",
//!     "\r\n",
//!     "AAEC\r\n",
//!     "--b1--\r\n",
//! );
//!
//! let tree = MimeTree::parse(raw.as_bytes())?;
//! let text = tree.root().first_child().unwrap();
//! assert_eq!(text.content(), b"Hello, World!");
//!
//! let attachment = text.next_sibling().unwrap();
//! assert_eq!(attachment.file_name(), "data.bin");
//! assert_eq!(attachment.content(), &[0, 1, 2]);
//! # Ok::<(), mailtree_mime::Error>(())
//! ```
//!
//! ### Options and charsets
//!
//! ```ignore
//! use mailtree_mime::{EncodingRsRegistry, ParseOptions, parse_with};
//! use std::io::BufReader;
//!
//! let options = ParseOptions::builder().max_depth(8).build();
//! let file = BufReader::new(std::fs::File::open("message.eml")?);
//! let tree = parse_with(file, &options, &EncodingRsRegistry)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod charset;
mod cleaner;
mod decode;
mod error;
mod header;
mod media_type;
mod options;
mod parser;
mod splitter;
mod tree;

pub mod encoding;

pub use charset::{CharsetRegistry, EncodingRsRegistry};
pub use cleaner::{Base64Cleaner, is_base64_byte};
pub use decode::{TransferEncoding, decode_section};
pub use error::{Error, Result};
pub use header::Headers;
pub use media_type::MediaType;
pub use options::{DEFAULT_MAX_DEPTH, ParseOptions, ParseOptionsBuilder};
pub use parser::{parse, parse_with};
pub use splitter::{PartSplitter, RawPart, SplitError};
pub use tree::{Children, MimeTree, Part, PartId, PartRef};
