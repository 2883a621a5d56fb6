//! Plain-text rendering of a part tree.

use std::io::{self, Write};

use mailtree_mime::{MimeTree, PartRef, TransferEncoding};

/// Writes one line per part, indented by depth, optionally followed by the
/// decoded text of text leaves.
pub fn render_tree(tree: &MimeTree, show_content: bool, out: &mut impl Write) -> io::Result<()> {
    for part in tree.iter() {
        let indent = "  ".repeat(part.depth());
        writeln!(out, "{indent}{}", describe(&part))?;

        if show_content && part.is_leaf() && part.content_type().starts_with("text/") {
            let text = String::from_utf8_lossy(part.content());
            for line in text.lines() {
                writeln!(out, "{indent}  | {line}")?;
            }
        }
    }
    Ok(())
}

fn describe(part: &PartRef<'_>) -> String {
    let mut line = part.content_type().to_string();
    if !part.disposition().is_empty() {
        line.push_str(" [");
        line.push_str(part.disposition());
        line.push(']');
    }
    if !part.file_name().is_empty() {
        line.push_str(" \"");
        line.push_str(part.file_name());
        line.push('"');
    }
    if part.is_leaf() {
        let size = part.content().len();
        match part.transfer_encoding() {
            TransferEncoding::SevenBit => line.push_str(&format!(" ({size} bytes)")),
            encoding => line.push_str(&format!(" ({encoding}, {size} bytes)")),
        }
    }
    line
}
