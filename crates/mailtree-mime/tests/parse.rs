//! Integration tests for message parsing.
//!
//! Messages are built inline so each test shows the exact bytes it feeds
//! the parser.

#![allow(clippy::unwrap_used)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::{self, BufReader, Read};
use mailtree_mime::{
    CharsetRegistry, EncodingRsRegistry, Error, MimeTree, ParseOptions, parse, parse_with,
};

fn multipart(boundary: &str, parts: &[&str], closed: bool) -> String {
    let mut message = format!(
        "From: sender@example.com\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\
         \r\n\
         This is a multi-part message in MIME format.\r\n"
    );
    for part in parts {
        message.push_str(&format!("--{boundary}\r\n{part}\r\n"));
    }
    if closed {
        message.push_str(&format!("--{boundary}--\r\n"));
    } else {
        message.push_str(&format!("--{boundary}\r\n"));
    }
    message
}

#[test]
fn base64_utf8_leaf_round_trips() {
    let plain = "Ünïcödé plaintext, with ✓ marks";
    let encoded = STANDARD.encode(plain);
    let message = format!(
        "Content-Type: text/plain; charset=utf-8\r\n\
         Content-Transfer-Encoding: base64\r\n\
         \r\n\
         {encoded}\r\n"
    );

    let tree = MimeTree::parse(message.as_bytes()).unwrap();
    assert_eq!(tree.root().content(), plain.as_bytes());
}

#[test]
fn quoted_printable_leaf() {
    let part = "Content-Type: text/plain\r\n\
                Content-Transfer-Encoding: quoted-printable\r\n\
                \r\n\
                Hello=20World=0A";
    let message = multipart("qp", &[part], true);

    let tree = MimeTree::parse(message.as_bytes()).unwrap();
    let leaf = tree.root().first_child().unwrap();
    assert_eq!(leaf.content(), b"Hello World\n");
}

#[test]
fn base64_junk_is_cleaned() {
    let payload = STANDARD.encode(b"binary \x00\x01\x02 payload, long enough to wrap");
    let (head, tail) = payload.split_at(20);
    let dirty = format!("{head}\r\n!{tail}\r\n");

    let decode = |body: &str| {
        let message = format!(
            "Content-Type: application/octet-stream\r\n\
             Content-Transfer-Encoding: base64\r\n\
             \r\n\
             {body}"
        );
        MimeTree::parse(message.as_bytes())
            .unwrap()
            .root()
            .content()
            .to_vec()
    };

    assert_eq!(decode(&dirty), decode(&payload));
}

#[test]
fn two_leaf_tree_shape() {
    let first = "Content-Type: text/plain\r\n\r\nfirst body";
    let second = "Content-Type: text/html\r\n\
                  Content-Transfer-Encoding: base64\r\n\
                  \r\n\
                  PHA+c2Vjb25kPC9wPg==";
    let message = multipart("outer", &[first, second], true);

    let tree = MimeTree::parse(message.as_bytes()).unwrap();
    let root = tree.root();
    assert_eq!(root.content_type(), "multipart/mixed");
    assert!(root.content().is_empty());
    assert_eq!(root.header().get("from"), Some("sender@example.com"));

    let a = root.first_child().unwrap();
    let b = a.next_sibling().unwrap();
    assert!(b.next_sibling().is_none());
    assert_eq!(root.children().count(), 2);

    assert_eq!(a.content_type(), "text/plain");
    assert_eq!(a.content(), b"first body");
    assert_eq!(b.content_type(), "text/html");
    assert_eq!(b.content(), b"<p>second</p>");
    assert_eq!(a.parent().unwrap().id(), root.id());
    assert_eq!(b.parent().unwrap().id(), root.id());
}

#[test]
fn nested_multipart_three_levels() {
    let alternative = "Content-Type: multipart/alternative; boundary=\"inner\"\r\n\
                       \r\n\
                       --inner\r\n\
                       Content-Type: text/plain; charset=us-ascii\r\n\
                       \r\n\
                       plain version\r\n\
                       --inner\r\n\
                       Content-Type: text/html; charset=us-ascii\r\n\
                       \r\n\
                       <b>html version</b>\r\n\
                       --inner--";
    let message = multipart("outer", &[alternative], true);

    let tree = MimeTree::parse(message.as_bytes()).unwrap();
    assert_eq!(tree.len(), 4);

    let alt = tree.root().first_child().unwrap();
    assert_eq!(alt.content_type(), "multipart/alternative");
    assert!(alt.content().is_empty());
    assert!(alt.next_sibling().is_none());

    let leaves: Vec<_> = alt.children().collect();
    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[0].content(), b"plain version");
    assert_eq!(leaves[1].content(), b"<b>html version</b>");
    assert_eq!(leaves[1].depth(), 2);

    assert_eq!(tree.text_body().as_deref(), Some("plain version"));
    assert_eq!(tree.html_body().as_deref(), Some("<b>html version</b>"));
}

#[test]
fn disposition_filename_wins_over_type_name() {
    let part = "Content-Type: text/plain; name=\"b.txt\"\r\n\
                Content-Disposition: attachment; filename=\"a.txt\"\r\n\
                \r\n\
                data";
    let message = multipart("fn", &[part], true);

    let tree = MimeTree::parse(message.as_bytes()).unwrap();
    let leaf = tree.root().first_child().unwrap();
    assert_eq!(leaf.file_name(), "a.txt");
    assert_eq!(leaf.disposition(), "attachment");
    assert!(leaf.is_attachment());
}

#[test]
fn type_name_used_without_disposition_filename() {
    let part = "Content-Type: image/png; name=\"=?utf-8?B?w7xiZXIucG5n?=\"\r\n\
                Content-Disposition: inline\r\n\
                \r\n\
                png";
    let message = multipart("fn", &[part], true);

    let tree = MimeTree::parse(message.as_bytes()).unwrap();
    let leaf = tree.root().first_child().unwrap();
    assert_eq!(leaf.file_name(), "über.png");
    assert_eq!(leaf.disposition(), "inline");
    assert!(!leaf.is_attachment());
}

#[test]
fn encoded_word_filename_in_disposition() {
    let part = "Content-Type: application/pdf\r\n\
                Content-Disposition: attachment;\r\n \
                filename=\"=?iso-8859-1?Q?r=E9sum=E9?= =?iso-8859-1?Q?.pdf?=\"\r\n\
                \r\n\
                %PDF";
    let message = multipart("fn", &[part], true);

    let tree = MimeTree::parse(message.as_bytes()).unwrap();
    let leaf = tree.root().first_child().unwrap();
    assert_eq!(leaf.file_name(), "résumé.pdf");
}

#[test]
fn malformed_disposition_is_ignored() {
    let part = "Content-Type: text/plain; name=\"fallback.txt\"\r\n\
                Content-Disposition: attachment; filename=\"unterminated\r\n\
                \r\n\
                text";
    let message = multipart("d", &[part], true);

    let tree = MimeTree::parse(message.as_bytes()).unwrap();
    let leaf = tree.root().first_child().unwrap();
    assert_eq!(leaf.disposition(), "");
    assert_eq!(leaf.file_name(), "fallback.txt");
    assert_eq!(leaf.content(), b"text");
}

#[test]
fn missing_close_delimiter_is_tolerated() {
    let first = "Content-Type: text/plain\r\n\r\none";
    let second = "Content-Type: text/plain\r\n\r\ntwo";

    let closed = MimeTree::parse(multipart("t", &[first, second], true).as_bytes()).unwrap();
    let unclosed = MimeTree::parse(multipart("t", &[first, second], false).as_bytes()).unwrap();
    assert_eq!(closed, unclosed);
    assert_eq!(unclosed.len(), 3);
}

#[test]
fn empty_header_part_before_more_parts_fails() {
    let message = multipart(
        "e",
        &["\r\nno headers at all", "Content-Type: text/plain\r\n\r\nlater"],
        true,
    );

    let err = MimeTree::parse(message.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::EmptyHeader { ref boundary } if boundary == "e"));
}

#[test]
fn empty_header_part_before_close_delimiter_ends_cleanly() {
    let message = multipart("c", &["Content-Type: text/plain\r\n\r\nhi", "\r\n"], true);

    let tree = MimeTree::parse(message.as_bytes()).unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.root().first_child().unwrap().content(), b"hi");
}

#[test]
fn empty_header_part_before_bad_part_is_boundary_error() {
    let message = multipart("b", &["\r\nx", "bad header\r\n\r\nbody"], true);

    let err = MimeTree::parse(message.as_bytes()).unwrap_err();
    match err {
        Error::Boundary { boundary, reason } => {
            assert_eq!(boundary, "b");
            assert!(reason.contains("missing colon"), "{reason}");
        }
        other => panic!("expected boundary error, got {other:?}"),
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("boom"))
    }
}

#[test]
fn read_failure_is_io_error() {
    let err = parse(BufReader::new(FailingReader)).unwrap_err();
    assert!(matches!(err, Error::Io(ref inner) if inner.to_string() == "boom"));
}

#[test]
fn eight_bit_header_value_is_read_as_latin1() {
    let message = b"Content-Type: multipart/mixed; boundary=\"s\"\r\n\
                    \r\n\
                    --s\r\n\
                    Content-Type: text/plain\r\n\
                    Content-Disposition: attachment; filename=\"caf\xe9.txt\"\r\n\
                    \r\n\
                    menu\r\n\
                    --s--\r\n";

    let tree = MimeTree::parse(message).unwrap();
    let leaf = tree.root().first_child().unwrap();
    assert_eq!(leaf.file_name(), "café.txt");
    assert_eq!(leaf.content(), b"menu");
}

#[test]
fn missing_content_type_in_part_fails() {
    let message = multipart("m", &["X-Note: no type\r\n\r\nbody"], true);

    let err = MimeTree::parse(message.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::MissingContentType { ref boundary } if boundary == "m"));
}

#[test]
fn malformed_part_content_type_fails() {
    let message = multipart("m", &["Content-Type: text/\r\n\r\nbody"], true);

    let err = MimeTree::parse(message.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::MediaTypeParse { .. }));
}

#[test]
fn truncated_part_fails() {
    let message = "Content-Type: multipart/mixed; boundary=x\r\n\
                   \r\n\
                   --x\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   cut off";

    let err = MimeTree::parse(message.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Boundary { ref boundary, .. } if boundary == "x"));
}

#[test]
fn unknown_charset_fails() {
    let part = "Content-Type: text/plain; charset=unknown-x\r\n\r\nbody";
    let message = multipart("c", &[part], true);

    let err = MimeTree::parse(message.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedCharset(ref name) if name == "unknown-x"));
}

#[test]
fn latin1_part_is_converted() {
    let part = "Content-Type: text/plain; charset=\"ISO-8859-1\"\r\n\
                Content-Transfer-Encoding: quoted-printable\r\n\
                \r\n\
                Gr=FC=DFe";
    let message = multipart("l", &[part], true);

    let tree = MimeTree::parse(message.as_bytes()).unwrap();
    let leaf = tree.root().first_child().unwrap();
    assert_eq!(leaf.content(), "Grüße".as_bytes());
    // The repaired header field keeps the raw parameter text.
    assert_eq!(leaf.header().get("charset"), Some("\"ISO-8859-1\""));
}

#[test]
fn nesting_depth_is_bounded() {
    let mut body = "Content-Type: text/plain\r\n\r\ncore".to_string();
    for level in 0..5 {
        body = format!(
            "Content-Type: multipart/mixed; boundary=\"l{level}\"\r\n\
             \r\n\
             --l{level}\r\n\
             {body}\r\n\
             --l{level}--"
        );
    }
    // Outermost multipart plus five nested levels.
    let message = multipart("top", &[&body], true);

    let strict = ParseOptions::builder().max_depth(4).build();
    let err = parse_with(message.as_bytes(), &strict, &EncodingRsRegistry).unwrap_err();
    assert!(matches!(err, Error::DepthExceeded { depth: 5, limit: 4 }));

    let tree = parse(message.as_bytes()).unwrap();
    let deepest = tree.iter().last().unwrap();
    assert_eq!(deepest.content(), b"core");
    assert_eq!(deepest.depth(), 6);
}

#[test]
fn custom_charset_registry() {
    struct Rot13Only;

    impl CharsetRegistry for Rot13Only {
        fn decode(&self, label: &str, bytes: &[u8]) -> Option<String> {
            label.eq_ignore_ascii_case("x-rot13").then(|| {
                bytes
                    .iter()
                    .map(|&b| match b {
                        b'a'..=b'z' => char::from((b - b'a' + 13) % 26 + b'a'),
                        b'A'..=b'Z' => char::from((b - b'A' + 13) % 26 + b'A'),
                        _ => char::from(b),
                    })
                    .collect()
            })
        }
    }

    let message = "Content-Type: text/plain; charset=x-rot13\r\n\r\nUryyb";
    let tree = parse_with(message.as_bytes(), &ParseOptions::default(), &Rot13Only).unwrap();
    assert_eq!(tree.root().content(), b"Hello");

    let message = "Content-Type: text/plain; charset=utf-8\r\n\r\nHello";
    let err = parse_with(message.as_bytes(), &ParseOptions::default(), &Rot13Only).unwrap_err();
    assert!(matches!(err, Error::UnsupportedCharset(_)));
}

#[test]
fn preamble_only_multipart_has_no_children() {
    let message = "Content-Type: multipart/mixed; boundary=z\r\n\r\nno parts here\r\n";

    let tree = MimeTree::parse(message.as_bytes()).unwrap();
    assert_eq!(tree.len(), 1);
    assert!(tree.root().first_child().is_none());
}
