//! Transfer encoding for uploaded bodies
//!
//! Bodies are stored base64-encoded in MIME layout: lines of at most 76
//! characters, each terminated by CRLF. Empty input encodes to an empty body.

use base64::{Engine as _, engine::general_purpose};

/// Maximum encoded characters per line
pub const MIME_LINE_LENGTH: usize = 76;

const CRLF: &[u8] = b"\r\n";

/// Encode a file's bytes for upload
pub fn encode_body(data: &[u8]) -> Vec<u8> {
    let encoded = general_purpose::STANDARD.encode(data);
    let lines = encoded.len().div_ceil(MIME_LINE_LENGTH);
    let mut body = Vec::with_capacity(encoded.len() + lines * CRLF.len());
    for line in encoded.as_bytes().chunks(MIME_LINE_LENGTH) {
        body.extend_from_slice(line);
        body.extend_from_slice(CRLF);
    }
    body
}
