//! Legacy JSON trailer: `{"nonce":"<b64>","tag":"<b64>"}###END###`.
//!
//! There is no length prefix, so the decoder finds the rightmost end-marker
//! and walks backward through a bounded window looking for the nearest `{`
//! that starts a well-formed record.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::Trailer;
use crate::cipher::{KdfSpec, Nonce, Tag};
use crate::config::{LEGACY_END_MARKER, LEGACY_SCAN_WINDOW, NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Result};

#[derive(Serialize, Deserialize)]
struct Record {
    nonce: String,
    tag: String,
}

/// Compact JSON record followed by the `###END###` marker.
pub fn encode(nonce: &Nonce, tag: &Tag) -> Result<Vec<u8>> {
    let record = Record { nonce: STANDARD.encode(nonce), tag: STANDARD.encode(tag) };
    let mut out = serde_json::to_vec(&record).map_err(|e| Error::TrailerParse(e.to_string()))?;
    out.extend_from_slice(LEGACY_END_MARKER);
    Ok(out)
}

/// Scans back from the rightmost marker for the nearest parseable record.
pub fn decode(bytes: &[u8]) -> Result<(Trailer, usize)> {
    let marker = bytes.windows(LEGACY_END_MARKER.len()).rposition(|w| w == LEGACY_END_MARKER).ok_or(Error::TrailerNotFound)?;

    if marker + LEGACY_END_MARKER.len() != bytes.len() {
        return Err(Error::TrailerParse("unexpected bytes after end marker".into()));
    }

    let window = marker.saturating_sub(LEGACY_SCAN_WINDOW);
    (window..marker)
        .rev()
        .filter(|&start| bytes[start] == b'{')
        .find_map(|start| parse_record(&bytes[start..marker]).map(|(nonce, tag)| (Trailer { kdf: KdfSpec::Pbkdf2Legacy, nonce, tag }, start)))
        .ok_or_else(|| Error::TrailerParse("no valid record before end marker".into()))
}

fn parse_record(candidate: &[u8]) -> Option<(Nonce, Tag)> {
    let record: Record = serde_json::from_slice(candidate).ok()?;
    let nonce = STANDARD.decode(record.nonce).ok()?;
    let tag = STANDARD.decode(record.tag).ok()?;

    let nonce: [u8; NONCE_SIZE] = nonce.try_into().ok()?;
    let tag: [u8; TAG_SIZE] = tag.try_into().ok()?;
    Some((nonce, tag))
}
