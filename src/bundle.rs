//! Component D: the bundle decoder (§4.D).
//!
//! Walks a `PACK`-magic bundle buffer held fully in memory, writes full
//! objects straight to the store, and returns the ref-deltas it couldn't
//! resolve on its own (that's the delta resolver's job, §4.E / `crate::delta`).

use crate::checksum;
use crate::error::{GitError, Result};
use crate::object::{ObjectKind, Oid};
use crate::store::Store;
use crate::varint;
use flate2::read::ZlibDecoder;
use std::io::Read;

const MAGIC: &[u8; 4] = b"PACK";
const SUPPORTED_VERSION: u32 = 2;

/// 12-byte fixed header plus the 20-byte trailing checksum; no valid bundle
/// is shorter than this, even with zero object records.
const MIN_BUNDLE_LEN: usize = 32;

/// A ref-delta record the decoder could not resolve inline, carrying its
/// undecoded delta payload (`base-size`, `target-size`, instruction stream).
#[derive(Debug)]
pub struct UnresolvedDelta {
    pub base_oid: Oid,
    pub payload: Vec<u8>,
}

/// Decode `buf` and write every full object to `store`, returning the
/// ref-deltas left over for the resolver.
pub fn decode(buf: &[u8], store: &Store) -> Result<Vec<UnresolvedDelta>> {
    if buf.len() < MIN_BUNDLE_LEN {
        return Err(GitError::CorruptBundle(format!(
            "bundle shorter than the minimum {MIN_BUNDLE_LEN} bytes (12-byte header + 20-byte trailer)"
        )));
    }

    if &buf[0..4] != MAGIC {
        return Err(GitError::CorruptBundle("missing PACK magic".into()));
    }

    checksum::verify(buf)?;

    let version = read_u32(buf, 4)?;
    if version != SUPPORTED_VERSION {
        return Err(GitError::CorruptBundle(format!(
            "unsupported bundle version {version} (only version 2 is supported)"
        )));
    }

    let object_count = read_u32(buf, 8)?;
    tracing::debug!(object_count, "decoding bundle");

    let body = &buf[12..buf.len() - 20];
    let mut cursor = 0usize;
    let mut unresolved = Vec::new();

    for _ in 0..object_count {
        let (kind_or_delta, payload, consumed) = decode_record(body, cursor)?;
        cursor += consumed;

        match kind_or_delta {
            RecordKind::Full(kind) => {
                let oid = store.write(kind, &payload)?;
                tracing::trace!(oid = %oid.short(), kind = %kind, "wrote full object from bundle");
            }
            RecordKind::RefDelta(base_oid) => {
                tracing::trace!(base_oid = %base_oid.short(), "queued ref-delta for resolution");
                unresolved.push(UnresolvedDelta { base_oid, payload });
            }
        }
    }

    Ok(unresolved)
}

enum RecordKind {
    Full(ObjectKind),
    RefDelta(Oid),
}

/// Decode one object record starting at `body[cursor..]`. Returns the
/// record's classification, its decompressed payload, and the number of
/// bytes consumed from `body` (header + optional base OID + compressed
/// payload) so the caller can advance its cursor.
fn decode_record(body: &[u8], cursor: usize) -> Result<(RecordKind, Vec<u8>, usize)> {
    let mut pos = cursor;

    let header = byte_at(body, pos)?;
    pos += 1;

    let type_tag = (header >> 4) & 0x7;
    let mut size = (header & 0x0f) as u64;
    let continuation = header & 0x80 != 0;

    if continuation {
        let (full_size, consumed) = varint::decode_varint_a_tail(size, &body[pos..])?;
        size = full_size;
        pos += consumed;
    }

    let kind = match type_tag {
        0 => return Err(GitError::CorruptBundle("object type 0 is invalid".into())),
        5 => return Err(GitError::CorruptBundle("object type 5 is reserved".into())),
        6 => {
            return Err(GitError::UnsupportedFormat(
                "OBJ_OFS_DELTA (back-offset deltas) is not supported".into(),
            ))
        }
        1..=4 => RecordKind::Full(
            ObjectKind::from_type_tag(type_tag)
                .expect("1..=4 always maps to a full object kind"),
        ),
        7 => {
            let mut oid_bytes = [0u8; 20];
            oid_bytes.copy_from_slice(bytes_at(body, pos, 20)?);
            pos += 20;
            RecordKind::RefDelta(Oid::from_bytes(oid_bytes))
        }
        _ => return Err(GitError::CorruptBundle(format!("object type {type_tag} out of range"))),
    };

    let slice = body.get(pos..).ok_or_else(|| {
        GitError::CorruptBundle("object record header ran off the end of the bundle".into())
    })?;

    let mut decoder = ZlibDecoder::new(slice);
    let mut payload = Vec::new();
    decoder
        .read_to_end(&mut payload)
        .map_err(|e| GitError::CorruptBundle(format!("zlib stream error: {e}")))?;

    if payload.len() as u64 != size {
        return Err(GitError::SizeMismatch {
            expected: size as usize,
            actual: payload.len(),
        });
    }

    let consumed_compressed = decoder.total_in() as usize;
    pos += consumed_compressed;

    Ok((kind, payload, pos - cursor))
}

fn byte_at(body: &[u8], pos: usize) -> Result<u8> {
    body.get(pos)
        .copied()
        .ok_or_else(|| GitError::CorruptBundle("read past the end of the bundle".into()))
}

fn bytes_at(body: &[u8], pos: usize, len: usize) -> Result<&[u8]> {
    body.get(pos..pos + len)
        .ok_or_else(|| GitError::CorruptBundle("read past the end of the bundle".into()))
}

fn read_u32(buf: &[u8], offset: usize) -> Result<u32> {
    let bytes: [u8; 4] = buf
        .get(offset..offset + 4)
        .ok_or_else(|| GitError::CorruptBundle("truncated bundle header".into()))?
        .try_into()
        .expect("slice of length 4");
    Ok(u32::from_be_bytes(bytes))
}
