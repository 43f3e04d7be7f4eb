//! Test-only helpers for assembling well-formed bundles byte-by-byte, the
//! same way the bundle decoder itself reads them (§10.4). Only compiled
//! under `#[cfg(test)]`.

use crate::object::{ObjectKind, Oid};
use crate::varint::encode_varint_b;
use flate2::write::ZlibEncoder;
use sha1::{Digest, Sha1};
use std::io::Write;

pub enum BundleObject {
    Full {
        kind: ObjectKind,
        payload: Vec<u8>,
    },
    RefDelta {
        base_oid: Oid,
        base_size: u64,
        target_size: u64,
        instructions: Vec<u8>,
    },
    OfsDelta {
        payload: Vec<u8>,
    },
    RawType {
        type_tag: u8,
        payload: Vec<u8>,
    },
}

/// Build a complete, checksummed `PACK` bundle containing `objects`.
pub fn build_bundle(objects: &[BundleObject]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"PACK");
    buf.extend_from_slice(&2u32.to_be_bytes());
    buf.extend_from_slice(&(objects.len() as u32).to_be_bytes());

    for object in objects {
        match object {
            BundleObject::Full { kind, payload } => {
                buf.extend(encode_varint_a(kind_tag(*kind), payload.len() as u64));
                buf.extend(zlib_compress(payload));
            }
            BundleObject::RefDelta {
                base_oid,
                base_size,
                target_size,
                instructions,
            } => {
                let mut stream = encode_varint_b(*base_size);
                stream.extend(encode_varint_b(*target_size));
                stream.extend_from_slice(instructions);

                buf.extend(encode_varint_a(7, stream.len() as u64));
                buf.extend_from_slice(base_oid.as_bytes());
                buf.extend(zlib_compress(&stream));
            }
            BundleObject::OfsDelta { payload } => {
                buf.extend(encode_varint_a(6, payload.len() as u64));
            }
            BundleObject::RawType { type_tag, payload } => {
                buf.extend(encode_varint_a(*type_tag, payload.len() as u64));
            }
        }
    }

    let mut hasher = Sha1::new();
    hasher.update(&buf);
    let digest: [u8; 20] = hasher.finalize().into();
    buf.extend_from_slice(&digest);

    buf
}

fn kind_tag(kind: ObjectKind) -> u8 {
    match kind {
        ObjectKind::Commit => 1,
        ObjectKind::Tree => 2,
        ObjectKind::Blob => 3,
        ObjectKind::Tag => 4,
    }
}

/// The inverse of `decode_varint_a_tail`: pack `size` into a header byte's
/// low 4 bits, carrying any remaining bits in the continuation tail.
fn encode_varint_a(type_tag: u8, size: u64) -> Vec<u8> {
    let low4 = (size & 0xf) as u8;
    let mut remaining = size >> 4;

    let mut first = low4 | (type_tag << 4);
    if remaining > 0 {
        first |= 0x80;
    }

    let mut bytes = vec![first];
    while remaining > 0 {
        let mut byte = (remaining & 0x7f) as u8;
        remaining >>= 7;
        if remaining > 0 {
            byte |= 0x80;
        }
        bytes.push(byte);
    }

    bytes
}

fn zlib_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
