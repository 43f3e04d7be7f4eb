//! Component E: the delta resolver (§4.E).
//!
//! Resolves ref-deltas left over from bundle decoding by reading each
//! delta's base object back out of the store, replaying its copy/insert
//! instruction stream against the base's bytes, and writing the
//! reconstructed object back under its own freshly-computed OID.

use crate::bundle::UnresolvedDelta;
use crate::error::{GitError, Result};
use crate::object::Oid;
use crate::store::Store;
use crate::varint;

enum Instruction {
    Copy { offset: usize, size: usize },
    Insert(Vec<u8>),
}

/// Resolve every record in `unresolved`, writing each to `store`.
///
/// Bases may themselves be deltas resolved earlier in this same pass, so
/// records whose base isn't in the store yet are deferred to a retry queue
/// (§4.E). A pass that resolves nothing means the remaining records' bases
/// will never appear — that's `MissingBase`, not an infinite loop.
pub fn resolve(unresolved: Vec<UnresolvedDelta>, store: &Store) -> Result<Vec<Oid>> {
    let mut pending = unresolved;
    let mut resolved_oids = Vec::new();
    let mut pass = 0u32;

    while !pending.is_empty() {
        pass += 1;
        let pending_count = pending.len();
        let mut deferred = Vec::new();
        let mut resolved_any = false;

        for delta in pending {
            if !store.contains(&delta.base_oid) {
                deferred.push(delta);
                continue;
            }

            let oid = resolve_one(&delta, store)?;
            tracing::trace!(
                base_oid = %delta.base_oid.short(),
                oid = %oid.short(),
                "resolved delta"
            );
            resolved_oids.push(oid);
            resolved_any = true;
        }

        tracing::debug!(
            pass,
            pending = pending_count,
            resolved = pending_count - deferred.len(),
            deferred = deferred.len(),
            "delta resolver retry pass complete"
        );

        if !resolved_any {
            let missing = deferred
                .into_iter()
                .next()
                .expect("non-empty when resolved_any is false");
            return Err(GitError::MissingBase(missing.base_oid));
        }

        pending = deferred;
    }

    Ok(resolved_oids)
}

fn resolve_one(delta: &UnresolvedDelta, store: &Store) -> Result<Oid> {
    let (kind, base_bytes) = store.read(&delta.base_oid)?;

    let (base_size, consumed) = varint::decode_varint_b(&delta.payload)?;
    let mut cursor = consumed;
    let (target_size, consumed) = varint::decode_varint_b(&delta.payload[cursor..])?;
    cursor += consumed;

    if base_bytes.len() as u64 != base_size {
        return Err(GitError::CorruptDelta(format!(
            "declared base size {base_size} disagrees with actual base length {}",
            base_bytes.len()
        )));
    }

    let instructions = &delta.payload[cursor..];
    let target_bytes = apply_instructions(instructions, &base_bytes)?;

    if target_bytes.len() as u64 != target_size {
        return Err(GitError::SizeMismatch {
            expected: target_size as usize,
            actual: target_bytes.len(),
        });
    }

    store.write(kind, &target_bytes)
}

fn apply_instructions(stream: &[u8], base: &[u8]) -> Result<Vec<u8>> {
    let mut target = Vec::new();
    let mut pos = 0;

    while pos < stream.len() {
        let (instruction, consumed) = decode_instruction(&stream[pos..])?;
        pos += consumed;

        match instruction {
            Instruction::Copy { offset, size } => {
                let end = offset
                    .checked_add(size)
                    .ok_or_else(|| GitError::CorruptDelta("copy range overflowed".into()))?;
                let slice = base.get(offset..end).ok_or_else(|| {
                    GitError::CorruptDelta(format!(
                        "copy range {offset}..{end} out of bounds for base of length {}",
                        base.len()
                    ))
                })?;
                target.extend_from_slice(slice);
            }
            Instruction::Insert(bytes) => target.extend(bytes),
        }
    }

    Ok(target)
}

fn decode_instruction(stream: &[u8]) -> Result<(Instruction, usize)> {
    let op = *stream
        .first()
        .ok_or_else(|| GitError::CorruptDelta("instruction stream ended mid-opcode".into()))?;
    let mut pos = 1;

    if op == 0 {
        return Err(GitError::CorruptDelta("opcode 0x00 is reserved".into()));
    }

    if op & 0x80 != 0 {
        let mut offset: u32 = 0;
        for (bit, shift) in [(0x01, 0), (0x02, 8), (0x04, 16), (0x08, 24)] {
            if op & bit != 0 {
                offset |= (next_byte(stream, &mut pos)? as u32) << shift;
            }
        }

        let mut size: u32 = 0;
        for (bit, shift) in [(0x10, 0), (0x20, 8), (0x40, 16)] {
            if op & bit != 0 {
                size |= (next_byte(stream, &mut pos)? as u32) << shift;
            }
        }

        if size == 0 {
            size = 0x10000;
        }

        Ok((
            Instruction::Copy {
                offset: offset as usize,
                size: size as usize,
            },
            pos,
        ))
    } else {
        let n = op as usize;
        let bytes = stream
            .get(pos..pos + n)
            .ok_or_else(|| GitError::CorruptDelta("insert ran past end of instruction stream".into()))?
            .to_vec();
        pos += n;
        Ok((Instruction::Insert(bytes), pos))
    }
}

fn next_byte(stream: &[u8], pos: &mut usize) -> Result<u8> {
    let byte = *stream
        .get(*pos)
        .ok_or_else(|| GitError::CorruptDelta("copy instruction ran past end of stream".into()))?;
    *pos += 1;
    Ok(byte)
}
