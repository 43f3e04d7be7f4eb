//! pkt-line framing (§4.F, §6): the 4-hex-digit length-prefixed lines used by
//! the advertisement document and the fetch request/response.

pub const FLUSH: &[u8] = b"0000";

/// Frame `content` (which should already include its own trailing `\n`, if
/// any) as a pkt-line: a 4-hex-digit length of `content.len() + 4`, then the
/// content itself.
pub fn encode(content: &str) -> Vec<u8> {
    let len = content.len() + 4;
    let mut out = format!("{len:04x}").into_bytes();
    out.extend_from_slice(content.as_bytes());
    out
}

/// Iterate the pkt-lines in `input`, skipping flush packets (`0000`) and
/// yielding each line's content (the bytes after the 4-hex-digit length
/// prefix, newline included if present). Stops at the first malformed length
/// field or truncated line rather than panicking, so callers can treat a
/// short read as "no more lines".
pub fn lines(mut input: &[u8]) -> impl Iterator<Item = &[u8]> {
    std::iter::from_fn(move || loop {
        if input.len() < 4 {
            return None;
        }

        let len_hex = std::str::from_utf8(&input[..4]).ok()?;
        let len = usize::from_str_radix(len_hex, 16).ok()?;

        if len == 0 {
            input = &input[4..];
            continue;
        }

        if len < 4 || len > input.len() {
            return None;
        }

        let line = &input[4..len];
        input = &input[len..];
        return Some(line);
    })
}

/// Strip a single trailing `\n`, if present.
pub fn trim_newline(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\n").unwrap_or(line)
}
