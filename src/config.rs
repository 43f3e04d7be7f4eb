//! Internal protocol constants (§10.3): named once here instead of scattered
//! as magic numbers/strings across the pkt-line and discovery modules, and
//! reused by both the discovery module and its tests. Not user-facing — the
//! CLI takes no configuration beyond its two positional arguments and
//! `RUST_LOG`.

use crate::pktline;

pub struct ClientConfig;

impl ClientConfig {
    /// The pkt-line flush marker (`0000`).
    pub const FLUSH_PKT: &'static [u8] = pktline::FLUSH;

    /// The fetch request's terminating `done` line.
    pub const DONE_LINE: &'static str = "done\n";

    /// The capability token advertising the symbolic default branch, e.g.
    /// `symref=HEAD:refs/heads/main` (§9).
    pub const SYMREF_HEAD_PREFIX: &'static str = "symref=HEAD:";

    /// The framed `NAK` line the fetch response must begin with.
    pub const NAK_FRAME: &'static [u8] = b"0008NAK\n";
}
