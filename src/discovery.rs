//! Component F: ref discovery and the packfile fetch (§4.F).

use crate::config::ClientConfig;
use crate::error::{GitError, Result};
use crate::object::Oid;
use crate::pktline;
use crate::transport::Transport;

/// What discovery resolves: the branch a clone should track, and the OID
/// it currently points to.
#[derive(Debug, PartialEq, Eq)]
pub struct DefaultBranch {
    pub name: String,
    pub tip: Oid,
}

/// GET the advertisement and resolve the default branch and its tip OID.
pub fn discover(transport: &dyn Transport, repo_url: &str) -> Result<DefaultBranch> {
    let body = transport.get_advertisement(repo_url)?;
    parse_advertisement(&body)
}

fn parse_advertisement(body: &[u8]) -> Result<DefaultBranch> {
    let mut refs: Vec<(String, String)> = Vec::new();
    let mut capabilities: Vec<String> = Vec::new();
    let mut first = true;

    for line in pktline::lines(body) {
        let line = pktline::trim_newline(line);

        if first {
            first = false;
            if line.starts_with(b"#") {
                continue;
            }
        }

        let line_str = std::str::from_utf8(line)
            .map_err(|_| GitError::Protocol("advertisement line is not valid UTF-8".into()))?;

        let (oid_hex, rest) = line_str
            .split_once(' ')
            .ok_or_else(|| GitError::Protocol(format!("malformed advertisement line {line_str:?}")))?;

        let (ref_name, caps) = match rest.split_once('\0') {
            Some((name, caps)) => (name, Some(caps)),
            None => (rest, None),
        };

        if let Some(caps) = caps {
            capabilities.extend(caps.split(' ').filter(|c| !c.is_empty()).map(String::from));
        }

        // Peeled tag refs (`refs/tags/x^{}`) name the tag's target commit,
        // not a branch tip; they're irrelevant to default-branch resolution.
        if ref_name.ends_with("^{}") {
            continue;
        }

        refs.push((oid_hex.to_string(), ref_name.to_string()));
    }

    let branch = find_default_branch(&capabilities, &refs)?;

    let tip_hex = refs
        .iter()
        .find(|(_, name)| *name == format!("refs/heads/{branch}"))
        .map(|(oid, _)| oid.as_str())
        .ok_or(GitError::DefaultBranchNotFound)?;

    let tip: Oid = tip_hex
        .parse()
        .map_err(|_| GitError::Protocol(format!("advertised tip OID {tip_hex:?} is malformed")))?;

    Ok(DefaultBranch { name: branch, tip })
}

/// Prefer the `symref=HEAD:refs/heads/<branch>` capability; fall back to
/// `main`, then `master`, if present among the advertised refs (§9).
fn find_default_branch(capabilities: &[String], refs: &[(String, String)]) -> Result<String> {
    if let Some(symref) = capabilities
        .iter()
        .find(|c| c.starts_with(ClientConfig::SYMREF_HEAD_PREFIX))
    {
        let target = symref.trim_start_matches(ClientConfig::SYMREF_HEAD_PREFIX);
        if let Some(branch) = target.strip_prefix("refs/heads/") {
            return Ok(branch.to_string());
        }
    }

    for candidate in ["main", "master"] {
        let wanted = format!("refs/heads/{candidate}");
        if refs.iter().any(|(_, name)| *name == wanted) {
            return Ok(candidate.to_string());
        }
    }

    Err(GitError::DefaultBranchNotFound)
}

/// POST the want-list for `tip` and strip the `NAK` framing from the
/// response, returning the raw bundle bytes that follow it.
pub fn fetch_bundle(transport: &dyn Transport, repo_url: &str, tip: &Oid) -> Result<Vec<u8>> {
    let mut body = pktline::encode(&format!("want {tip}\n"));
    body.extend_from_slice(ClientConfig::FLUSH_PKT);
    body.extend(pktline::encode(ClientConfig::DONE_LINE));

    let response = transport.post_upload_pack(repo_url, body)?;

    let nak = response
        .get(..ClientConfig::NAK_FRAME.len())
        .ok_or_else(|| GitError::Protocol("fetch response too short for NAK framing".into()))?;
    if nak != ClientConfig::NAK_FRAME {
        return Err(GitError::Protocol(
            "fetch response is missing the expected NAK framing".into(),
        ));
    }

    Ok(response[ClientConfig::NAK_FRAME.len()..].to_vec())
}
