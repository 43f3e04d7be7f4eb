//! Component H: the orchestrator (§4.H).
//!
//! Sequences discovery, fetch, repo init, bundle decode, and delta
//! resolution. Any step's failure is fatal; partial state left on disk by an
//! earlier step is not rolled back (§4.H, §7).

use crate::bundle;
use crate::delta;
use crate::discovery;
use crate::error::Result;
use crate::object::Oid;
use crate::repo;
use crate::store::Store;
use crate::transport::Transport;
use std::path::Path;

/// The outcome of a successful clone: the branch that was checked out and
/// the OID its tip resolved to.
#[derive(Debug)]
pub struct CloneSummary {
    pub branch: String,
    pub tip: Oid,
    /// How many ref-deltas the resolver reconstructed. Full objects written
    /// straight from the bundle are not counted here — see `bundle::decode`,
    /// which writes those as a side effect before the resolver even runs.
    pub deltas_resolved: usize,
}

/// Clone `repo_url` into `target_dir`, which must already exist and be
/// empty — creating and entering it is the CLI's job (§6), not the
/// orchestrator's.
pub fn clone(transport: &dyn Transport, repo_url: &str, target_dir: &Path) -> Result<CloneSummary> {
    let repo_url = repo_url.trim_end_matches('/');

    tracing::info!(repo_url, "discovering default branch");
    let default_branch = discovery::discover(transport, repo_url)?;

    tracing::info!(
        branch = default_branch.name,
        tip = %default_branch.tip.short(),
        "fetching bundle"
    );
    let bundle_bytes = discovery::fetch_bundle(transport, repo_url, &default_branch.tip)?;

    repo::init(target_dir, &default_branch.name)?;
    repo::write_branch_ref(target_dir, &default_branch.name, &default_branch.tip)?;

    let store = Store::new(target_dir);

    tracing::info!(size = bundle_bytes.len(), "decoding bundle");
    let unresolved = bundle::decode(&bundle_bytes, &store)?;

    tracing::info!(count = unresolved.len(), "resolving deltas");
    let resolved = delta::resolve(unresolved, &store)?;

    Ok(CloneSummary {
        branch: default_branch.name,
        tip: default_branch.tip,
        deltas_resolved: resolved.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;
    use crate::pktline;
    use crate::testutil::{build_bundle, BundleObject};
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct FakeTransport {
        advertisement: Vec<u8>,
        bundle_response: Vec<u8>,
        requests: RefCell<Vec<String>>,
    }

    impl Transport for FakeTransport {
        fn get_advertisement(&self, repo_url: &str) -> Result<Vec<u8>> {
            self.requests.borrow_mut().push(format!("GET {repo_url}"));
            Ok(self.advertisement.clone())
        }

        fn post_upload_pack(&self, repo_url: &str, _body: Vec<u8>) -> Result<Vec<u8>> {
            self.requests.borrow_mut().push(format!("POST {repo_url}"));
            Ok(self.bundle_response.clone())
        }
    }

    fn advertisement(oid: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend(pktline::encode("# service=git-upload-pack\n"));
        buf.extend_from_slice(pktline::FLUSH);
        buf.extend(pktline::encode(&format!(
            "{oid} HEAD\0symref=HEAD:refs/heads/main\n"
        )));
        buf.extend(pktline::encode(&format!("{oid} refs/heads/main\n")));
        buf.extend_from_slice(pktline::FLUSH);
        buf
    }

    #[test]
    fn end_to_end_single_blob_clone() {
        let blob_payload = b"hello\n".to_vec();
        let tip = crate::object::hash_object(ObjectKind::Blob, &blob_payload);
        let tip_hex = tip.to_string();

        let bundle_bytes = build_bundle(&[BundleObject::Full {
            kind: ObjectKind::Blob,
            payload: blob_payload.clone(),
        }]);
        let mut bundle_response = Vec::new();
        bundle_response.extend_from_slice(b"0008NAK\n");
        bundle_response.extend_from_slice(&bundle_bytes);

        let transport = FakeTransport {
            advertisement: advertisement(&tip_hex),
            bundle_response,
            requests: RefCell::new(Vec::new()),
        };

        let dir = TempDir::new().unwrap();
        let summary = clone(&transport, "https://example.invalid/repo", dir.path()).unwrap();

        assert_eq!(summary.branch, "main");
        assert_eq!(summary.deltas_resolved, 0); // no deltas in this bundle

        let store = Store::new(dir.path());
        let blob_oid = crate::object::hash_object(ObjectKind::Blob, &blob_payload);
        assert!(store.contains(&blob_oid));

        let head = std::fs::read_to_string(dir.path().join(".git").join("HEAD")).unwrap();
        assert_eq!(head, "ref: refs/heads/main\n");

        let branch_ref =
            std::fs::read_to_string(dir.path().join(".git").join("refs").join("heads").join("main"))
                .unwrap();
        assert_eq!(branch_ref, format!("{tip}\n"));
    }

    #[test]
    fn trailing_slash_on_repo_url_is_trimmed() {
        let tip = crate::object::hash_object(ObjectKind::Blob, b"x");
        let tip_hex = tip.to_string();
        let bundle_bytes = build_bundle(&[]);
        let mut bundle_response = Vec::new();
        bundle_response.extend_from_slice(b"0008NAK\n");
        bundle_response.extend_from_slice(&bundle_bytes);

        let transport = FakeTransport {
            advertisement: advertisement(&tip_hex),
            bundle_response,
            requests: RefCell::new(Vec::new()),
        };

        let dir = TempDir::new().unwrap();
        clone(&transport, "https://example.invalid/repo/", dir.path()).unwrap();

        let requests = transport.requests.borrow();
        assert!(requests.iter().all(|r| !r.contains("repo/")));
    }
}
