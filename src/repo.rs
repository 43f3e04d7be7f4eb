//! Component G: the repo initializer (§4.G).
//!
//! Unlike the source this is grounded on, every operation takes an explicit
//! repo-root path rather than relying on the process's current directory —
//! no `std::env::set_current_dir` anywhere in this crate (§9).

use crate::error::Result;
use crate::object::Oid;
use std::fs;
use std::path::Path;

/// Create the `.git` directory skeleton under `repo_root` and point `HEAD`
/// at `refs/heads/<branch>`. Does not write the branch ref itself — the tip
/// OID isn't known until discovery completes; see [`write_branch_ref`].
pub fn init(repo_root: &Path, branch: &str) -> Result<()> {
    let git_dir = repo_root.join(".git");
    fs::create_dir_all(git_dir.join("objects"))?;
    fs::create_dir_all(git_dir.join("refs").join("heads"))?;
    fs::write(git_dir.join("HEAD"), format!("ref: refs/heads/{branch}\n"))?;

    tracing::debug!(branch, root = %repo_root.display(), "initialized repository skeleton");
    Ok(())
}

/// Write `.git/refs/heads/<branch>` pointing at `tip`.
pub fn write_branch_ref(repo_root: &Path, branch: &str, tip: &Oid) -> Result<()> {
    let ref_path = repo_root.join(".git").join("refs").join("heads").join(branch);
    if let Some(parent) = ref_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(ref_path, format!("{tip}\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_writes_head_pointing_at_the_branch() {
        let dir = TempDir::new().unwrap();
        init(dir.path(), "main").unwrap();

        let head = fs::read_to_string(dir.path().join(".git").join("HEAD")).unwrap();
        assert_eq!(head, "ref: refs/heads/main\n");
        assert!(dir.path().join(".git").join("objects").is_dir());
        assert!(dir.path().join(".git").join("refs").join("heads").is_dir());
    }

    #[test]
    fn write_branch_ref_records_the_tip_oid() {
        let dir = TempDir::new().unwrap();
        init(dir.path(), "main").unwrap();

        let tip = crate::object::hash_object(crate::object::ObjectKind::Blob, b"whatever");
        write_branch_ref(dir.path(), "main", &tip).unwrap();

        let contents =
            fs::read_to_string(dir.path().join(".git").join("refs").join("heads").join("main"))
                .unwrap();
        assert_eq!(contents, format!("{tip}\n"));
    }
}
