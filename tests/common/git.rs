//! Git testing utilities

use anyhow::Result;
use git2::{Repository, Signature};
use std::path::{Path, PathBuf};

/// Creates a repository with a single commit at `root/<owner>/<name>`
///
/// The repository is served to the clone tests through a `file://` URL, so
/// no git binary or network access is needed.
pub fn create_remote_repo(root: &Path, owner: &str, name: &str) -> Result<PathBuf> {
    let path = root.join(owner).join(name);
    std::fs::create_dir_all(&path)?;

    let repo = Repository::init(&path)?;
    std::fs::write(path.join("README.md"), format!("# {name}\n"))?;

    let mut index = repo.index()?;
    index.add_path(Path::new("README.md"))?;
    index.write()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let signature = Signature::now("Test User", "test@example.com")?;
    repo.commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[])?;

    Ok(path)
}

/// Creates one repository per name under `root/<owner>/`
pub fn create_remote_org(root: &Path, owner: &str, names: &[&str]) -> Result<()> {
    for name in names {
        create_remote_repo(root, owner, name)?;
    }
    Ok(())
}

/// `file://` base URL for repositories created under `root`
pub fn file_base_url(root: &Path) -> String {
    format!("file://{}", root.display())
}
