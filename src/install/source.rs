//! Source installs: clone and checkout
//!
//! Fallback path when no dist archive is usable. The repository is
//! cloned into `vendor/<name>` (skipped when the directory already
//! exists) and the locked revision is checked out as a detached HEAD.
//! Authentication is delegated to git's native credential system.

use std::path::Path;

use git2::{Cred, CredentialType, FetchOptions, RemoteCallbacks, Repository, build::RepoBuilder};

use crate::error::{Result, VendoError};
use crate::lock::Module;

/// Clone and checkout a module's git source into `<root>/vendor/<name>`
pub fn install(root: &Path, module: &Module) -> Result<()> {
    let source = module
        .source
        .as_ref()
        .ok_or_else(|| VendoError::UnsupportedSourceKind {
            module: module.name.clone(),
        })?;

    let dest = root.join("vendor").join(&module.name);

    let repo = if dest.join(".git").exists() {
        Repository::open(&dest).map_err(|e| VendoError::VcsCloneFailed {
            url: source.url.clone(),
            reason: e.message().to_string(),
        })?
    } else {
        clone(&source.url, &dest)?
    };

    checkout(&repo, &source.reference)
}

fn clone(url: &str, dest: &Path) -> Result<Repository> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed| {
        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
        }
        Cred::default()
    });

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);

    builder.clone(url, dest).map_err(|e| VendoError::VcsCloneFailed {
        url: url.to_string(),
        reason: e.message().to_string(),
    })
}

/// Checkout the locked revision as a detached HEAD
fn checkout(repo: &Repository, revision: &str) -> Result<()> {
    let checkout_err = |e: &git2::Error| VendoError::VcsCheckoutFailed {
        revision: revision.to_string(),
        reason: e.message().to_string(),
    };

    let object = repo
        .revparse_single(revision)
        .map_err(|e| checkout_err(&e))?;
    let commit = object.peel_to_commit().map_err(|e| checkout_err(&e))?;

    repo.set_head_detached(commit.id())
        .map_err(|e| checkout_err(&e))?;

    let mut checkout_builder = git2::build::CheckoutBuilder::new();
    checkout_builder.force();
    repo.checkout_head(Some(&mut checkout_builder))
        .map_err(|e| checkout_err(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// Create a local repository with one commit and return (path, sha)
    fn fixture_repo(dir: &Path) -> (String, String) {
        let repo = Repository::init(dir).unwrap();
        fs::write(dir.join("widget.php"), "<?php class Widget {}").unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("widget.php")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();

        let sig = git2::Signature::now("tester", "tester@example.test").unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sha = repo
            .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap()
            .to_string();

        (dir.display().to_string(), sha)
    }

    fn git_module(name: &str, url: &str, reference: &str) -> Module {
        Module {
            name: name.to_string(),
            version: "dev-master".to_string(),
            source: Some(crate::lock::SourceRef {
                kind: "git".to_string(),
                url: url.to_string(),
                reference: reference.to_string(),
            }),
            ..Module::default()
        }
    }

    #[test]
    fn test_install_clones_and_checks_out() {
        let upstream = tempdir().unwrap();
        let (url, sha) = fixture_repo(upstream.path());

        let project = tempdir().unwrap();
        let module = git_module("acme/widget", &url, &sha);
        install(project.path(), &module).unwrap();

        let dest = project.path().join("vendor/acme/widget");
        assert!(dest.join(".git").exists());
        assert!(dest.join("widget.php").exists());

        let repo = Repository::open(&dest).unwrap();
        assert_eq!(repo.head().unwrap().peel_to_commit().unwrap().id().to_string(), sha);
    }

    #[test]
    fn test_install_reuses_existing_clone() {
        let upstream = tempdir().unwrap();
        let (url, sha) = fixture_repo(upstream.path());

        let project = tempdir().unwrap();
        let module = git_module("acme/widget", &url, &sha);
        install(project.path(), &module).unwrap();

        // A marker file outside git's control survives the second run,
        // proving no re-clone happened
        let marker = project.path().join("vendor/acme/widget/.marker");
        fs::write(&marker, "kept").unwrap();
        install(project.path(), &module).unwrap();
        assert!(marker.exists());
    }

    #[test]
    fn test_install_bad_revision_fails() {
        let upstream = tempdir().unwrap();
        let (url, _) = fixture_repo(upstream.path());

        let project = tempdir().unwrap();
        let module = git_module("acme/widget", &url, "0000000000000000000000000000000000000000");
        let err = install(project.path(), &module).unwrap_err();
        assert!(matches!(err, VendoError::VcsCheckoutFailed { .. }));
    }

    #[test]
    fn test_install_bad_url_fails() {
        let project = tempdir().unwrap();
        let module = git_module("acme/widget", "/nonexistent/vendo/repo", "abc");
        let err = install(project.path(), &module).unwrap_err();
        assert!(matches!(err, VendoError::VcsCloneFailed { .. }));
    }
}
