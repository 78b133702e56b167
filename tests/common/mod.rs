//! Throw-away repositories for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use git2::build::TreeUpdateBuilder;
use git2::{BranchType, FileMode, ObjectType, Oid, Repository, RepositoryInitOptions, Signature, Time};
use tempfile::TempDir;

use git_browse::cache::{Cache, MemoryCache, NoCache};
use git_browse::git::GitRepository;

/// One change applied by `TestRepo::commit`.
pub enum Change<'a> {
    Write(&'a str, &'a str),
    Exec(&'a str, &'a str),
    Delete(&'a str),
}

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
    clock: i64,
    author: (String, String),
}

impl TestRepo {
    /// Empty repository whose HEAD points at `master`.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("master");
        let repo = Repository::init_opts(dir.path(), &opts).expect("Failed to init repo");

        Self {
            dir,
            repo,
            clock: 1_700_000_000,
            author: ("Test Author".to_string(), "author@example.com".to_string()),
        }
    }

    pub fn set_author(&mut self, name: &str, email: &str) {
        self.author = (name.to_string(), email.to_string());
    }

    fn signature(&mut self) -> Signature<'static> {
        // One minute per commit keeps time ordering deterministic.
        self.clock += 60;
        Signature::new(&self.author.0, &self.author.1, &Time::new(self.clock, 0))
            .expect("Failed to build signature")
    }

    pub fn tip(&self, branch: &str) -> Option<Oid> {
        self.repo
            .find_branch(branch, BranchType::Local)
            .ok()
            .and_then(|b| b.get().target())
    }

    /// Commit `changes` on top of `branch` (creating it if needed) and
    /// advance the branch.
    pub fn commit(&mut self, branch: &str, message: &str, changes: &[Change]) -> Oid {
        let parent = self.tip(branch);
        self.commit_onto(branch, parent, message, changes)
    }

    /// Commit `changes` on top of `parent` and point `branch` at the result.
    pub fn commit_onto(
        &mut self,
        branch: &str,
        parent: Option<Oid>,
        message: &str,
        changes: &[Change],
    ) -> Oid {
        let sig = self.signature();
        let parent = parent.map(|id| self.repo.find_commit(id).unwrap());
        let base = match &parent {
            Some(c) => c.tree().unwrap(),
            None => {
                let empty = self.repo.treebuilder(None).unwrap().write().unwrap();
                self.repo.find_tree(empty).unwrap()
            }
        };

        let mut update = TreeUpdateBuilder::new();
        for change in changes {
            match *change {
                Change::Write(path, content) => {
                    let blob = self.repo.blob(content.as_bytes()).unwrap();
                    update.upsert(path, blob, FileMode::Blob);
                }
                Change::Exec(path, content) => {
                    let blob = self.repo.blob(content.as_bytes()).unwrap();
                    update.upsert(path, blob, FileMode::BlobExecutable);
                }
                Change::Delete(path) => {
                    update.remove(path);
                }
            }
        }
        let tree_id = update.create_updated(&self.repo, &base).unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let parents: Vec<&git2::Commit> = parent.iter().collect();
        let oid = self
            .repo
            .commit(None, &sig, &sig, message, &tree, &parents)
            .unwrap();
        self.repo
            .reference(&format!("refs/heads/{}", branch), oid, true, "test commit")
            .unwrap();
        oid
    }

    pub fn lightweight_tag(&self, name: &str, target: Oid) {
        self.repo
            .reference(&format!("refs/tags/{}", name), target, false, "tag")
            .unwrap();
    }

    /// Annotated tag on any object, including another tag.
    pub fn annotated_tag(&mut self, name: &str, target: Oid, message: &str) -> Oid {
        let sig = self.signature();
        let obj = self.repo.find_object(target, None).unwrap();
        self.repo.tag(name, &obj, &sig, message, false).unwrap()
    }

    pub fn set_head(&self, branch: &str) {
        self.repo.set_head(&format!("refs/heads/{}", branch)).unwrap();
    }

    pub fn blob_id(&self, commit: Oid, path: &str) -> Oid {
        let tree = self.repo.find_commit(commit).unwrap().tree().unwrap();
        let entry = tree.get_path(std::path::Path::new(path)).unwrap();
        assert_eq!(entry.kind(), Some(ObjectType::Blob));
        entry.id()
    }

    pub fn is_ancestor(&self, ancestor: &str, of: Oid) -> bool {
        let ancestor = Oid::from_str(ancestor).unwrap();
        ancestor == of || self.repo.graph_descendant_of(of, ancestor).unwrap()
    }

    pub fn open_with(&self, cache: Arc<dyn Cache>) -> GitRepository {
        GitRepository::open(self.dir.path(), None, cache).expect("Failed to open repository")
    }

    pub fn open(&self) -> GitRepository {
        self.open_with(Arc::new(NoCache))
    }

    pub fn open_cached(&self) -> GitRepository {
        self.open_with(Arc::new(MemoryCache::new(1000)))
    }
}

/// Whether a `git` binary is available for export tests.
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
