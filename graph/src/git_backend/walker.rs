use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use git2::{Commit, Repository, Sort};
use tracing::debug;

use crate::core::CommitRecord;

/// Reads commit history out of a git repository
pub struct GitWalker {
    repo: Repository,
}

impl GitWalker {
    pub fn new(repo_path: Option<&str>) -> Result<Self> {
        let repo = match repo_path {
            Some(path) => Repository::open(path),
            None => Repository::open_from_env(),
        }
        .context("Failed to open repository")?;

        Ok(Self { repo })
    }

    /// Commits reachable from HEAD and every local branch, newest first and
    /// children before parents.
    ///
    /// With a limit, parents beyond the cut stay referenced by hash only.
    pub fn load_commits(&self, limit: Option<usize>) -> Result<Vec<CommitRecord>> {
        let mut revwalk = self.repo.revwalk()?;

        // an unborn HEAD has nothing to push
        if self.repo.head().is_ok() {
            revwalk.push_head()?;
        }
        for branch in self.repo.branches(Some(git2::BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(target) = branch.get().target() {
                revwalk.push(target)?;
            }
        }
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            if limit.is_some_and(|limit| commits.len() >= limit) {
                break;
            }
            let commit = self.repo.find_commit(oid?)?;
            commits.push(Self::to_record(&commit)?);
        }

        debug!(count = commits.len(), "commits loaded");
        Ok(commits)
    }

    fn to_record(commit: &Commit) -> Result<CommitRecord> {
        let hash = commit.id().to_string();
        let parents: Vec<String> = commit.parent_ids().map(|oid| oid.to_string()).collect();

        let timestamp = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .with_context(|| format!("Invalid timestamp on commit {}", hash))?;

        let author = commit.author().name().unwrap_or("Unknown").to_string();
        let subject = commit.summary().unwrap_or("").to_string();

        Ok(CommitRecord::new(hash, parents, timestamp, author, subject))
    }

    /// Commit HEAD points at, if any
    pub fn head(&self) -> Option<String> {
        self.repo
            .head()
            .ok()
            .and_then(|head| head.target())
            .map(|oid| oid.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Graph, NodeType};
    use git2::{Oid, Signature};
    use tempfile::TempDir;

    fn create_test_repo() -> Result<(TempDir, Repository)> {
        let dir = TempDir::new()?;
        let repo = Repository::init(dir.path())?;

        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        Ok((dir, repo))
    }

    fn commit_to_repo(
        repo: &Repository,
        message: &str,
        parents: &[&Commit],
        update_ref: Option<&str>,
    ) -> Result<Oid> {
        let sig = Signature::now("Test User", "test@example.com")?;
        let tree_id = {
            let mut index = repo.index()?;
            index.write_tree()?
        };
        let tree = repo.find_tree(tree_id)?;

        Ok(repo.commit(update_ref, &sig, &sig, message, &tree, parents)?)
    }

    fn walker_for(repo: &Repository) -> Result<GitWalker> {
        let path = repo.path().to_str().context("non utf-8 temp path")?;
        GitWalker::new(Some(path))
    }

    #[test]
    fn test_empty_repository() -> Result<()> {
        let (_dir, repo) = create_test_repo()?;
        let walker = walker_for(&repo)?;

        assert!(walker.load_commits(None)?.is_empty());
        assert_eq!(walker.head(), None);
        Ok(())
    }

    #[test]
    fn test_linear_history() -> Result<()> {
        let (_dir, repo) = create_test_repo()?;

        let oid1 = commit_to_repo(&repo, "First commit", &[], Some("HEAD"))?;
        let commit1 = repo.find_commit(oid1)?;
        let oid2 = commit_to_repo(&repo, "Second commit", &[&commit1], Some("HEAD"))?;
        let commit2 = repo.find_commit(oid2)?;
        let oid3 = commit_to_repo(&repo, "Third commit", &[&commit2], Some("HEAD"))?;

        let walker = walker_for(&repo)?;
        let commits = walker.load_commits(None)?;

        let subjects: Vec<&str> = commits.iter().map(|c| c.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Third commit", "Second commit", "First commit"]);
        assert_eq!(commits[0].author, "Test User");
        assert_eq!(walker.head(), Some(oid3.to_string()));

        let graph = Graph::from_commits(commits)?;
        assert_eq!(graph.row_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        Ok(())
    }

    #[test]
    fn test_merge_commit() -> Result<()> {
        let (_dir, repo) = create_test_repo()?;

        let base_oid = commit_to_repo(&repo, "Base commit", &[], Some("HEAD"))?;
        let base_commit = repo.find_commit(base_oid)?;
        let branch1_oid = commit_to_repo(&repo, "Branch 1", &[&base_commit], Some("HEAD"))?;
        let branch1_commit = repo.find_commit(branch1_oid)?;
        // off to the side, not on HEAD
        let branch2_oid = commit_to_repo(&repo, "Branch 2", &[&base_commit], None)?;
        let branch2_commit = repo.find_commit(branch2_oid)?;
        let merge_oid = commit_to_repo(
            &repo,
            "Merge",
            &[&branch1_commit, &branch2_commit],
            Some("HEAD"),
        )?;

        let commits = walker_for(&repo)?.load_commits(None)?;
        assert_eq!(commits.len(), 4);
        assert_eq!(commits[0].hash, merge_oid.to_string());
        assert!(commits[0].is_merge());

        let graph = Graph::from_commits(commits)?;
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.branch_count(), 2);
        Ok(())
    }

    #[test]
    fn test_limit_leaves_dangling_parent() -> Result<()> {
        let (_dir, repo) = create_test_repo()?;

        let oid1 = commit_to_repo(&repo, "First commit", &[], Some("HEAD"))?;
        let commit1 = repo.find_commit(oid1)?;
        let oid2 = commit_to_repo(&repo, "Second commit", &[&commit1], Some("HEAD"))?;
        let commit2 = repo.find_commit(oid2)?;
        commit_to_repo(&repo, "Third commit", &[&commit2], Some("HEAD"))?;

        let commits = walker_for(&repo)?.load_commits(Some(2))?;
        assert_eq!(commits.len(), 2);

        let graph = Graph::from_commits(commits)?;
        let end = graph.node_at(2)?;
        assert_eq!(graph.node(end).node_type, NodeType::EndCommit);
        assert_eq!(graph.node(end).hash, oid1.to_string());
        Ok(())
    }
}
