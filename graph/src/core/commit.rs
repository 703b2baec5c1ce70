use chrono::{DateTime, Utc};

/// One parsed commit, as delivered by the commit source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Unique commit ID (SHA)
    pub hash: String,
    /// Parent commit IDs, first parent first
    pub parents: Vec<String>,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
    /// Author name
    pub author: String,
    /// Commit message (short)
    pub subject: String,
}

impl CommitRecord {
    pub fn new(
        hash: String,
        parents: Vec<String>,
        timestamp: DateTime<Utc>,
        author: String,
        subject: String,
    ) -> Self {
        Self {
            hash,
            parents,
            timestamp,
            author,
            subject,
        }
    }

    /// Record with only topology filled in
    pub fn bare(hash: impl Into<String>, parents: &[&str]) -> Self {
        Self::new(
            hash.into(),
            parents.iter().map(|p| p.to_string()).collect(),
            DateTime::<Utc>::UNIX_EPOCH,
            String::new(),
            String::new(),
        )
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
