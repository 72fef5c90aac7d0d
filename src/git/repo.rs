use super::CommitSource;
use crate::error::{InsightsError, Result};
use crate::model::{AuthorIdentity, CommitRecord, DateRange, FileChange, FileSize};
use crate::util::parse_date;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use gix::object::tree::diff::ChangeDetached;
use gix::{discover, ObjectId, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use similar::{ChangeTag, TextDiff};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Bytes inspected for a NUL when deciding whether a blob is binary.
const BINARY_SNIFF_LEN: usize = 8192;

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
    include_merges: bool,
    progress: bool,
}

impl GitRepo {
    /// Open the repository containing `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InsightsError::RepositoryNotFound {
                path: path.to_path_buf(),
            });
        }

        let repo = discover(path).map_err(|e| {
            tracing::debug!("discover failed for {}: {e}", path.display());
            InsightsError::RepositoryNotFound {
                path: path.to_path_buf(),
            }
        })?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self {
            repo,
            path,
            include_merges: true,
            progress: false,
        })
    }

    pub fn include_merges(mut self, include: bool) -> Self {
        self.include_merges = include;
        self
    }

    /// Show a spinner on stderr while walking history.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolve_range(&self, since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
        let since = since.map(|s| self.parse_commit_or_date(s)).transpose()?;
        let until = until.map(|u| self.parse_commit_or_date(u)).transpose()?;
        DateRange::new(since, until)
    }

    fn parse_commit_or_date(&self, input: &str) -> Result<DateTime<Utc>> {
        if let Some(dt) = parse_date(input) {
            return Ok(dt);
        }

        // Fall back to a revision such as a tag or commit hash
        let input = input.trim();
        let id = self
            .repo
            .rev_parse_single(input)
            .map_err(|e| InsightsError::config(format!("invalid date or revision '{input}': {e}")))?;
        let commit = id
            .object()?
            .try_into_commit()
            .map_err(|_| InsightsError::config(format!("not a commit: {input}")))?;
        Ok(commit_time(&commit)?.with_timezone(&Utc))
    }

    /// Walks every local branch and HEAD, returning records inside `range`
    /// ordered by UTC timestamp, then id.
    pub fn collect_commits(&self, range: &DateRange) -> Result<Vec<CommitRecord>> {
        range.validate()?;

        let mut roots: Vec<(Option<String>, ObjectId)> = self
            .branch_tips()?
            .into_iter()
            .map(|(name, id)| (Some(name), id))
            .collect();

        // HEAD may be unborn on an orphan branch while other branches have history
        let mut head = self.repo.head()?;
        if !head.is_unborn() {
            roots.push((None, head.peel_to_commit_in_place()?.id));
        } else if roots.is_empty() {
            tracing::info!("repository has no commits yet");
            return Ok(Vec::new());
        }
        let branch_count = roots.iter().filter(|(name, _)| name.is_some()).count();

        let pb = self.spinner();
        pb.set_message("Walking history...");

        let mut membership: HashMap<ObjectId, BTreeSet<String>> = HashMap::new();
        let mut parents: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();

        for (branch, tip) in &roots {
            let mut seen: HashSet<ObjectId> = HashSet::new();
            let mut stack = vec![*tip];
            while let Some(commit_id) = stack.pop() {
                if !seen.insert(commit_id) {
                    continue;
                }
                let entry = membership.entry(commit_id).or_default();
                if let Some(name) = branch {
                    entry.insert(name.clone());
                }
                if let Some(ids) = parents.get(&commit_id) {
                    stack.extend(ids.iter().copied());
                    continue;
                }
                let ids: Vec<ObjectId> = self
                    .repo
                    .find_commit(commit_id)?
                    .parent_ids()
                    .map(|id| id.detach())
                    .collect();
                stack.extend(ids.iter().copied());
                parents.insert(commit_id, ids);
                pb.tick();
            }
        }
        tracing::debug!(reachable = membership.len(), branches = branch_count, "history walked");

        pb.set_message("Computing diff stats...");
        let mut records = Vec::new();
        for (commit_id, branches) in membership {
            let commit = self.repo.find_commit(commit_id)?;
            let timestamp = commit_time(&commit)?;
            if !range.contains(&timestamp.with_timezone(&Utc)) {
                continue;
            }

            let parent_ids = parents.get(&commit_id).cloned().unwrap_or_default();
            if !self.include_merges && parent_ids.len() > 1 {
                continue;
            }

            let author = commit.author()?;
            let author = AuthorIdentity::new(author.name.to_string(), author.email.to_string());
            let files = self.diff_files(commit_id, parent_ids.first().copied())?;

            records.push(CommitRecord {
                id: commit_id.to_string(),
                author,
                timestamp,
                files,
                branches,
                parent_count: parent_ids.len() as u32,
            });
            pb.inc(1);
        }

        pb.finish_and_clear();
        records.sort_by(|a, b| {
            a.utc_timestamp()
                .cmp(&b.utc_timestamp())
                .then_with(|| a.id.cmp(&b.id))
        });
        tracing::info!(commits = records.len(), "commit records collected");
        Ok(records)
    }

    /// Every blob in the HEAD tree with its line and byte counts. Empty for an unborn HEAD.
    pub fn tree_files(&self) -> Result<Vec<FileSize>> {
        let mut head = self.repo.head()?;
        if head.is_unborn() {
            return Ok(Vec::new());
        }
        let tree = head.peel_to_commit_in_place()?.tree()?;

        let mut files = Vec::new();
        self.collect_tree_files(&tree, "", &mut files)?;
        tracing::debug!(files = files.len(), "HEAD tree walked");
        Ok(files)
    }

    fn collect_tree_files(&self, tree: &gix::Tree<'_>, prefix: &str, files: &mut Vec<FileSize>) -> Result<()> {
        for entry in tree.iter() {
            let entry = entry?;
            let path = if prefix.is_empty() {
                entry.filename().to_string()
            } else {
                format!("{prefix}/{}", entry.filename())
            };
            let id = entry.oid().to_owned();

            if entry.mode().is_tree() {
                let subtree = self.repo.find_tree(id)?;
                self.collect_tree_files(&subtree, &path, files)?;
            } else if entry.mode().is_blob() {
                let object = self.repo.find_object(id)?;
                let data = object.data.as_slice();
                let lines = if is_binary(data) {
                    0
                } else {
                    String::from_utf8_lossy(data).lines().count() as u64
                };
                files.push(FileSize {
                    path,
                    lines,
                    bytes: data.len() as u64,
                });
            }
        }
        Ok(())
    }

    fn branch_tips(&self) -> Result<Vec<(String, ObjectId)>> {
        let platform = self.repo.references().map_err(InsightsError::access)?;
        let mut tips = Vec::new();
        for reference in platform.local_branches().map_err(InsightsError::access)? {
            let reference = reference.map_err(InsightsError::access)?;
            if let Some(id) = reference.try_id() {
                tips.push((reference.name().shorten().to_string(), id.detach()));
            }
        }
        Ok(tips)
    }

    fn spinner(&self) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} {pos}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb
    }

    /// Per-file line counts against the first parent (or the empty tree for roots).
    fn diff_files(&self, commit_id: ObjectId, parent_id: Option<ObjectId>) -> Result<Vec<FileChange>> {
        let commit_tree = self.repo.find_commit(commit_id)?.tree()?;
        let parent_tree = match parent_id {
            Some(pid) => Some(self.repo.find_commit(pid)?.tree()?),
            None => None,
        };

        let changes: Vec<ChangeDetached> =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), None)?;

        let mut files = Vec::new();
        for change in changes {
            if let Some(file) = self.file_change(change) {
                files.push(file);
            }
        }
        Ok(files)
    }

    fn file_change(&self, change: ChangeDetached) -> Option<FileChange> {
        match change {
            ChangeDetached::Addition { id, location, .. } => {
                let new = self.blob(id)?;
                let (added, _) = line_diff(&[], &new);
                Some(FileChange::new(location.to_string(), added, 0))
            }
            ChangeDetached::Deletion { id, location, .. } => {
                let old = self.blob(id)?;
                let (_, deleted) = line_diff(&old, &[]);
                Some(FileChange::new(location.to_string(), 0, deleted))
            }
            ChangeDetached::Modification {
                previous_id,
                id,
                location,
                ..
            } => {
                let old = self.blob(previous_id)?;
                let new = self.blob(id)?;
                let (added, deleted) = line_diff(&old, &new);
                Some(FileChange::new(location.to_string(), added, deleted))
            }
            ChangeDetached::Rewrite {
                source_id,
                id,
                location,
                copy,
                ..
            } => {
                let new = self.blob(id)?;
                if copy {
                    let (added, _) = line_diff(&[], &new);
                    return Some(FileChange::new(location.to_string(), added, 0));
                }
                let old = self.blob(source_id)?;
                let (added, deleted) = line_diff(&old, &new);
                Some(FileChange::new(location.to_string(), added, deleted))
            }
        }
    }

    /// Blob contents, or empty for binary blobs so they count zero lines.
    fn blob(&self, id: ObjectId) -> Option<Vec<u8>> {
        match self.repo.find_object(id) {
            Ok(obj) => {
                let data = obj.data.as_slice();
                if is_binary(data) {
                    Some(Vec::new())
                } else {
                    Some(data.to_vec())
                }
            }
            Err(e) => {
                tracing::warn!("skipping unreadable object {id}: {e}");
                None
            }
        }
    }
}

impl CommitSource for GitRepo {
    fn list_commits(&self, range: &DateRange) -> Result<Vec<CommitRecord>> {
        self.collect_commits(range)
    }

    fn head_files(&self) -> Result<Option<Vec<FileSize>>> {
        self.tree_files().map(Some)
    }
}

fn commit_time(commit: &gix::Commit<'_>) -> Result<DateTime<FixedOffset>> {
    let time = commit.time()?;
    let offset = FixedOffset::east_opt(time.offset).unwrap_or_else(|| Utc.fix());
    DateTime::from_timestamp(time.seconds, 0)
        .map(|dt| dt.with_timezone(&offset))
        .ok_or_else(|| InsightsError::RepositoryAccess(format!("invalid timestamp: {}", time.seconds)))
}

fn is_binary(data: &[u8]) -> bool {
    data.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0)
}

/// `(inserted, deleted)` line counts between two blobs.
fn line_diff(old: &[u8], new: &[u8]) -> (u32, u32) {
    let old = String::from_utf8_lossy(old);
    let new = String::from_utf8_lossy(new);
    let diff = TextDiff::from_lines(old.as_ref(), new.as_ref());

    let mut added = 0u32;
    let mut deleted = 0u32;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => deleted += 1,
            ChangeTag::Equal => {}
        }
    }
    (added, deleted)
}
