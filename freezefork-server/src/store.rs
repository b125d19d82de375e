//! Volatile in-memory vault state.
//!
//! Everything lives behind one mutex: project creation and commit appends
//! read the current count and append under the same lock, so id assignment
//! is atomic. State is constructed at process start from seed data and
//! reset only by restarting the process.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use tracing::info;

use freezefork_core::model::{Branch, Commit, CommitFile, Project, UploadReceipt};

use crate::seed;

/// Branch lane colors, assigned round-robin as branches appear.
const BRANCH_COLORS: &[&str] = &["#3b82f6", "#10b981", "#f59e0b", "#8b5cf6", "#ef4444"];

/// Vertical spacing between branch lanes in the history layout.
const LANE_HEIGHT: i64 = 70;

struct VaultState {
    projects: Vec<Project>,
    commits: HashMap<String, Vec<Commit>>,
    /// Raw bytes of uploaded commit files, keyed (project, commit, name).
    blobs: HashMap<(String, String, String), Vec<u8>>,
    uploaded_files: u64,
}

pub struct VaultStore {
    inner: Mutex<VaultState>,
}

impl VaultStore {
    /// A store initialized with the seed projects and commit history.
    pub fn seeded() -> Self {
        let projects = seed::projects();
        info!(projects = projects.len(), "Seeding vault store");
        Self {
            inner: Mutex::new(VaultState {
                projects,
                commits: seed::commits(),
                blobs: HashMap::new(),
                uploaded_files: 0,
            }),
        }
    }

    pub fn project_count(&self) -> usize {
        self.inner.lock().unwrap().projects.len()
    }

    pub fn list_projects(&self) -> Vec<Project> {
        self.inner.lock().unwrap().projects.clone()
    }

    /// Append a project with the next sequential id. Name uniqueness is not
    /// validated.
    pub fn create_project(&self, name: &str, description: &str) -> Project {
        let mut state = self.inner.lock().unwrap();
        let project = Project {
            id: format!("proj-{}", state.projects.len() + 1),
            name: name.to_string(),
            description: description.to_string(),
            last_modified: now(),
            branches: vec![Branch {
                id: "main".to_string(),
                name: "main".to_string(),
                commit_count: 0,
                color: BRANCH_COLORS[0].to_string(),
            }],
            total_commits: 0,
            contributors: Vec::new(),
        };
        state.projects.push(project.clone());
        info!(id = %project.id, name = %project.name, "Created project");
        project
    }

    /// Commit history for a project; an unknown id yields an empty list.
    pub fn list_commits(&self, project_id: &str) -> Vec<Commit> {
        self.inner
            .lock()
            .unwrap()
            .commits
            .get(project_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Append one commit with the given files to a project's history.
    /// Returns `None` when the project does not exist.
    pub fn append_commit(
        &self,
        project_id: &str,
        message: &str,
        author: &str,
        branch_name: &str,
        files: Vec<(String, Vec<u8>)>,
    ) -> Option<UploadReceipt> {
        let mut state = self.inner.lock().unwrap();

        let project_idx = state.projects.iter().position(|p| p.id == project_id)?;

        // Branch lane: existing index, or a new lane appended to the project.
        let branch_idx = {
            let project = &mut state.projects[project_idx];
            match project.branches.iter().position(|b| b.name == branch_name) {
                Some(idx) => idx,
                None => {
                    let idx = project.branches.len();
                    project.branches.push(Branch {
                        id: branch_name.to_string(),
                        name: branch_name.to_string(),
                        commit_count: 0,
                        color: BRANCH_COLORS[idx % BRANCH_COLORS.len()].to_string(),
                    });
                    idx
                }
            }
        };

        let history = state.commits.entry(project_id.to_string()).or_default();
        let commit_id = format!("commit-{}", history.len() + 1);
        let on_branch = history.iter().filter(|c| c.branch == branch_name).count() as i64;
        // Parent is the branch head; a commit on a fresh branch forks off the
        // project head.
        let parents = history
            .iter()
            .rev()
            .find(|c| c.branch == branch_name)
            .or_else(|| history.last())
            .map(|c| vec![c.id.clone()])
            .unwrap_or_default();

        let timestamp = now();
        let commit = Commit {
            id: commit_id.clone(),
            message: message.to_string(),
            timestamp: timestamp.clone(),
            author: author.to_string(),
            branch: branch_name.to_string(),
            x: 50 + 100 * on_branch,
            y: 50 + LANE_HEIGHT * branch_idx as i64,
            parents,
            files: files
                .iter()
                .map(|(name, data)| CommitFile {
                    name: name.clone(),
                    size: data.len() as u64,
                })
                .collect(),
        };
        history.push(commit.clone());

        let files_uploaded = files.len() as u64;
        for (name, data) in files {
            state
                .blobs
                .insert((project_id.to_string(), commit_id.clone(), name), data);
        }

        let project = &mut state.projects[project_idx];
        project.branches[branch_idx].commit_count += 1;
        project.total_commits += 1;
        project.last_modified = timestamp;
        if !project.contributors.iter().any(|c| c == author) {
            project.contributors.push(author.to_string());
        }

        info!(project_id, commit_id = %commit.id, files_uploaded, "Appended commit");
        Some(UploadReceipt {
            commit,
            files_uploaded,
        })
    }

    /// Stored bytes of one commit file.
    pub fn file_bytes(&self, project_id: &str, commit_id: &str, filename: &str) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .unwrap()
            .blobs
            .get(&(
                project_id.to_string(),
                commit_id.to_string(),
                filename.to_string(),
            ))
            .cloned()
    }

    /// Name/bytes pairs of every stored file of a commit, in the order the
    /// commit records them. `None` when the commit is unknown.
    pub fn commit_files(&self, project_id: &str, commit_id: &str) -> Option<Vec<(String, Vec<u8>)>> {
        let state = self.inner.lock().unwrap();
        let commit = state
            .commits
            .get(project_id)?
            .iter()
            .find(|c| c.id == commit_id)?;
        let files = commit
            .files
            .iter()
            .filter_map(|f| {
                state
                    .blobs
                    .get(&(
                        project_id.to_string(),
                        commit_id.to_string(),
                        f.name.clone(),
                    ))
                    .map(|data| (f.name.clone(), data.clone()))
            })
            .collect();
        Some(files)
    }

    /// Next id for a standalone file upload.
    pub fn next_file_id(&self) -> String {
        let mut state = self.inner.lock().unwrap();
        state.uploaded_files += 1;
        format!("file-{}", state.uploaded_files)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
