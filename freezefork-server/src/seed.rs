//! Seed data the store reinitializes to on every restart. Nothing here is
//! durable by design.

use std::collections::HashMap;

use freezefork_core::model::{Branch, Commit, Project};

fn branch(id: &str, commit_count: u64, color: &str) -> Branch {
    Branch {
        id: id.to_string(),
        name: id.to_string(),
        commit_count,
        color: color.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn commit(
    id: &str,
    message: &str,
    timestamp: &str,
    author: &str,
    branch: &str,
    x: i64,
    y: i64,
    parents: &[&str],
) -> Commit {
    Commit {
        id: id.to_string(),
        message: message.to_string(),
        timestamp: timestamp.to_string(),
        author: author.to_string(),
        branch: branch.to_string(),
        x,
        y,
        parents: parents.iter().map(|p| p.to_string()).collect(),
        files: Vec::new(),
    }
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            id: "proj-1".into(),
            name: "Robotic Arm Assembly".into(),
            description: "6-DOF robotic arm for manufacturing automation".into(),
            last_modified: "2025-08-10T14:30:00Z".into(),
            branches: vec![
                branch("main", 8, "#3b82f6"),
                branch("lightweight", 2, "#10b981"),
                branch("extended", 2, "#f59e0b"),
            ],
            total_commits: 12,
            contributors: vec!["John Smith".into(), "Sarah Johnson".into(), "Mike Chen".into()],
        },
        Project {
            id: "proj-2".into(),
            name: "Conveyor Belt System".into(),
            description: "Automated conveyor system for warehouse operations".into(),
            last_modified: "2025-08-08T16:20:00Z".into(),
            branches: vec![
                branch("main", 15, "#3b82f6"),
                branch("speed-optimization", 4, "#8b5cf6"),
            ],
            total_commits: 19,
            contributors: vec!["Alice Brown".into(), "Bob Wilson".into()],
        },
        Project {
            id: "proj-3".into(),
            name: "Hydraulic Press Design".into(),
            description: "Industrial hydraulic press for metal forming".into(),
            last_modified: "2025-08-05T11:45:00Z".into(),
            branches: vec![branch("main", 22, "#3b82f6")],
            total_commits: 22,
            contributors: vec![
                "Carol Davis".into(),
                "David Lee".into(),
                "Eva Martinez".into(),
                "Frank Taylor".into(),
            ],
        },
    ]
}

pub fn commits() -> HashMap<String, Vec<Commit>> {
    let proj_1 = vec![
        commit(
            "commit-1",
            "Initial robotic arm concept",
            "2025-08-01T09:00:00Z",
            "John Smith",
            "main",
            50,
            50,
            &[],
        ),
        commit(
            "commit-2",
            "Added base plate design",
            "2025-08-02T11:30:00Z",
            "Sarah Johnson",
            "main",
            150,
            50,
            &["commit-1"],
        ),
        commit(
            "commit-3",
            "Integrated motor mount system",
            "2025-08-03T14:15:00Z",
            "Mike Chen",
            "main",
            250,
            50,
            &["commit-2"],
        ),
        commit(
            "commit-4",
            "Added arm segments with joints",
            "2025-08-04T16:45:00Z",
            "John Smith",
            "main",
            350,
            50,
            &["commit-3"],
        ),
        commit(
            "commit-5",
            "Lightweight materials exploration",
            "2025-08-05T10:20:00Z",
            "Sarah Johnson",
            "lightweight",
            450,
            120,
            &["commit-4"],
        ),
        commit(
            "commit-6",
            "Extended reach prototype",
            "2025-08-05T15:30:00Z",
            "Mike Chen",
            "extended",
            450,
            180,
            &["commit-4"],
        ),
        commit(
            "commit-7",
            "Optimized joint bearings",
            "2025-08-09T10:15:00Z",
            "Sarah Johnson",
            "main",
            450,
            50,
            &["commit-4"],
        ),
        commit(
            "commit-8",
            "Added gripper mechanism",
            "2025-08-10T14:30:00Z",
            "John Smith",
            "main",
            550,
            50,
            &["commit-7"],
        ),
        commit(
            "commit-9",
            "Carbon fiber arm segments",
            "2025-08-11T09:00:00Z",
            "Sarah Johnson",
            "lightweight",
            550,
            120,
            &["commit-5"],
        ),
        commit(
            "commit-10",
            "Extended base for stability",
            "2025-08-11T14:00:00Z",
            "Mike Chen",
            "extended",
            550,
            180,
            &["commit-6"],
        ),
    ];

    let mut commits = HashMap::new();
    commits.insert("proj-1".to_string(), proj_1);
    commits
}
