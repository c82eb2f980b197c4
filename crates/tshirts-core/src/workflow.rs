//! Store-side workflows shared by the CLI and the MCP server.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::store::{IssueStore, SubIssues};
use crate::types::{DraftIssue, Issue, SubTask};

/// The line that links a sub-issue to its parent.
pub fn parent_marker(parent: u64) -> String {
    format!("Parent issue: #{parent}")
}

static PARENT_RE: OnceLock<Regex> = OnceLock::new();

fn parent_re() -> &'static Regex {
    PARENT_RE.get_or_init(|| Regex::new(r"Parent issue: #(\d+)").unwrap())
}

/// Whether `body` carries the marker for `parent`. `#1` never matches `#12`.
pub fn references_parent(body: &str, parent: u64) -> bool {
    parent_re()
        .captures_iter(body)
        .any(|caps| caps[1].parse::<u64>().is_ok_and(|n| n == parent))
}

/// An issue created by a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Created {
    pub issue_number: u64,
    pub title: String,
}

/// Create one issue per task, each linked to `parent`, then list them in a
/// comment on the parent. No comment is posted when `tasks` is empty.
pub fn create_subtasks(
    store: &dyn IssueStore,
    parent: u64,
    tasks: &[SubTask],
) -> Result<Vec<Created>> {
    let mut created = Vec::with_capacity(tasks.len());
    for task in tasks {
        let body = format!("{}\n\n{}", parent_marker(parent), task.description);
        let issue = store.create_issue(&task.title, &body, &[task.size.label()])?;
        tracing::debug!(parent, number = issue.number, "created sub-issue");
        created.push(Created {
            issue_number: issue.number,
            title: task.title.clone(),
        });
    }

    if !created.is_empty() {
        let lines: Vec<String> = created
            .iter()
            .map(|c| format!("- #{}: {}", c.issue_number, c.title))
            .collect();
        let comment = format!("## Subtasks created\n\n{}", lines.join("\n"));
        store.add_comment(parent, &comment)?;
    }
    Ok(created)
}

/// Issue body for a draft: the description plus a task checklist.
pub fn draft_body(draft: &DraftIssue) -> String {
    if draft.tasks.is_empty() {
        return draft.description.clone();
    }
    let checklist: Vec<String> = draft.tasks.iter().map(|t| format!("- [ ] {t}")).collect();
    format!("{}\n\n## Tasks\n{}", draft.description, checklist.join("\n"))
}

pub fn create_from_draft(store: &dyn IssueStore, draft: &DraftIssue) -> Result<Issue> {
    store.create_issue(&draft.title, &draft_body(draft), &[draft.size.label()])
}

/// Sub-issue status of an issue that is about to be closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseCheck {
    pub sub_issues: SubIssues,
}

impl CloseCheck {
    /// Closing is blocked while any sub-issue is still open.
    pub fn blocked(&self) -> bool {
        !self.sub_issues.open.is_empty()
    }

    pub fn open(&self) -> &[Issue] {
        &self.sub_issues.open
    }

    pub fn completed(&self) -> &[Issue] {
        &self.sub_issues.closed
    }
}

pub fn close_readiness(store: &dyn IssueStore, number: u64) -> Result<CloseCheck> {
    Ok(CloseCheck {
        sub_issues: store.find_sub_issues(number)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScriptedModel;
    use crate::store::MemoryStore;
    use crate::types::{IssueState, Size};

    #[test]
    fn marker_matches_on_word_boundary() {
        assert!(references_parent("Parent issue: #1\n\nbody", 1));
        assert!(references_parent("see above. Parent issue: #1", 1));
        assert!(!references_parent("Parent issue: #12", 1));
        assert!(references_parent("Parent issue: #12\nParent issue: #1", 1));
        assert!(!references_parent("Parent issue: #99999999999999999999999", 1));
        assert!(!references_parent("parent #1", 1));
        assert_eq!(parent_marker(7), "Parent issue: #7");
    }

    #[test]
    fn subtasks_link_back_and_comment_on_parent() {
        let store = MemoryStore::new(vec![Issue::new(1, "Epic", "")]);
        let tasks = vec![
            SubTask { title: "Schema".into(), description: "tables".into(), size: Size::S },
            SubTask { title: "API".into(), description: "routes".into(), size: Size::L },
        ];
        let created = create_subtasks(&store, 1, &tasks).unwrap();
        assert_eq!(
            created,
            vec![
                Created { issue_number: 2, title: "Schema".into() },
                Created { issue_number: 3, title: "API".into() },
            ]
        );

        let schema = store.issue(2).unwrap();
        assert_eq!(schema.body, "Parent issue: #1\n\ntables");
        assert_eq!(schema.labels, vec!["size: S"]);

        let comments = store.comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].issue, 1);
        assert_eq!(comments[0].body, "## Subtasks created\n\n- #2: Schema\n- #3: API");

        let subs = store.find_sub_issues(1).unwrap();
        assert_eq!(subs.open.len(), 2);
    }

    #[test]
    fn no_tasks_means_no_comment() {
        let store = MemoryStore::new(vec![Issue::new(1, "Epic", "")]);
        assert!(create_subtasks(&store, 1, &[]).unwrap().is_empty());
        assert!(store.comments().is_empty());
    }

    #[test]
    fn draft_round_trips_title_and_size() {
        let store = MemoryStore::default();
        let draft = DraftIssue {
            title: "Add dark mode".into(),
            description: "Theme toggle".into(),
            size: Size::M,
            tasks: vec!["Palette".into(), "Toggle".into()],
        };
        let issue = create_from_draft(&store, &draft).unwrap();
        assert_eq!(issue.title, draft.title);
        assert_eq!(issue.size(), Some(Size::M));
        assert_eq!(issue.body, "Theme toggle\n\n## Tasks\n- [ ] Palette\n- [ ] Toggle");
    }

    #[test]
    fn estimate_then_label_unlabeled_issue() {
        let store = MemoryStore::new(vec![Issue::new(1, "Migrate DB", "")]);
        let model = ScriptedModel::new([r#"{"size":"L"}"#]);
        let issue = store.require_issue(1).unwrap();
        let size = crate::ai::estimate_size(&model, &issue).unwrap();
        assert_eq!(size, Size::L);
        store.apply_size_label(1, size).unwrap();
        assert_eq!(store.issue(1).unwrap().labels, vec!["size: L"]);
    }

    #[test]
    fn close_blocked_by_open_sub_issues() {
        let mut done = Issue::new(3, "b", "Parent issue: #1");
        done.state = IssueState::Closed;
        let store = MemoryStore::new(vec![
            Issue::new(1, "Epic", ""),
            Issue::new(2, "a", "Parent issue: #1"),
            done,
        ]);
        let check = close_readiness(&store, 1).unwrap();
        assert!(check.blocked());
        assert_eq!(check.completed().len(), 1);

        store.close_issue(2, None).unwrap();
        assert!(!close_readiness(&store, 1).unwrap().blocked());
    }
}
