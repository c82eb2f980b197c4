use std::cell::RefCell;

use crate::error::{Result, TshirtsError};
use crate::types::{Issue, IssueState, Size};
use crate::workflow::references_parent;

/// Issues that name a parent through the sub-issue marker, split by state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubIssues {
    pub open: Vec<Issue>,
    pub closed: Vec<Issue>,
}

impl SubIssues {
    pub fn is_empty(&self) -> bool {
        self.open.is_empty() && self.closed.is_empty()
    }
}

/// Everything the triage workflows need from an issue tracker.
///
/// Calls are blocking and unretried. Implementations must make
/// [`IssueStore::apply_size_label`] idempotent.
pub trait IssueStore {
    /// `None` when the issue does not exist or is a pull request.
    fn get_issue(&self, number: u64) -> Result<Option<Issue>>;

    fn list_open_issues(&self) -> Result<Vec<Issue>>;

    /// Open and closed issues alike.
    fn list_all_issues(&self) -> Result<Vec<Issue>>;

    /// Replace any size label on the issue with `size`.
    fn apply_size_label(&self, number: u64, size: Size) -> Result<()>;

    fn create_issue(&self, title: &str, body: &str, labels: &[String]) -> Result<Issue>;

    fn update_body(&self, number: u64, body: &str) -> Result<()>;

    fn add_comment(&self, number: u64, body: &str) -> Result<()>;

    /// Post `comment` (when given) and then close the issue.
    fn close_issue(&self, number: u64, comment: Option<&str>) -> Result<()>;

    /// Create any missing size labels. Failures are logged, never returned.
    fn ensure_size_labels(&self);

    fn list_unsized_issues(&self) -> Result<Vec<Issue>> {
        Ok(self
            .list_open_issues()?
            .into_iter()
            .filter(|i| i.size().is_none())
            .collect())
    }

    /// Open issues sized S or larger.
    fn list_groomable_issues(&self) -> Result<Vec<Issue>> {
        Ok(self
            .list_open_issues()?
            .into_iter()
            .filter(|i| i.size().is_some_and(Size::is_groomable))
            .collect())
    }

    fn find_sub_issues(&self, parent: u64) -> Result<SubIssues> {
        let mut subs = SubIssues::default();
        for issue in self.list_all_issues()? {
            if issue.number == parent || !references_parent(&issue.body, parent) {
                continue;
            }
            match issue.state {
                IssueState::Open => subs.open.push(issue),
                IssueState::Closed => subs.closed.push(issue),
            }
        }
        Ok(subs)
    }

    /// Like [`IssueStore::get_issue`] but absent issues are an error.
    fn require_issue(&self, number: u64) -> Result<Issue> {
        self.get_issue(number)?
            .ok_or(TshirtsError::IssueNotFound(number))
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// A comment recorded by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedComment {
    pub issue: u64,
    pub body: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    issues: Vec<Issue>,
    comments: Vec<RecordedComment>,
    labels_ensured: usize,
}

/// An in-process [`IssueStore`] for tests and offline runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<MemoryState>,
}

impl MemoryStore {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            state: RefCell::new(MemoryState {
                issues,
                ..Default::default()
            }),
        }
    }

    pub fn issues(&self) -> Vec<Issue> {
        self.state.borrow().issues.clone()
    }

    pub fn issue(&self, number: u64) -> Option<Issue> {
        self.state
            .borrow()
            .issues
            .iter()
            .find(|i| i.number == number)
            .cloned()
    }

    pub fn comments(&self) -> Vec<RecordedComment> {
        self.state.borrow().comments.clone()
    }

    pub fn labels_ensured(&self) -> usize {
        self.state.borrow().labels_ensured
    }

    fn with_issue<T>(&self, number: u64, f: impl FnOnce(&mut Issue) -> T) -> Result<T> {
        let mut state = self.state.borrow_mut();
        let issue = state
            .issues
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or(TshirtsError::IssueNotFound(number))?;
        Ok(f(issue))
    }
}

impl IssueStore for MemoryStore {
    fn get_issue(&self, number: u64) -> Result<Option<Issue>> {
        Ok(self.issue(number))
    }

    fn list_open_issues(&self) -> Result<Vec<Issue>> {
        Ok(self.issues().into_iter().filter(Issue::is_open).collect())
    }

    fn list_all_issues(&self) -> Result<Vec<Issue>> {
        Ok(self.issues())
    }

    fn apply_size_label(&self, number: u64, size: Size) -> Result<()> {
        self.ensure_size_labels();
        self.with_issue(number, |issue| {
            let target = size.label();
            issue
                .labels
                .retain(|l| Size::from_label(l).is_none() || *l == target);
            if !issue.labels.contains(&target) {
                issue.labels.push(target);
            }
        })
    }

    fn create_issue(&self, title: &str, body: &str, labels: &[String]) -> Result<Issue> {
        let mut state = self.state.borrow_mut();
        let number = state.issues.iter().map(|i| i.number).max().unwrap_or(0) + 1;
        let issue = Issue::new(number, title, body).with_labels(labels.iter().cloned());
        state.issues.push(issue.clone());
        Ok(issue)
    }

    fn update_body(&self, number: u64, body: &str) -> Result<()> {
        self.with_issue(number, |issue| issue.body = body.to_string())
    }

    fn add_comment(&self, number: u64, body: &str) -> Result<()> {
        self.with_issue(number, |_| ())?;
        self.state.borrow_mut().comments.push(RecordedComment {
            issue: number,
            body: body.to_string(),
        });
        Ok(())
    }

    fn close_issue(&self, number: u64, comment: Option<&str>) -> Result<()> {
        if let Some(comment) = comment {
            self.add_comment(number, comment)?;
        }
        self.with_issue(number, |issue| issue.state = IssueState::Closed)
    }

    fn ensure_size_labels(&self) {
        self.state.borrow_mut().labels_ensured += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(mut issue: Issue) -> Issue {
        issue.state = IssueState::Closed;
        issue
    }

    fn store() -> MemoryStore {
        MemoryStore::new(vec![
            Issue::new(1, "Epic", "Big thing"),
            Issue::new(2, "Part one", "Parent issue: #1\n\nfirst"),
            closed(Issue::new(3, "Part two", "Parent issue: #1\n\nsecond")),
            Issue::new(4, "Unrelated", "Parent issue: #12"),
            Issue::new(5, "Sized", "").with_labels(["size: XS"]),
            Issue::new(6, "Big", "").with_labels(["bug", "size: L"]),
        ])
    }

    #[test]
    fn sub_issues_split_by_state() {
        let subs = store().find_sub_issues(1).unwrap();
        let open: Vec<u64> = subs.open.iter().map(|i| i.number).collect();
        let closed: Vec<u64> = subs.closed.iter().map(|i| i.number).collect();
        assert_eq!(open, vec![2]);
        assert_eq!(closed, vec![3]);
    }

    #[test]
    fn marker_prefix_does_not_match_longer_number() {
        let store = store();
        assert!(store.find_sub_issues(1).unwrap().open.iter().all(|i| i.number != 4));
        assert_eq!(store.find_sub_issues(12).unwrap().open.len(), 1);
    }

    #[test]
    fn unsized_and_groomable_filters() {
        let store = store();
        let unsized_: Vec<u64> = store.list_unsized_issues().unwrap().iter().map(|i| i.number).collect();
        assert_eq!(unsized_, vec![1, 2, 4]);
        let groomable: Vec<u64> = store.list_groomable_issues().unwrap().iter().map(|i| i.number).collect();
        assert_eq!(groomable, vec![6]);
    }

    #[test]
    fn size_label_replaces_previous_and_is_idempotent() {
        let store = store();
        store.apply_size_label(6, Size::S).unwrap();
        store.apply_size_label(6, Size::S).unwrap();
        assert_eq!(store.issue(6).unwrap().labels, vec!["bug", "size: S"]);
    }

    #[test]
    fn close_posts_comment_first() {
        let store = store();
        store.close_issue(2, Some("Done.")).unwrap();
        assert_eq!(store.issue(2).unwrap().state, IssueState::Closed);
        assert_eq!(store.comments(), vec![RecordedComment { issue: 2, body: "Done.".into() }]);
    }

    #[test]
    fn require_issue_reports_missing() {
        let err = store().require_issue(99).unwrap_err();
        assert_eq!(err.to_string(), "issue #99 not found");
    }
}
