//! Model-backed triage operations.
//!
//! Each operation is one prompt, one model call and one normalization. The
//! only error any of them returns is a missing model; everything else
//! resolves to the normalizer's defaults.

use crate::error::Result;
use crate::model::Model;
use crate::types::{Conversation, DraftIssue, Issue, SimilarIssue, Size, SubTask};
use crate::{normalize, prompt, schema};

pub use crate::normalize::{DraftTurn, GroomTurn};

pub fn estimate_size(model: &dyn Model, issue: &Issue) -> Result<Size> {
    let raw = model.complete(&prompt::estimate(issue), Some(&schema::size()))?;
    let size = normalize::size(&raw);
    tracing::debug!(number = issue.number, %size, "estimated");
    Ok(size)
}

pub fn breakdown(model: &dyn Model, issue: &Issue) -> Result<Vec<SubTask>> {
    let raw = model.complete(&prompt::breakdown(issue), Some(&schema::breakdown()))?;
    Ok(normalize::breakdown(&raw, issue))
}

/// One drafting turn over the whole conversation so far.
pub fn draft(model: &dyn Model, conversation: &Conversation) -> Result<DraftTurn> {
    let raw = model.complete(
        &prompt::draft(conversation),
        Some(&schema::draft_conversation()),
    )?;
    Ok(normalize::draft_turn(&raw))
}

/// One grooming turn for `issue`.
pub fn groom(model: &dyn Model, issue: &Issue, conversation: &Conversation) -> Result<GroomTurn> {
    let raw = model.complete(
        &prompt::groom(issue, conversation),
        Some(&schema::grooming()),
    )?;
    Ok(normalize::groom_turn(&raw))
}

/// Existing issues that duplicate, contain or relate to `draft`.
///
/// Only the first [`prompt::SIMILAR_ISSUE_LIMIT`] issues are considered. An
/// empty `existing` set short-circuits without calling the model.
pub fn find_similar(
    model: &dyn Model,
    draft: &DraftIssue,
    existing: &[Issue],
) -> Result<Vec<SimilarIssue>> {
    if existing.is_empty() {
        return Ok(Vec::new());
    }
    let shown = &existing[..existing.len().min(prompt::SIMILAR_ISSUE_LIMIT)];
    let raw = model.complete(&prompt::similar(draft, shown), Some(&schema::similarity()))?;
    Ok(normalize::similar_issues(&raw, shown))
}

pub fn closing_comment(
    model: &dyn Model,
    issue: &Issue,
    completed_sub_issues: &[Issue],
    reason: Option<&str>,
) -> Result<String> {
    let raw = model.complete(
        &prompt::closing_comment(issue, completed_sub_issues, reason),
        Some(&schema::closing_comment()),
    )?;
    Ok(normalize::closing_comment(&raw))
}
