use std::fmt::Write;

use crate::types::{Conversation, DraftIssue, Issue};

/// Existing issues shown to the similarity check.
pub const SIMILAR_ISSUE_LIMIT: usize = 50;
const SIMILAR_BODY_CHARS: usize = 200;
const CLOSING_BODY_CHARS: usize = 500;
const NO_DESCRIPTION: &str = "(no description)";

/// The first `max` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn body_or_placeholder(body: &str) -> &str {
    if body.trim().is_empty() {
        NO_DESCRIPTION
    } else {
        body
    }
}

pub fn estimate(issue: &Issue) -> String {
    format!(
        "Analyze this GitHub issue and estimate its size using t-shirt sizing.

Issue #{number}: {title}

Description:
{body}

Size guide:
- XS: Trivial change, <30 min (typo fix, config change, small tweak)
- S: Small task, 1-2 hours (simple bug fix, small feature, single file change)
- M: Medium task, half day to 1 day (moderate feature, multiple files, some testing)
- L: Large task, 2-3 days (significant feature, refactoring, multiple components)
- XL: Very large, 1+ week (major feature, architectural change, needs breakdown)

Return the estimated size.",
        number = issue.number,
        title = issue.title,
        body = issue.body,
    )
}

pub fn breakdown(issue: &Issue) -> String {
    format!(
        "Break down this GitHub issue into smaller, actionable sub-tasks.

Issue #{number}: {title}

Description:
{body}

Create 3-7 sub-tasks that together complete this issue. Each sub-task should be:
- Independently implementable
- Small enough to complete in 1-2 days max
- Clear and specific

For each sub-task, estimate its size:
- XS: <30 min
- S: 1-2 hours
- M: half day to 1 day
- L: 2-3 days

Return an array of tasks with title, description, and size.",
        number = issue.number,
        title = issue.title,
        body = issue.body,
    )
}

pub fn draft(conversation: &Conversation) -> String {
    format!(
        "You are helping draft GitHub issues. Have a conversation to understand what the user wants to build.

Ask clarifying questions to understand:
- What problem this solves or what feature it adds
- Key requirements or acceptance criteria
- Any technical constraints or preferences

IMPORTANT: If the user describes multiple distinct features or capabilities, create SEPARATE issues for each one.
Each issue should be independently implementable. Never combine unrelated features into a single issue.

Conversation so far:
{history}

If you need more information, set ready=false and ask ONE focused question.
If you have enough information, set ready=true and provide the issues array (one issue per distinct feature).",
        history = conversation.transcript(),
    )
}

pub fn groom(issue: &Issue, conversation: &Conversation) -> String {
    let history = if conversation.is_empty() {
        "(no conversation yet)".to_string()
    } else {
        conversation.transcript()
    };
    format!(
        "You are helping groom a GitHub issue so it is ready for implementation.

Issue #{number}: {title}
Current size: {size}

Description:
{body}

Review the issue for clarity, completeness, and actionability. Ask clarifying questions to pin down:
- The goal: what problem this solves and for whom
- Acceptance criteria: how we will know it is done
- Requirements and constraints that are missing or ambiguous

Conversation so far:
{history}

If you need more information, set ready=false and ask ONE focused question.
If you have enough information, set ready=true and write a refined_description: a complete, well-structured issue body (goal, requirements, acceptance criteria).
In both cases, list concrete suggestions for improving the issue.",
        number = issue.number,
        title = issue.title,
        size = issue.size_display(),
        body = body_or_placeholder(&issue.body),
    )
}

pub fn similar(draft: &DraftIssue, existing: &[Issue]) -> String {
    let mut listing = String::new();
    for issue in existing.iter().take(SIMILAR_ISSUE_LIMIT) {
        let _ = writeln!(listing, "#{}: {}", issue.number, issue.title);
        let body = truncate_chars(issue.body.trim(), SIMILAR_BODY_CHARS);
        if !body.is_empty() {
            let _ = writeln!(listing, "  {}", body.replace('\n', " "));
        }
    }
    format!(
        "Compare this proposed GitHub issue with the existing open issues and identify any that overlap.

Proposed issue: {title}

Description:
{description}

Existing issues:
{listing}
For each existing issue that overlaps, classify the relationship:
- duplicate: the existing issue already covers the same work
- subtask: the proposed issue is part of the existing issue (or vice versa)
- related: the issues touch the same area but are separate pieces of work
- distinct: no meaningful overlap

Only report issues from the list above, by number, with a short reasoning.",
        title = draft.title,
        description = body_or_placeholder(&draft.description),
    )
}

pub fn closing_comment(issue: &Issue, completed: &[Issue], reason: Option<&str>) -> String {
    let mut prompt = format!(
        "Write a short closing comment for this GitHub issue.

Issue #{number}: {title}

Description:
{body}
",
        number = issue.number,
        title = issue.title,
        body = body_or_placeholder(truncate_chars(&issue.body, CLOSING_BODY_CHARS)),
    );
    if !completed.is_empty() {
        prompt.push_str("\nCompleted sub-issues:\n");
        for sub in completed {
            let _ = writeln!(prompt, "#{}: {}", sub.number, sub.title);
        }
    }
    if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
        let _ = write!(prompt, "\nReason for closing: {reason}\n");
    }
    prompt.push_str(
        "\nSummarize what was done (or why the issue is being closed) in 1-3 sentences. \
         Be concise and professional.",
    );
    prompt
}
