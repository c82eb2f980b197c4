use std::io::{BufRead, Write};

use tshirts_core::conversation::{DraftSession, DraftState};
use tshirts_core::model::Model;
use tshirts_core::store::IssueStore;
use tshirts_core::{ai, workflow, DraftIssue};

use crate::interact::Prompter;

/// Draft new issues through a conversation and create the accepted ones.
pub fn run<R: BufRead, W: Write>(
    store: &dyn IssueStore,
    model: &dyn Model,
    io: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let Some(idea) = answer(io, "What do you want to build?")? else {
        io.say("Cancelled.")?;
        return Ok(());
    };

    let mut session = DraftSession::new(idea);
    loop {
        let question = match session.advance(model)? {
            DraftState::Ready { .. } => break,
            DraftState::Gathering { question } => question.clone().unwrap_or_default(),
        };
        let Some(reply) = answer(io, &question)? else {
            io.say("Cancelled.")?;
            return Ok(());
        };
        session.answer(reply);
    }

    let drafts = session.into_issues().unwrap_or_default();
    let mut existing = store.list_open_issues()?;
    for draft in &drafts {
        show_draft(io, draft)?;

        let similar = ai::find_similar(model, draft, &existing)?;
        if !similar.is_empty() {
            io.say("Possibly related open issues:")?;
            for s in &similar {
                io.say(format!("  #{} ({}): {}", s.issue_number, s.relationship, s.title))?;
                if !s.reasoning.is_empty() {
                    io.say(format!("      {}", s.reasoning))?;
                }
            }
        }

        if io.confirm("Create this issue?")? {
            let issue = workflow::create_from_draft(store, draft)?;
            io.say(format!("Created issue #{}", issue.number))?;
            existing.push(issue);
        } else {
            io.say("Issue not created.")?;
        }
    }
    Ok(())
}

/// A non-empty answer; `None` when the user quits.
fn answer<R: BufRead, W: Write>(
    io: &mut Prompter<R, W>,
    prompt: &str,
) -> std::io::Result<Option<String>> {
    Ok(io
        .ask(prompt)?
        .filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case("quit")))
}

fn show_draft<R: BufRead, W: Write>(io: &mut Prompter<R, W>, draft: &DraftIssue) -> std::io::Result<()> {
    io.blank()?;
    io.say(format!("[{}] {}", draft.size, draft.title))?;
    if !draft.description.is_empty() {
        io.blank()?;
        io.say(&draft.description)?;
    }
    if !draft.tasks.is_empty() {
        io.blank()?;
        io.say("Tasks:")?;
        for task in &draft.tasks {
            io.say(format!("  - {task}"))?;
        }
    }
    io.blank()
}
