use std::io::{BufRead, Write};

use tshirts_core::conversation::{GroomSession, GroomState};
use tshirts_core::model::Model;
use tshirts_core::store::IssueStore;

use crate::interact::Prompter;
use crate::output::print_json;

pub fn run<R: BufRead, W: Write>(
    store: &dyn IssueStore,
    model: &dyn Model,
    io: &mut Prompter<R, W>,
    number: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    match number {
        None => list(store, io, json),
        Some(n) => refine(store, model, io, n),
    }
}

fn list<R: BufRead, W: Write>(
    store: &dyn IssueStore,
    io: &mut Prompter<R, W>,
    json: bool,
) -> anyhow::Result<()> {
    let issues = store.list_groomable_issues()?;
    if json {
        return print_json(io.out(), &issues);
    }
    if issues.is_empty() {
        io.say("No issues need grooming")?;
        return Ok(());
    }
    io.say("Issues that may need refinement:")?;
    for issue in &issues {
        io.say(format!("  #{} [{}]: {}", issue.number, issue.size_display(), issue.title))?;
    }
    Ok(())
}

/// Question-and-answer loop over one issue until the model proposes a
/// refined description.
fn refine<R: BufRead, W: Write>(
    store: &dyn IssueStore,
    model: &dyn Model,
    io: &mut Prompter<R, W>,
    number: u64,
) -> anyhow::Result<()> {
    let issue = store.require_issue(number)?;
    io.say(format!("Grooming #{}: {}", issue.number, issue.title))?;

    let mut session = GroomSession::new(issue);
    let refined = loop {
        let state = session.advance(model)?.clone();
        show_suggestions(io, state.suggestions())?;
        match state {
            GroomState::Ready {
                refined_description,
                ..
            } => break refined_description,
            GroomState::Gathering { question, .. } => {
                io.blank()?;
                let reply = io
                    .ask(question.as_deref().unwrap_or_default())?
                    .filter(|r| !r.is_empty() && !r.eq_ignore_ascii_case("quit"));
                let Some(reply) = reply else {
                    io.say("Issue not updated.")?;
                    return Ok(());
                };
                session.answer(reply);
            }
        }
    };

    io.blank()?;
    io.say("Refined description:")?;
    io.blank()?;
    io.say(&refined)?;
    io.blank()?;
    if io.confirm(&format!("Update issue #{number} with this description?"))? {
        store.update_body(number, &refined)?;
        io.say(format!("Issue #{number} updated."))?;
    } else {
        io.say("Issue not updated.")?;
    }
    Ok(())
}

fn show_suggestions<R: BufRead, W: Write>(
    io: &mut Prompter<R, W>,
    suggestions: &[String],
) -> std::io::Result<()> {
    if suggestions.is_empty() {
        return Ok(());
    }
    io.blank()?;
    io.say("Suggestions:")?;
    for s in suggestions {
        io.say(format!("  - {s}"))?;
    }
    Ok(())
}
