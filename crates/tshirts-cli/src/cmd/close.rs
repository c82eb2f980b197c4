use std::io::{BufRead, Write};

use anyhow::bail;
use tshirts_core::model::Model;
use tshirts_core::store::IssueStore;
use tshirts_core::{ai, workflow};

use crate::interact::Prompter;

pub fn run<R: BufRead, W: Write>(
    store: &dyn IssueStore,
    model: &dyn Model,
    io: &mut Prompter<R, W>,
    number: u64,
) -> anyhow::Result<()> {
    let issue = store.require_issue(number)?;
    if !issue.is_open() {
        io.say(format!("Issue #{number} is already closed."))?;
        return Ok(());
    }

    let check = workflow::close_readiness(store, number)?;
    if check.blocked() {
        io.say(format!("Open sub-issues of #{number}:"))?;
        for sub in check.open() {
            io.say(format!("  #{}: {}", sub.number, sub.title))?;
        }
        bail!("Cannot close #{number}: {} open sub-issues", check.open().len());
    }

    let reason = if check.completed().is_empty() {
        io.ask("Reason for closing:")?.filter(|r| !r.is_empty())
    } else {
        io.say("Completed sub-issues:")?;
        for sub in check.completed() {
            io.say(format!("  #{}: {}", sub.number, sub.title))?;
        }
        if !io.confirm("Are these sub-issues satisfactorily completed?")? {
            io.say("Aborting.")?;
            return Ok(());
        }
        None
    };

    let generated = ai::closing_comment(model, &issue, check.completed(), reason.as_deref())?;
    io.blank()?;
    io.say("Closing comment:")?;
    io.blank()?;
    io.say(&generated)?;
    io.blank()?;

    let comment = match io.choose("[a]ccept [e]dit [s]kip:", &['a', 'e', 's'])? {
        Some('a') => Some(generated),
        Some('e') => Some(
            io.ask_multiline("Enter the comment (blank line to finish):")?
                .unwrap_or(generated),
        ),
        Some(_) => None,
        None => {
            io.say("Aborting.")?;
            return Ok(());
        }
    };

    if io.confirm(&format!("Close issue #{number}?"))? {
        store.close_issue(number, comment.as_deref())?;
        io.say(format!("Issue #{number} closed."))?;
    } else {
        io.say("Aborting.")?;
    }
    Ok(())
}
