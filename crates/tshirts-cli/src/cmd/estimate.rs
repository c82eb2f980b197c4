use std::io::{BufRead, Write};

use tshirts_core::ai;
use tshirts_core::model::Model;
use tshirts_core::store::IssueStore;

use super::ask_size;
use crate::interact::Prompter;

/// Size every open issue that has no size label.
pub fn run<R: BufRead, W: Write>(
    store: &dyn IssueStore,
    model: &dyn Model,
    io: &mut Prompter<R, W>,
    accept_all: bool,
) -> anyhow::Result<()> {
    let issues = store.list_unsized_issues()?;
    if issues.is_empty() {
        io.say("All issues already have size labels!")?;
        return Ok(());
    }
    io.say(format!("Found {} issues without size labels", issues.len()))?;

    let (mut labeled, mut skipped) = (0usize, 0usize);
    for (index, issue) in issues.iter().enumerate() {
        io.blank()?;
        io.say(format!("#{}: {}", issue.number, issue.title))?;
        let suggested = ai::estimate_size(model, issue)?;
        io.say(format!("  Suggested: {suggested}"))?;

        let chosen = if accept_all {
            Some(suggested)
        } else {
            match io.choose("[a]ccept [c]hange [s]kip:", &['a', 'c', 's'])? {
                Some('a') => Some(suggested),
                Some('c') => ask_size(io, "  Size (XS/S/M/L/XL):")?,
                Some(_) => None,
                None => {
                    // The current issue and every one not yet shown.
                    skipped += issues.len() - index;
                    break;
                }
            }
        };

        match chosen {
            Some(size) => {
                store.apply_size_label(issue.number, size)?;
                io.say(format!("  Labeled {size}"))?;
                labeled += 1;
            }
            None => {
                io.say("  Skipped")?;
                skipped += 1;
            }
        }
    }

    io.blank()?;
    io.say(format!("{labeled} labeled, {skipped} skipped"))?;
    Ok(())
}
