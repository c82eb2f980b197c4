use std::io::{BufRead, Write};

use tshirts_core::model::Model;
use tshirts_core::store::IssueStore;
use tshirts_core::{ai, workflow, SubTask};

use super::ask_size;
use crate::interact::Prompter;
use crate::output::print_json;

/// Split an issue into sub-issues, then create them on request.
pub fn run<R: BufRead, W: Write>(
    store: &dyn IssueStore,
    model: &dyn Model,
    io: &mut Prompter<R, W>,
    number: u64,
    create: bool,
    json: bool,
) -> anyhow::Result<()> {
    let issue = store.require_issue(number)?;
    let mut tasks = ai::breakdown(model, &issue)?;

    if json && !create {
        return print_json(io.out(), &tasks);
    }

    io.say(format!("Breaking down #{}: {}", issue.number, issue.title))?;
    if tasks.is_empty() {
        io.say("No sub-issues suggested.")?;
        return Ok(());
    }

    if !create {
        loop {
            show_tasks(io, &tasks)?;
            match io.choose("[c]reate all [e]dit size [r]emove [q]uit:", &['c', 'e', 'r', 'q'])? {
                Some('c') => break,
                Some('e') => {
                    if let Some(i) = pick_task(io, tasks.len())? {
                        if let Some(size) = ask_size(io, "New size (XS/S/M/L/XL):")? {
                            tasks[i].size = size;
                        }
                    }
                }
                Some('r') => {
                    if let Some(i) = pick_task(io, tasks.len())? {
                        let removed = tasks.remove(i);
                        io.say(format!("Removed: {}", removed.title))?;
                    }
                    if tasks.is_empty() {
                        io.say("No sub-issues left.")?;
                        return Ok(());
                    }
                }
                _ => {
                    io.say("Exiting without creating sub-issues.")?;
                    return Ok(());
                }
            }
        }
    }

    let created = workflow::create_subtasks(store, number, &tasks)?;
    if json {
        return print_json(io.out(), &created);
    }
    for c in &created {
        io.say(format!("Created #{}: {}", c.issue_number, c.title))?;
    }
    Ok(())
}

fn show_tasks<R: BufRead, W: Write>(io: &mut Prompter<R, W>, tasks: &[SubTask]) -> std::io::Result<()> {
    io.blank()?;
    for (i, task) in tasks.iter().enumerate() {
        io.say(format!("  {}. [{}] {}", i + 1, task.size, task.title))?;
        if !task.description.is_empty() {
            io.say(format!("     {}", task.description))?;
        }
    }
    io.blank()
}

/// Zero-based index of a task chosen by its 1-based number.
fn pick_task<R: BufRead, W: Write>(
    io: &mut Prompter<R, W>,
    count: usize,
) -> std::io::Result<Option<usize>> {
    let Some(answer) = io.ask(&format!("Task number [1-{count}]:"))? else {
        return Ok(None);
    };
    match answer.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(Some(n - 1)),
        _ => {
            io.say("Invalid task number.")?;
            Ok(None)
        }
    }
}
