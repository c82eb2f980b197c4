use std::io::{BufRead, Write};

use tshirts_core::store::IssueStore;
use tshirts_core::Issue;

use crate::interact::Prompter;
use crate::output::{print_json, print_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Open,
    Unsized,
    Groomable,
}

pub fn run<R: BufRead, W: Write>(
    store: &dyn IssueStore,
    io: &mut Prompter<R, W>,
    filter: Filter,
    json: bool,
) -> anyhow::Result<()> {
    let issues = match filter {
        Filter::Open => store.list_open_issues()?,
        Filter::Unsized => store.list_unsized_issues()?,
        Filter::Groomable => store.list_groomable_issues()?,
    };

    if json {
        return print_json(io.out(), &issues);
    }
    if issues.is_empty() {
        io.say("No issues found.")?;
        return Ok(());
    }
    print_table(io.out(), &["#", "SIZE", "TITLE", "LABELS"], rows(&issues))?;
    Ok(())
}

fn rows(issues: &[Issue]) -> Vec<Vec<String>> {
    issues
        .iter()
        .map(|i| {
            let size = i.size().map(|s| s.as_str()).unwrap_or("-");
            let others: Vec<&str> = i
                .labels
                .iter()
                .map(String::as_str)
                .filter(|l| tshirts_core::Size::from_label(l).is_none())
                .collect();
            vec![
                i.number.to_string(),
                size.to_string(),
                i.title.clone(),
                others.join(", "),
            ]
        })
        .collect()
}
