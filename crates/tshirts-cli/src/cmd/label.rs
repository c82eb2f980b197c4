use std::io::{BufRead, Write};

use tshirts_core::store::IssueStore;
use tshirts_core::Size;

use crate::interact::Prompter;
use crate::output::print_json;

pub fn run<R: BufRead, W: Write>(
    store: &dyn IssueStore,
    io: &mut Prompter<R, W>,
    number: u64,
    size: Size,
    json: bool,
) -> anyhow::Result<()> {
    let issue = store.require_issue(number)?;
    store.apply_size_label(number, size)?;

    if json {
        print_json(
            io.out(),
            &serde_json::json!({
                "issue_number": number,
                "label": size.label(),
                "status": "applied",
            }),
        )
    } else {
        io.say(format!("Labeled #{}: {} as {}", number, issue.title, size.label()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interact::{scripted, transcript};
    use tshirts_core::store::MemoryStore;
    use tshirts_core::Issue;

    #[test]
    fn labels_existing_issue() {
        let store = MemoryStore::new(vec![Issue::new(3, "Search", "").with_labels(["size: XS"])]);
        let mut io = scripted("");
        run(&store, &mut io, 3, Size::L, false).unwrap();
        assert_eq!(store.issue(3).unwrap().labels, vec!["size: L"]);
        assert_eq!(transcript(io), "Labeled #3: Search as size: L\n");
    }

    #[test]
    fn missing_issue_is_not_found() {
        let store = MemoryStore::default();
        let mut io = scripted("");
        let err = run(&store, &mut io, 9, Size::M, false).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
