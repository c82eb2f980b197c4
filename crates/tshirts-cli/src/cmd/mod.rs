use std::io::{self, BufRead, Write};

use tshirts_core::Size;

use crate::interact::Prompter;

pub mod breakdown;
pub mod close;
pub mod estimate;
pub mod groom;
pub mod label;
pub mod list;
pub mod mcp;
pub mod new;

/// Ask for a size until a valid one is given. `None` at end of input.
pub(crate) fn ask_size<R: BufRead, W: Write>(
    io: &mut Prompter<R, W>,
    prompt: &str,
) -> io::Result<Option<Size>> {
    loop {
        let Some(answer) = io.ask(prompt)? else {
            return Ok(None);
        };
        match answer.parse::<Size>() {
            Ok(size) => return Ok(Some(size)),
            Err(e) => io.say(e)?,
        }
    }
}
