use std::fmt::Display;
use std::io::{self, BufRead, Stdout, Write};

/// Line-oriented terminal dialogue over any reader/writer pair.
///
/// End of input is reported as `None` so every menu has a way out when
/// stdin is closed or piped.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

pub type Terminal = Prompter<io::StdinLock<'static>, Stdout>;

pub fn terminal() -> Terminal {
    Prompter::new(io::stdin().lock(), io::stdout())
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Raw access for JSON and table output.
    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.output)
    }

    /// Show `prompt` and read one trimmed line. `None` at end of input.
    pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask until the first letter of the answer is one of `keys`.
    pub fn choose(&mut self, prompt: &str, keys: &[char]) -> io::Result<Option<char>> {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            if let Some(key) = answer
                .chars()
                .next()
                .map(|c| c.to_ascii_lowercase())
                .filter(|c| keys.contains(c))
            {
                return Ok(Some(key));
            }
            self.say(format!(
                "Please choose one of: {}",
                keys.iter().map(char::to_string).collect::<Vec<_>>().join(", ")
            ))?;
        }
    }

    /// `[y/n]` question; anything but yes (including end of input) is no.
    pub fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{prompt} [y/n]"))?;
        Ok(matches!(
            answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y" | "yes")
        ))
    }

    /// Read lines until an empty line or end of input.
    pub fn ask_multiline(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.say(prompt)?;
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                break;
            }
            lines.push(line.to_string());
        }
        if lines.is_empty() {
            return Ok(None);
        }
        Ok(Some(lines.join("\n")))
    }
}

/// A prompter reading from a fixed script and writing into a buffer.
#[cfg(test)]
pub fn scripted(input: &str) -> Prompter<io::Cursor<Vec<u8>>, Vec<u8>> {
    Prompter::new(io::Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

#[cfg(test)]
pub fn transcript(prompter: Prompter<io::Cursor<Vec<u8>>, Vec<u8>>) -> String {
    String::from_utf8_lossy(&prompter.into_output()).into_owned()
}
