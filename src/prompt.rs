use std::io::{BufRead, Write};

use crate::result::ConfigError;

/// Line-based question and answer on a text interface
#[derive(Debug)]
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a line of text, without waiting for an answer
    pub fn say(&mut self, text: &str) -> Result<(), ConfigError> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Ask a question and return the trimmed answer, which is never empty
    pub fn ask(&mut self, question: &str) -> Result<String, ConfigError> {
        write!(self.output, "{question} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ConfigError::InputClosed);
        }

        let answer = line.trim();
        if answer.is_empty() {
            return Err(ConfigError::EmptyAnswer {
                question: question.to_owned(),
            });
        }
        Ok(answer.to_owned())
    }
}
