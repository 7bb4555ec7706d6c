//! User interaction operations (prompts and confirmations).

use anyhow::Result;

use super::RealRuntime;

use std::io::{self, BufRead, Write};

/// Core, testable implementation that reads from any BufRead and writes to any Write.
pub(crate) fn prompt_with_io<R: BufRead, W: Write>(
    question: &str,
    default: &str,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    if default.is_empty() {
        write!(output, "{} ", question)?;
    } else {
        write!(output, "{} ({}) ", question, default)?;
    }
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let answer = line.trim();
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer.to_string())
    }
}

pub(crate) fn confirm_with_io<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let response = line.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

impl RealRuntime {
    pub(crate) fn prompt_impl(&self, question: &str, default: &str) -> Result<String> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        prompt_with_io(question, default, &mut stdin_lock, &mut stdout)
    }

    pub(crate) fn confirm_impl(&self, prompt: &str) -> Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        confirm_with_io(prompt, &mut stdin_lock, &mut stdout)
    }
}
