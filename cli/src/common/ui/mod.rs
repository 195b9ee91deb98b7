//! # rpideploy UI Utilities (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! Terminal output helpers and yes/no prompts.
//!
//! Prompts go through the `Prompter` trait so the deployment steps can be
//! driven non-interactively: `TerminalPrompter` reads stdin, `AssumeYes`
//! (selected by `--yes`) accepts every question.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::io::{self, BufRead, Write};

/// Asks the user yes/no questions.
pub trait Prompter {
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Reads answers from stdin. Anything but `y`/`yes` is a no.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        print!("\n🚀 {} (y/n): ", question);
        io::stdout().flush().context("Failed to flush stdout")?;
        let mut answer = String::new();
        io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("Failed to read answer from stdin")?;
        Ok(is_yes(&answer))
    }
}

/// Accepts every question without asking.
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, question: &str) -> Result<bool> {
        println!("🚀 {} (y/n): y (--yes)", question);
        Ok(true)
    }
}

/// Picks the prompter for the `--yes` flag.
pub fn prompter(assume_yes: bool) -> Box<dyn Prompter> {
    if assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalPrompter)
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prints a title underlined with `=`.
pub fn banner(title: &str) {
    println!("{}", title);
    println!("{}", "=".repeat(50));
}

/// Prints a step heading underlined with `-`.
pub fn step(title: &str) {
    println!("\n{}", title);
    println!("{}", "-".repeat(title.chars().count().max(10)));
}
