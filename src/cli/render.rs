//! Console output for the CLI.

use colored::Colorize;

use crate::core::Reporter;
use crate::domain::{Progress, RunOutcome, WritingPrompt};

/// Inner width of the prompt box, in characters
const BOX_WIDTH: usize = 66;

/// Prints progress events as status lines
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, progress: &Progress) {
        match progress {
            Progress::Connecting { target } => {
                println!("{}", format!("Connecting to {}...", target).dimmed());
            }
            Progress::Searching { root } => {
                println!("{}", format!("Searching for epubs in {}...", root).dimmed());
            }
            Progress::Warning { message } => {
                println!("{}", message.yellow());
            }
            Progress::Found { count } => {
                println!("Found {} books.", count.to_string().green().bold());
            }
            Progress::Filtered { eligible, .. } => {
                println!(
                    "{} books after filtering.",
                    eligible.to_string().green().bold()
                );
            }
            Progress::Selected { book } => {
                println!("{} {}", "Selected:".bold(), book.cyan());
            }
            Progress::Downloading { .. } => {
                println!("{}", "Downloading book...".dimmed());
            }
            Progress::Extracting => {
                println!("{}", "Extracting text...".dimmed());
            }
            Progress::Extracted { count } => {
                tracing::debug!(count, "Sentences extracted");
            }
        }
    }
}

pub fn print_banner() {
    println!();
    println!("{}", "🎣 P R O M P T F I S H".cyan().bold());
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red());
}

/// Print how a run ended
pub fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Prompt(prompt) => print_prompt(prompt),
        RunOutcome::NoFilesFound => {
            if let Some(message) = outcome.message() {
                println!("{}", message.yellow());
            }
        }
        other => {
            if let Some(message) = other.message() {
                print_error(&message);
            }
        }
    }
}

/// Boxed prompt with the book name as subtitle
pub fn print_prompt(prompt: &WritingPrompt) {
    let title = " Your Writing Prompt ";
    let subtitle = format!(" from {} ", prompt.book_name);

    println!();
    println!("{}", border('╭', '╮', title, false).yellow());
    println!("{}", padded_line("").yellow());
    for line in wrap(&prompt.sentence, BOX_WIDTH - 4) {
        let inner = format!("  {:<width$}  ", line, width = BOX_WIDTH - 4);
        println!("{}{}{}", "│".yellow(), inner.bold(), "│".yellow());
    }
    println!("{}", padded_line("").yellow());
    println!("{}", border('╰', '╯', &subtitle, true).yellow());
    println!();
}

fn padded_line(content: &str) -> String {
    format!("│{:<width$}│", content, width = BOX_WIDTH)
}

/// Horizontal border with a label centred (or right-aligned for subtitles)
fn border(left: char, right: char, label: &str, align_right: bool) -> String {
    let label = truncate(label, BOX_WIDTH - 2);
    let label_len = label.chars().count();
    let fill = BOX_WIDTH.saturating_sub(label_len);

    let (before, after) = if align_right {
        (fill.saturating_sub(2), fill.min(2))
    } else {
        (fill / 2, fill - fill / 2)
    };

    format!(
        "{}{}{}{}{}",
        left,
        "─".repeat(before),
        label,
        "─".repeat(after),
        right
    )
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Greedy word wrap by character count
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let current_len = current.chars().count();
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
        }

        if word_len > width {
            // Hard-split words longer than a whole line
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = chunk.iter().collect();
            }
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
