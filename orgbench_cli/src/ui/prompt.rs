//! Line and secret prompts for the interactive flows.

use std::io::{self, Write};

use crossterm::event::{read, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Read one trimmed line, with an optional default shown in brackets.
pub fn read_line(label: &str, default: Option<&str>) -> io::Result<String> {
    match default {
        Some(d) => print!("{label} [{d}]: "),
        None => print!("{label}: "),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let line = line.trim().to_string();
    if line.is_empty() {
        if let Some(d) = default {
            return Ok(d.to_string());
        }
    }
    Ok(line)
}

/// Read one trimmed line with a bare prompt; `None` on end of input.
pub fn read_line_opt(label: &str) -> io::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Read a secret with the terminal in raw mode so nothing is echoed.
/// Ctrl+C cancels.
pub fn read_secret(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;

    enable_raw_mode()?;
    let result = collect_secret();
    disable_raw_mode()?;
    println!();
    result
}

fn collect_secret() -> io::Result<String> {
    let mut secret = String::new();
    loop {
        if let Event::Key(key) = read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Backspace => {
                    secret.pop();
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
                }
                KeyCode::Char(c) => secret.push(c),
                _ => {}
            }
        }
    }
    Ok(secret)
}

/// Ask a yes/no question; only an explicit `y`/`yes` counts as yes.
pub fn confirm(question: &str) -> io::Result<bool> {
    let answer = read_line(&format!("{question} (y/N)"), None)?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}
