use std::fmt;
use std::io::{self, BufRead, Write};

const INVALID_CHOICE_MSG: &str = "Invalid choice";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationChoice {
    Yes,
    No,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuSelection {
    Provider(usize),
    Cancel,
}

#[derive(Debug, Clone)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UiError {}

/// Print `prompt` without a newline and read one line from stdin.
/// End of input reads as an empty line.
pub fn read_line(prompt: &str) -> Result<String, UiError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|err| UiError::new(err.to_string()))?;

    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .map_err(|err| UiError::new(err.to_string()))?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Ask a yes/no question. Anything but an explicit yes declines.
pub fn confirm(question: &str) -> Result<bool, UiError> {
    let answer = read_line(&format!("{question} (y/N): "))?;
    Ok(matches!(
        parse_confirmation(&answer),
        Ok(ConfirmationChoice::Yes)
    ))
}

pub fn parse_confirmation(input: &str) -> Result<ConfirmationChoice, UiError> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return Ok(ConfirmationChoice::No);
    }
    match trimmed.as_str() {
        "y" | "yes" => Ok(ConfirmationChoice::Yes),
        "n" | "no" => Ok(ConfirmationChoice::No),
        "c" | "cancel" => Ok(ConfirmationChoice::Cancel),
        _ => Err(UiError::new("Invalid confirmation response")),
    }
}

/// Accepts a 1-based menu number or a provider id. The entry after the last
/// provider cancels.
pub fn parse_provider_selection(
    input: &str,
    provider_ids: &[&str],
) -> Result<MenuSelection, UiError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UiError::new(INVALID_CHOICE_MSG));
    }

    if let Ok(choice) = trimmed.parse::<usize>() {
        return match choice {
            n if (1..=provider_ids.len()).contains(&n) => Ok(MenuSelection::Provider(n - 1)),
            n if n == provider_ids.len() + 1 => Ok(MenuSelection::Cancel),
            _ => Err(UiError::new(INVALID_CHOICE_MSG)),
        };
    }

    provider_ids
        .iter()
        .position(|id| id.eq_ignore_ascii_case(trimmed))
        .map(MenuSelection::Provider)
        .ok_or_else(|| UiError::new(INVALID_CHOICE_MSG))
}
