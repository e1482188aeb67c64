//! Terminal prompts backed by `inquire`.

use colored::Colorize;
use inquire::error::InquireError;
use inquire::{Confirm, MultiSelect, Password, PasswordDisplayMode, Select, Text};
use kmuc_init::{Choice, InitError, InitResult, Prompter};

/// Interactive prompter for a real terminal.
#[derive(Debug, Default)]
pub(crate) struct InquirePrompter;

impl Prompter for InquirePrompter {
	fn text(&mut self, message: &str, default: Option<&str>) -> InitResult<String> {
		let mut prompt = Text::new(message);
		if let Some(default) = default {
			prompt = prompt.with_default(default);
		}
		prompt.prompt().map_err(prompt_error)
	}

	fn password(&mut self, message: &str) -> InitResult<String> {
		Password::new(message)
			.without_confirmation()
			.with_display_mode(PasswordDisplayMode::Masked)
			.prompt()
			.map_err(prompt_error)
	}

	fn confirm(&mut self, message: &str, default: bool) -> InitResult<bool> {
		Confirm::new(message)
			.with_default(default)
			.prompt()
			.map_err(prompt_error)
	}

	fn select(&mut self, message: &str, choices: &[Choice], default: usize) -> InitResult<usize> {
		Select::new(message, choices.to_vec())
			.with_starting_cursor(default)
			.raw_prompt()
			.map(|option| option.index)
			.map_err(prompt_error)
	}

	fn multi_select(
		&mut self,
		message: &str,
		choices: &[Choice],
		defaults: &[usize],
	) -> InitResult<Vec<usize>> {
		MultiSelect::new(message, choices.to_vec())
			.with_default(defaults)
			.raw_prompt()
			.map(|options| options.into_iter().map(|option| option.index).collect())
			.map_err(prompt_error)
	}

	fn reject(&mut self, reason: &str) {
		eprintln!("{} {}", "✗".red(), reason);
	}
}

/// Esc and Ctrl+C cancel the run; anything else is a prompt failure.
fn prompt_error(error: InquireError) -> InitError {
	match error {
		InquireError::OperationCanceled | InquireError::OperationInterrupted => InitError::Cancelled,
		other => InitError::Prompt {
			message: other.to_string(),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(InquireError::OperationCanceled)]
	#[case(InquireError::OperationInterrupted)]
	fn cancellation_maps_to_cancelled(#[case] error: InquireError) {
		// Act
		let mapped = prompt_error(error);

		// Assert
		assert!(matches!(mapped, InitError::Cancelled));
	}

	#[rstest]
	fn missing_terminal_is_a_prompt_failure() {
		// Act
		let mapped = prompt_error(InquireError::NotTTY);

		// Assert
		assert!(matches!(mapped, InitError::Prompt { .. }));
	}
}
