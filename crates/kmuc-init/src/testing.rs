//! Test support: a [`Prompter`] that replays scripted replies.

use std::collections::VecDeque;

use crate::error::{InitError, InitResult};
use crate::questions::{Choice, Prompter};

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
	Text(String),
	Password(String),
	Confirm(bool),
	/// Choice value (not label) to pick.
	Select(String),
	MultiSelect(Vec<String>),
	/// Simulate Esc / Ctrl+C.
	Cancel,
}

impl Reply {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	pub fn password(text: impl Into<String>) -> Self {
		Self::Password(text.into())
	}

	pub fn confirm(answer: bool) -> Self {
		Self::Confirm(answer)
	}

	pub fn select(value: impl Into<String>) -> Self {
		Self::Select(value.into())
	}

	pub fn multi_select<I, S>(values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::MultiSelect(values.into_iter().map(Into::into).collect())
	}
}

/// Prompter that answers from a fixed script and records what it was asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
	replies: VecDeque<Reply>,
	messages: Vec<String>,
	rejections: Vec<String>,
}

impl ScriptedPrompter {
	pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
		Self {
			replies: replies.into_iter().collect(),
			..Self::default()
		}
	}

	/// Every prompt message shown, in order.
	pub fn messages(&self) -> &[String] {
		&self.messages
	}

	/// Every rejection reason shown, in order.
	pub fn rejections(&self) -> &[String] {
		&self.rejections
	}

	pub fn is_exhausted(&self) -> bool {
		self.replies.is_empty()
	}

	fn next(&mut self, message: &str) -> InitResult<Reply> {
		self.messages.push(message.to_string());
		match self.replies.pop_front() {
			Some(Reply::Cancel) => Err(InitError::Cancelled),
			Some(reply) => Ok(reply),
			None => Err(InitError::Prompt {
				message: format!("no scripted reply for '{message}'"),
			}),
		}
	}
}

fn unexpected(reply: &Reply, message: &str) -> InitError {
	InitError::Prompt {
		message: format!("scripted reply {reply:?} does not fit prompt '{message}'"),
	}
}

fn index_of(choices: &[Choice], value: &str, message: &str) -> InitResult<usize> {
	choices
		.iter()
		.position(|choice| choice.value == value)
		.ok_or_else(|| InitError::Prompt {
			message: format!("'{value}' is not a choice of '{message}'"),
		})
}

impl Prompter for ScriptedPrompter {
	fn text(&mut self, message: &str, _default: Option<&str>) -> InitResult<String> {
		match self.next(message)? {
			Reply::Text(text) => Ok(text),
			other => Err(unexpected(&other, message)),
		}
	}

	fn password(&mut self, message: &str) -> InitResult<String> {
		match self.next(message)? {
			Reply::Password(text) | Reply::Text(text) => Ok(text),
			other => Err(unexpected(&other, message)),
		}
	}

	fn confirm(&mut self, message: &str, _default: bool) -> InitResult<bool> {
		match self.next(message)? {
			Reply::Confirm(answer) => Ok(answer),
			other => Err(unexpected(&other, message)),
		}
	}

	fn select(&mut self, message: &str, choices: &[Choice], _default: usize) -> InitResult<usize> {
		match self.next(message)? {
			Reply::Select(value) => index_of(choices, &value, message),
			other => Err(unexpected(&other, message)),
		}
	}

	fn multi_select(
		&mut self,
		message: &str,
		choices: &[Choice],
		_defaults: &[usize],
	) -> InitResult<Vec<usize>> {
		match self.next(message)? {
			Reply::MultiSelect(values) => values
				.iter()
				.map(|value| index_of(choices, value, message))
				.collect(),
			other => Err(unexpected(&other, message)),
		}
	}

	fn reject(&mut self, reason: &str) {
		self.rejections.push(reason.to_string());
	}
}
