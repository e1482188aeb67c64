//! Question flow engine and the init question groups.
//!
//! Questions are asked strictly in declaration order. A question whose `when`
//! predicate is false is skipped and leaves no key behind, so later logic can
//! rely on key presence. Text input that fails validation is re-asked after the
//! rejection reason has been shown; validation never aborts the flow.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::answers::{
	AnswerMap, CloudProvider, Database, DeploymentTarget, ProjectType, default_port_for,
};
use crate::error::{InitError, InitResult};

/// One entry of a single- or multi-select question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
	/// Value stored in the answers.
	pub value: &'static str,
	/// Text shown in the menu.
	pub label: &'static str,
}

impl Choice {
	pub const fn new(value: &'static str, label: &'static str) -> Self {
		Self { value, label }
	}
}

impl fmt::Display for Choice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label)
	}
}

/// How a question is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
	Text,
	Select(Vec<Choice>),
	MultiSelect(Vec<Choice>),
	Confirm,
	/// Text input that is not echoed.
	Password,
}

/// Pure check over raw text input; `Err` carries the message shown to the user.
pub type Validator = fn(&str) -> Result<(), String>;

/// Predicate over the answers collected so far.
pub type When = fn(&AnswerMap) -> bool;

#[derive(Debug, Clone)]
enum Message {
	Static(&'static str),
	Computed(fn(&AnswerMap) -> String),
}

#[derive(Debug, Clone)]
enum DefaultValue {
	Static(Value),
	Computed(fn(&AnswerMap) -> Value),
}

/// A single interactive question.
#[derive(Debug, Clone)]
pub struct Question {
	key: &'static str,
	kind: QuestionKind,
	message: Message,
	default: Option<DefaultValue>,
	validate: Option<Validator>,
	when: Option<When>,
}

impl Question {
	fn new(key: &'static str, kind: QuestionKind, message: &'static str) -> Self {
		Self {
			key,
			kind,
			message: Message::Static(message),
			default: None,
			validate: None,
			when: None,
		}
	}

	pub fn text(key: &'static str, message: &'static str) -> Self {
		Self::new(key, QuestionKind::Text, message)
	}

	pub fn password(key: &'static str, message: &'static str) -> Self {
		Self::new(key, QuestionKind::Password, message)
	}

	pub fn confirm(key: &'static str, message: &'static str) -> Self {
		Self::new(key, QuestionKind::Confirm, message)
	}

	pub fn select(key: &'static str, message: &'static str, choices: Vec<Choice>) -> Self {
		Self::new(key, QuestionKind::Select(choices), message)
	}

	pub fn multi_select(key: &'static str, message: &'static str, choices: Vec<Choice>) -> Self {
		Self::new(key, QuestionKind::MultiSelect(choices), message)
	}

	/// Replace the static message with one computed from earlier answers.
	pub fn message_with(mut self, message: fn(&AnswerMap) -> String) -> Self {
		self.message = Message::Computed(message);
		self
	}

	pub fn default_value(mut self, value: impl Into<Value>) -> Self {
		self.default = Some(DefaultValue::Static(value.into()));
		self
	}

	/// Default computed from earlier answers.
	pub fn default_with(mut self, value: fn(&AnswerMap) -> Value) -> Self {
		self.default = Some(DefaultValue::Computed(value));
		self
	}

	pub fn validate(mut self, validator: Validator) -> Self {
		self.validate = Some(validator);
		self
	}

	/// Only ask when `predicate` holds for the answers collected so far.
	pub fn when(mut self, predicate: When) -> Self {
		self.when = Some(predicate);
		self
	}

	pub fn key(&self) -> &'static str {
		self.key
	}

	pub fn kind(&self) -> &QuestionKind {
		&self.kind
	}

	fn message(&self, answers: &AnswerMap) -> String {
		match &self.message {
			Message::Static(message) => (*message).to_string(),
			Message::Computed(message) => message(answers),
		}
	}

	fn default(&self, answers: &AnswerMap) -> Option<Value> {
		match &self.default {
			None => None,
			Some(DefaultValue::Static(value)) => Some(value.clone()),
			Some(DefaultValue::Computed(value)) => Some(value(answers)),
		}
	}

	fn applies(&self, answers: &AnswerMap) -> bool {
		self.when.is_none_or(|when| when(answers))
	}
}

/// Terminal (or scripted) input source for questions.
pub trait Prompter {
	/// Free text input. An empty reply means "take the default".
	fn text(&mut self, message: &str, default: Option<&str>) -> InitResult<String>;

	/// Masked text input.
	fn password(&mut self, message: &str) -> InitResult<String>;

	fn confirm(&mut self, message: &str, default: bool) -> InitResult<bool>;

	/// Pick one entry; returns its index into `choices`.
	fn select(&mut self, message: &str, choices: &[Choice], default: usize) -> InitResult<usize>;

	/// Pick any number of entries; returns their indices into `choices`.
	fn multi_select(
		&mut self,
		message: &str,
		choices: &[Choice],
		defaults: &[usize],
	) -> InitResult<Vec<usize>>;

	/// Show why the last input was rejected.
	fn reject(&mut self, reason: &str);
}

/// Ask `questions` in order and return the new answers.
///
/// `context` holds answers from earlier groups; `when` predicates and
/// computed defaults see it together with the answers collected here.
pub fn ask<P>(questions: &[Question], prompter: &mut P, context: &AnswerMap) -> InitResult<AnswerMap>
where
	P: Prompter + ?Sized,
{
	let mut seen = context.clone();
	let mut collected = AnswerMap::new();

	for question in questions {
		if !question.applies(&seen) {
			tracing::debug!(key = question.key, "question skipped");
			continue;
		}
		let value = ask_one(question, prompter, &seen)?;
		seen.insert(question.key.to_string(), value.clone());
		collected.insert(question.key.to_string(), value);
	}

	Ok(collected)
}

fn ask_one<P>(question: &Question, prompter: &mut P, answers: &AnswerMap) -> InitResult<Value>
where
	P: Prompter + ?Sized,
{
	let message = question.message(answers);
	let default = question.default(answers);

	match &question.kind {
		QuestionKind::Text | QuestionKind::Password => {
			let default_text = default.as_ref().and_then(value_as_text);
			loop {
				let input = if question.kind == QuestionKind::Password {
					prompter.password(&message)?
				} else {
					prompter.text(&message, default_text.as_deref())?
				};
				let input = match (input.trim().is_empty(), &default_text) {
					(true, Some(default)) => default.clone(),
					_ => input.trim().to_string(),
				};
				match question.validate.map_or(Ok(()), |validate| validate(&input)) {
					Ok(()) => return Ok(Value::String(input)),
					Err(reason) => prompter.reject(&reason),
				}
			}
		}
		QuestionKind::Confirm => {
			let default = default.and_then(|value| value.as_bool()).unwrap_or(false);
			prompter.confirm(&message, default).map(Value::Bool)
		}
		QuestionKind::Select(choices) => {
			let default = default
				.as_ref()
				.and_then(|value| value.as_str())
				.and_then(|value| choices.iter().position(|choice| choice.value == value))
				.unwrap_or(0);
			let index = prompter.select(&message, choices, default)?;
			let choice = choices.get(index).ok_or_else(|| InitError::Prompt {
				message: format!("selection {index} out of range for '{}'", question.key),
			})?;
			Ok(Value::String(choice.value.to_string()))
		}
		QuestionKind::MultiSelect(choices) => {
			let defaults: Vec<usize> = match &default {
				Some(Value::Array(values)) => values
					.iter()
					.filter_map(|value| value.as_str())
					.filter_map(|value| choices.iter().position(|choice| choice.value == value))
					.collect(),
				_ => Vec::new(),
			};
			let indices = prompter.multi_select(&message, choices, &defaults)?;
			let mut values = Vec::with_capacity(indices.len());
			for index in indices {
				let choice = choices.get(index).ok_or_else(|| InitError::Prompt {
					message: format!("selection {index} out of range for '{}'", question.key),
				})?;
				values.push(Value::String(choice.value.to_string()));
			}
			Ok(Value::Array(values))
		}
	}
}

fn value_as_text(value: &Value) -> Option<String> {
	match value {
		Value::String(text) => Some(text.clone()),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}

static PROJECT_NAME_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("valid project name pattern"));
static DOMAIN_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[a-z0-9.-]+\.[a-z]{2,}$").expect("valid domain pattern"));
static IPV4_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?:[0-9]{1,3}\.){3}[0-9]{1,3}$").expect("valid ip address pattern")
});

pub fn validate_project_name(input: &str) -> Result<(), String> {
	if PROJECT_NAME_RE.is_match(input) {
		Ok(())
	} else {
		Err("Project name may only contain lowercase letters, digits and hyphens".to_string())
	}
}

pub fn validate_port(input: &str) -> Result<(), String> {
	match input.parse::<u32>() {
		Ok(port) if (1..65536).contains(&port) => Ok(()),
		_ => Err("Port must be between 1 and 65535".to_string()),
	}
}

pub fn validate_domain(input: &str) -> Result<(), String> {
	if DOMAIN_RE.is_match(input) {
		Ok(())
	} else {
		Err("Please enter a valid domain".to_string())
	}
}

pub fn validate_ip_address(input: &str) -> Result<(), String> {
	if IPV4_RE.is_match(input) {
		Ok(())
	} else {
		Err("Please enter a valid IP address".to_string())
	}
}

fn project_type_of(answers: &AnswerMap) -> &str {
	answers
		.get("projectType")
		.and_then(Value::as_str)
		.unwrap_or_default()
}

fn is_truthy(answers: &AnswerMap, key: &str) -> bool {
	answers.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// The main question group asked on every fresh run.
pub fn project_questions() -> Vec<Question> {
	vec![
		Question::text("projectName", "Project name:")
			.default_value("my-app")
			.validate(validate_project_name),
		Question::select(
			"projectType",
			"What kind of project?",
			ProjectType::ALL
				.iter()
				.map(|t| Choice::new(t.as_str(), t.label()))
				.collect(),
		),
		Question::confirm("useDefaultPort", "Use the default port?")
			.message_with(|answers| {
				format!(
					"Use the default port {}?",
					default_port_for(project_type_of(answers))
				)
			})
			.default_value(true),
		Question::text("port", "Which port?")
			.when(|answers| !is_truthy(answers, "useDefaultPort"))
			.default_with(|answers| Value::String(default_port_for(project_type_of(answers)).to_string()))
			.validate(validate_port),
		Question::select(
			"database",
			"Database?",
			Database::ALL
				.iter()
				.map(|db| Choice::new(db.as_str(), db.label()))
				.collect(),
		)
		.default_value(Database::None.as_str()),
		Question::select(
			"deploymentTarget",
			"Deployment target?",
			DeploymentTarget::ALL
				.iter()
				.map(|target| Choice::new(target.as_str(), target.label()))
				.collect(),
		)
		.default_value(DeploymentTarget::Local.as_str()),
		Question::confirm("needsDomain", "Set up a domain with SSL?")
			.default_value(false)
			.when(|answers| {
				answers.get("deploymentTarget").and_then(Value::as_str)
					!= Some(DeploymentTarget::Local.as_str())
			}),
		Question::text("domain", "Domain (e.g. example.com):")
			.when(|answers| is_truthy(answers, "needsDomain"))
			.validate(validate_domain),
	]
}

/// Questions for the `vps` deployment target.
pub fn vps_questions() -> Vec<Question> {
	vec![
		Question::text("serverIP", "Server IP address:").validate(validate_ip_address),
		Question::text("serverUser", "SSH user:").default_value("root"),
		Question::text("serverPort", "SSH port:")
			.default_value("22")
			.validate(validate_port),
	]
}

/// Questions for the `cloud` deployment target.
pub fn cloud_questions() -> Vec<Question> {
	vec![Question::select(
		"cloudProvider",
		"Which cloud provider do you want to use?",
		CloudProvider::ALL
			.iter()
			.map(|provider| Choice::new(provider.as_str(), provider.label()))
			.collect(),
	)]
}

/// Follow-up questions for a deployment target; empty for `local`.
pub fn additional_questions(target: DeploymentTarget) -> Vec<Question> {
	match target {
		DeploymentTarget::Local => Vec::new(),
		DeploymentTarget::Vps => vps_questions(),
		DeploymentTarget::Cloud => cloud_questions(),
	}
}

/// Fill in answers derived from the main question group.
///
/// Without an explicit `port`, the project type's default port is used.
/// `needsDatabase` is set whenever a database other than `none` was chosen.
pub fn apply_derived_defaults(answers: &mut AnswerMap) {
	if !answers.contains_key("port") {
		let port = default_port_for(project_type_of(answers));
		answers.insert("port".to_string(), Value::String(port.to_string()));
	}
	let needs_database = answers
		.get("database")
		.and_then(Value::as_str)
		.is_some_and(|database| database != Database::None.as_str());
	answers.insert("needsDatabase".to_string(), Value::Bool(needs_database));
}
