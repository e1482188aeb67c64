//! Terminal output: step spinners and the closing summary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use kmuc_init::{Answers, DeploymentTarget, InitError, InitOutcome, StepReporter, WorkflowStep};

const TEMPLATE_SPINNER: &str = "{spinner:.cyan} {msg}";

/// Shows one spinner per running step.
pub(crate) struct SpinnerReporter {
	spinner: Option<ProgressBar>,
	project_path: Option<PathBuf>,
}

impl SpinnerReporter {
	pub(crate) fn new() -> Self {
		Self {
			spinner: None,
			project_path: None,
		}
	}

	/// `file` relative to the directory generation runs in, once known.
	fn shown(&self, file: &Path) -> String {
		match &self.project_path {
			Some(base) => display_relative(file, base),
			None => file.display().to_string(),
		}
	}

	fn finish_spinner(&mut self) {
		if let Some(spinner) = self.spinner.take() {
			spinner.finish_and_clear();
		}
	}
}

impl StepReporter for SpinnerReporter {
	fn generation_started(&mut self, project_path: &Path) {
		self.project_path = Some(project_path.to_path_buf());
	}

	fn step_started(&mut self, step: WorkflowStep) {
		self.finish_spinner();
		let spinner = ProgressBar::new_spinner();
		spinner.set_style(
			ProgressStyle::default_spinner()
				.template(TEMPLATE_SPINNER)
				.unwrap_or_else(|_| ProgressStyle::default_spinner())
				.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
		);
		spinner.set_message(format!("Generating {}...", step_label(step)));
		spinner.enable_steady_tick(Duration::from_millis(100));
		self.spinner = Some(spinner);
	}

	fn step_finished(&mut self, _step: WorkflowStep, files: &[PathBuf]) {
		self.finish_spinner();
		for file in files {
			println!("{} {} created", "✓".green(), self.shown(file));
		}
	}

	fn step_skipped(&mut self, step: WorkflowStep, reason: &str) {
		self.finish_spinner();
		println!("{} {} skipped ({})", "-".dimmed(), step_label(step), reason);
	}

	fn step_failed(&mut self, step: WorkflowStep, error: &InitError) {
		if let Some(spinner) = self.spinner.take() {
			spinner.abandon();
		}
		eprintln!("{} {}: {}", "✗".red(), step_label(step), error);
	}
}

/// What a step produces, as shown to the user.
pub(crate) fn step_label(step: WorkflowStep) -> &'static str {
	match step {
		WorkflowStep::AdditionalQuestions => "deployment settings",
		WorkflowStep::Dockerfile => "Dockerfile",
		WorkflowStep::DockerCompose => "docker-compose.yml",
		WorkflowStep::Dockerignore => ".dockerignore",
		WorkflowStep::DeployScripts => "deploy scripts",
		WorkflowStep::EnvFile => ".env.example",
		WorkflowStep::Readme => "README.md",
	}
}

fn display_relative(path: &Path, base: &Path) -> String {
	path.strip_prefix(base)
		.unwrap_or(path)
		.display()
		.to_string()
}

/// Deployment commands worth mentioning after setup, with a description.
pub(crate) fn deployment_hints(answers: &Answers) -> Vec<(&'static str, &'static str)> {
	let mut hints = Vec::new();
	if !answers.is_remote() {
		return hints;
	}
	if answers.deployment_target() == DeploymentTarget::Cloud {
		hints.push(("./scripts/deploy-cloud.sh", "cloud provider notes"));
	} else {
		hints.push(("./scripts/deploy.sh", "deploy to the server"));
	}
	if answers.needs_ssl() {
		hints.push(("./scripts/setup-domain.sh", "set up domain and TLS"));
	}
	hints.push(("./scripts/docker-helpers.sh logs", "follow container logs"));
	hints
}

/// Commands that bring the generated setup up, with a description.
pub(crate) fn next_steps() -> [(&'static str, &'static str); 2] {
	[
		("cp .env.example .env", "then fill in the values"),
		("docker-compose up -d --build", "build and start all containers"),
	]
}

/// Print the created files and next steps after a successful run.
pub(crate) fn print_summary(outcome: &InitOutcome) {
	println!();
	println!("{}", "✅ Setup complete!".green().bold());
	if let Some(step) = outcome.resumed_from {
		println!("{}", format!("(resumed at {})", step_label(step)).dimmed());
	}
	println!();

	println!("{}", "Created files:".cyan());
	for file in &outcome.written {
		println!(
			"  {} {}",
			"✓".dimmed(),
			display_relative(file, &outcome.project_path).dimmed()
		);
	}

	println!();
	println!("{}", "Next steps:".cyan().bold());
	for (command, description) in next_steps() {
		println!("  {} {}", command.green().bold(), format!("- {description}").dimmed());
	}

	let hints = deployment_hints(&outcome.answers);
	if !hints.is_empty() {
		println!();
		println!("{}", "Deployment:".cyan().bold());
		for (command, description) in hints {
			println!("  {} {}", command, format!("- {description}").dimmed());
		}
	}
	println!();
}

#[cfg(test)]
mod tests {
	use super::*;
	use kmuc_init::answers::{CloudTarget, VpsTarget};
	use kmuc_init::{Deployment, ProjectType};
	use rstest::rstest;

	fn commands(answers: &Answers) -> Vec<&'static str> {
		deployment_hints(answers)
			.into_iter()
			.map(|(command, _)| command)
			.collect()
	}

	#[rstest]
	fn local_project_has_no_deployment_hints() {
		// Arrange
		let answers = Answers::new("shop", ProjectType::Express);

		// Act & Assert
		assert!(deployment_hints(&answers).is_empty());
	}

	#[rstest]
	fn vps_with_domain_mentions_domain_setup() {
		// Arrange
		let mut answers = Answers::new("shop", ProjectType::Express);
		answers.deployment = Deployment::Vps(VpsTarget {
			domain: Some("shop.example.com".into()),
			server: None,
		});

		// Act
		let hints = commands(&answers);

		// Assert
		assert_eq!(
			hints,
			vec![
				"./scripts/deploy.sh",
				"./scripts/setup-domain.sh",
				"./scripts/docker-helpers.sh logs"
			]
		);
	}

	#[rstest]
	fn cloud_points_at_cloud_script() {
		// Arrange
		let mut answers = Answers::new("shop", ProjectType::Express);
		answers.deployment = Deployment::Cloud(CloudTarget::default());

		// Act
		let hints = commands(&answers);

		// Assert
		assert_eq!(hints[0], "./scripts/deploy-cloud.sh");
		assert!(!hints.contains(&"./scripts/setup-domain.sh"));
	}

	#[rstest]
	fn created_files_are_shown_relative_to_project() {
		// Act
		let shown = display_relative(Path::new("/work/shop/scripts/deploy.sh"), Path::new("/work/shop"));

		// Assert
		assert_eq!(shown, "scripts/deploy.sh");
	}

	#[rstest]
	fn next_steps_end_with_compose_up() {
		// Act
		let steps = next_steps();

		// Assert
		assert_eq!(steps[0].0, "cp .env.example .env");
		assert_eq!(steps[1].0, "docker-compose up -d --build");
		assert!(steps.iter().all(|(command, _)| !command.starts_with("kmuc-hoster")));
	}

	#[rstest]
	fn written_files_are_shown_relative_to_generation_directory() {
		// Arrange
		let mut reporter = SpinnerReporter::new();
		let file = Path::new("/work/resumed/scripts/deploy.sh");

		// Act
		let before = reporter.shown(file);
		reporter.generation_started(Path::new("/work/resumed"));
		let after = reporter.shown(file);

		// Assert
		assert_eq!(before, "/work/resumed/scripts/deploy.sh");
		assert_eq!(after, "scripts/deploy.sh");
	}

	#[rstest]
	fn every_step_has_a_label() {
		for step in WorkflowStep::ALL {
			// Act & Assert
			assert!(!step_label(step).is_empty());
		}
	}
}
