//! The ordered steps of the init workflow.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A checkpointable position in the init workflow.
///
/// Variants are declared in execution order; the derived `Ord` is the
/// workflow order. A persisted step always names the step to run next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStep {
	/// Deployment-target specific questions are still outstanding.
	AdditionalQuestions,
	/// Older checkpoints recorded a separate directory step before the Dockerfile.
	#[serde(alias = "create-directory")]
	Dockerfile,
	DockerCompose,
	Dockerignore,
	DeployScripts,
	EnvFile,
	Readme,
}

impl WorkflowStep {
	/// All steps in execution order.
	pub const ALL: [WorkflowStep; 7] = [
		Self::AdditionalQuestions,
		Self::Dockerfile,
		Self::DockerCompose,
		Self::Dockerignore,
		Self::DeployScripts,
		Self::EnvFile,
		Self::Readme,
	];

	/// The step that follows this one, or `None` after the last step.
	pub fn next(self) -> Option<Self> {
		let index = Self::ALL.iter().position(|step| *step == self)?;
		Self::ALL.get(index + 1).copied()
	}

	/// This step and every step after it.
	pub fn remaining(self) -> impl Iterator<Item = WorkflowStep> {
		Self::ALL.into_iter().filter(move |step| *step >= self)
	}

	/// Whether the step produces files.
	pub fn is_generation(self) -> bool {
		self != Self::AdditionalQuestions
	}

	/// Checkpoint token, as written to the progress file.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::AdditionalQuestions => "additional-questions",
			Self::Dockerfile => "dockerfile",
			Self::DockerCompose => "docker-compose",
			Self::Dockerignore => "dockerignore",
			Self::DeployScripts => "deploy-scripts",
			Self::EnvFile => "env-file",
			Self::Readme => "readme",
		}
	}
}

impl fmt::Display for WorkflowStep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(WorkflowStep::AdditionalQuestions, Some(WorkflowStep::Dockerfile))]
	#[case(WorkflowStep::Dockerfile, Some(WorkflowStep::DockerCompose))]
	#[case(WorkflowStep::DockerCompose, Some(WorkflowStep::Dockerignore))]
	#[case(WorkflowStep::Dockerignore, Some(WorkflowStep::DeployScripts))]
	#[case(WorkflowStep::DeployScripts, Some(WorkflowStep::EnvFile))]
	#[case(WorkflowStep::EnvFile, Some(WorkflowStep::Readme))]
	#[case(WorkflowStep::Readme, None)]
	fn successor_follows_workflow_order(
		#[case] step: WorkflowStep,
		#[case] expected: Option<WorkflowStep>,
	) {
		// Act
		let next = step.next();

		// Assert
		assert_eq!(next, expected);
	}

	#[rstest]
	fn remaining_starts_at_given_step() {
		// Act
		let remaining: Vec<_> = WorkflowStep::DeployScripts.remaining().collect();

		// Assert
		assert_eq!(
			remaining,
			vec![
				WorkflowStep::DeployScripts,
				WorkflowStep::EnvFile,
				WorkflowStep::Readme
			]
		);
	}

	#[rstest]
	fn tokens_match_serde_names() {
		for step in WorkflowStep::ALL {
			// Act
			let json = serde_json::to_string(&step).unwrap();

			// Assert
			assert_eq!(json, format!("\"{}\"", step.as_str()));
		}
	}

	#[rstest]
	fn legacy_create_directory_token_resumes_at_dockerfile() {
		// Act
		let step: WorkflowStep = serde_json::from_str("\"create-directory\"").unwrap();

		// Assert
		assert_eq!(step, WorkflowStep::Dockerfile);
	}

	#[rstest]
	fn unknown_token_is_rejected() {
		// Act
		let result = serde_json::from_str::<WorkflowStep>("\"publish\"");

		// Assert
		assert!(result.is_err());
	}
}
