//! Error types for the init workflow.

use std::path::PathBuf;

use thiserror::Error;

use crate::steps::WorkflowStep;

/// Errors that can occur while running the init workflow.
#[derive(Debug, Error)]
pub enum InitError {
	/// The target directory is a filesystem root.
	#[error("refusing to initialize a project in the filesystem root ({})", path.display())]
	UnsafeDirectory {
		/// Directory that was rejected.
		path: PathBuf,
	},

	/// A generation step could not write one of its files.
	#[error("step '{step}' failed to write {}: {source}", path.display())]
	StepFailed {
		/// Step that was running.
		step: WorkflowStep,
		/// File that could not be written.
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Template rendering failed.
	#[error("template error: {0}")]
	Template(#[from] tera::Error),

	/// An embedded template is missing or not valid UTF-8.
	#[error("template not available: {name}")]
	TemplateNotFound {
		/// Name of the embedded template.
		name: String,
	},

	/// Collected answers do not form a consistent configuration.
	#[error("invalid answers: {message}")]
	InvalidAnswers {
		/// Description of the inconsistency.
		message: String,
	},

	/// The interactive prompt could not be shown or read.
	#[error("prompt failed: {message}")]
	Prompt {
		/// Message from the prompt backend.
		message: String,
	},

	/// The user cancelled an interactive prompt.
	#[error("cancelled by user")]
	Cancelled,

	/// I/O operation failed.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// Result type alias for init workflow operations.
pub type InitResult<T> = Result<T, InitError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn step_failure_names_step_and_file() {
		// Arrange
		let err = InitError::StepFailed {
			step: WorkflowStep::DockerCompose,
			path: PathBuf::from("docker-compose.yml"),
			source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
		};

		// Act
		let message = err.to_string();

		// Assert
		assert!(message.contains("docker-compose"));
		assert!(message.contains("docker-compose.yml"));
	}

	#[rstest]
	fn unsafe_directory_names_the_path() {
		// Arrange
		let err = InitError::UnsafeDirectory {
			path: PathBuf::from("/"),
		};

		// Act
		let message = err.to_string();

		// Assert
		assert_eq!(
			message,
			"refusing to initialize a project in the filesystem root (/)"
		);
	}
}
