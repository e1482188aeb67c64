//! Checkpoint persistence for the init workflow.
//!
//! A single [`WorkflowState`] is kept in one JSON file per user
//! (`~/.kmuc/.kmuc-progress.json` by default). There is exactly one slot for
//! the whole machine/account, not one per project, and no locking: two `init`
//! runs at the same time race on the same file.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::answers::Answers;
use crate::steps::WorkflowStep;

/// Directory under the home directory holding tool state.
pub const CONFIG_DIR_NAME: &str = ".kmuc";

/// File name of the checkpoint inside [`CONFIG_DIR_NAME`].
pub const PROGRESS_FILE_NAME: &str = ".kmuc-progress.json";

/// Persisted position of an init run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
	pub answers: Answers,
	/// Next step to attempt.
	pub current_step: WorkflowStep,
	pub project_path: PathBuf,
	/// Time of the last checkpoint. Informational only.
	pub timestamp: DateTime<Utc>,
}

impl WorkflowState {
	pub fn new(answers: Answers, current_step: WorkflowStep, project_path: PathBuf) -> Self {
		Self {
			answers,
			current_step,
			project_path,
			timestamp: Utc::now(),
		}
	}

	/// Move the state to `step` and refresh the timestamp.
	pub fn advance_to(&mut self, step: WorkflowStep) {
		self.current_step = step;
		self.timestamp = Utc::now();
	}
}

/// Single-slot checkpoint store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct ProgressStore {
	path: PathBuf,
}

impl ProgressStore {
	/// Store at an explicit file location.
	pub fn at(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Store at the per-user default location.
	///
	/// Falls back to the temp directory when no home directory is known.
	pub fn default_location() -> Self {
		let base = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
		Self::at(base.join(CONFIG_DIR_NAME).join(PROGRESS_FILE_NAME))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Persist `state`, overwriting any previous checkpoint.
	///
	/// A failed write is logged and otherwise ignored; the run continues
	/// without durability.
	pub fn save(&self, state: &WorkflowState) {
		match self.try_save(state) {
			Ok(()) => tracing::debug!(
				step = %state.current_step,
				path = %self.path.display(),
				"checkpoint saved"
			),
			Err(e) => tracing::warn!(
				path = %self.path.display(),
				error = %e,
				"progress could not be saved; this run will not be resumable"
			),
		}
	}

	/// Persist `state`, reporting write failures to the caller.
	pub fn try_save(&self, state: &WorkflowState) -> io::Result<()> {
		if let Some(parent) = self.path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let json = serde_json::to_string_pretty(state).map_err(io::Error::other)?;
		std::fs::write(&self.path, json)
	}

	/// Read the checkpoint, or `None` when it is missing or unreadable.
	pub fn load(&self) -> Option<WorkflowState> {
		let data = match std::fs::read_to_string(&self.path) {
			Ok(data) => data,
			Err(e) => {
				tracing::debug!(path = %self.path.display(), error = %e, "no checkpoint");
				return None;
			}
		};
		match serde_json::from_str(&data) {
			Ok(state) => Some(state),
			Err(e) => {
				tracing::debug!(path = %self.path.display(), error = %e, "ignoring malformed checkpoint");
				None
			}
		}
	}

	/// Whether a checkpoint file is present. Does not parse it.
	pub fn exists(&self) -> bool {
		self.path.is_file()
	}

	/// Delete the checkpoint. Succeeds when there is none.
	pub fn clear(&self) {
		match std::fs::remove_file(&self.path) {
			Ok(()) => tracing::debug!(path = %self.path.display(), "checkpoint cleared"),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {}
			Err(e) => tracing::warn!(
				path = %self.path.display(),
				error = %e,
				"checkpoint could not be removed"
			),
		}
	}
}
