//! Step sequencer: runs the file-generating steps in order and checkpoints
//! after each one.
//!
//! After a step writes all of its files the checkpoint is moved to the next
//! step, so a later failure resumes exactly there. The last step clears the
//! checkpoint instead. A failing step leaves the previous checkpoint alone.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{InitError, InitResult};
use crate::generators::{GeneratedFile, Generators};
use crate::progress::{ProgressStore, WorkflowState};
use crate::steps::WorkflowStep;

/// Receives progress notifications while steps run.
///
/// All methods default to doing nothing.
pub trait StepReporter {
	/// Called once before the first step with the directory files go to.
	fn generation_started(&mut self, _project_path: &Path) {}

	fn step_started(&mut self, _step: WorkflowStep) {}

	/// `files` are the absolute paths written by the step.
	fn step_finished(&mut self, _step: WorkflowStep, _files: &[PathBuf]) {}

	fn step_skipped(&mut self, _step: WorkflowStep, _reason: &str) {}

	fn step_failed(&mut self, _step: WorkflowStep, _error: &InitError) {}
}

impl StepReporter for () {}

/// Executes generation steps against a project directory.
#[derive(Debug)]
pub struct StepSequencer<'a> {
	store: &'a ProgressStore,
	generators: Generators,
}

impl<'a> StepSequencer<'a> {
	pub fn new(store: &'a ProgressStore, generators: Generators) -> Self {
		Self { store, generators }
	}

	/// Run the current step and every later one.
	///
	/// Returns every path written, in order.
	pub fn run<R>(&self, state: &mut WorkflowState, reporter: &mut R) -> InitResult<Vec<PathBuf>>
	where
		R: StepReporter + ?Sized,
	{
		let steps: Vec<_> = state
			.current_step
			.remaining()
			.filter(|step| step.is_generation())
			.collect();

		reporter.generation_started(&state.project_path);
		let mut written = Vec::new();
		for step in steps {
			state.current_step = step;
			written.extend(self.run_step(state, reporter)?);
		}
		Ok(written)
	}

	/// Run `state.current_step`, then checkpoint its successor.
	pub fn run_step<R>(&self, state: &mut WorkflowState, reporter: &mut R) -> InitResult<Vec<PathBuf>>
	where
		R: StepReporter + ?Sized,
	{
		let step = state.current_step;
		tracing::info!(%step, "running step");
		reporter.step_started(step);

		let written = match self.execute(step, state) {
			Ok(written) => written,
			Err(e) => {
				tracing::debug!(%step, error = %e, "step failed");
				reporter.step_failed(step, &e);
				return Err(e);
			}
		};

		if written.is_empty() {
			reporter.step_skipped(step, skip_reason(step));
		} else {
			reporter.step_finished(step, &written);
		}

		match step.next() {
			Some(next) => {
				state.advance_to(next);
				self.store.save(state);
			}
			None => self.store.clear(),
		}
		Ok(written)
	}

	fn execute(&self, step: WorkflowStep, state: &WorkflowState) -> InitResult<Vec<PathBuf>> {
		let files = self.generators.files_for(step, &state.answers)?;
		let mut written = Vec::with_capacity(files.len());
		for file in files {
			let path = state.project_path.join(&file.path);
			write_file(&path, &file).map_err(|source| InitError::StepFailed {
				step,
				path: path.clone(),
				source,
			})?;
			tracing::debug!(path = %path.display(), "file written");
			written.push(path);
		}
		Ok(written)
	}
}

fn skip_reason(step: WorkflowStep) -> &'static str {
	match step {
		WorkflowStep::DeployScripts => "local deployment needs no deploy scripts",
		_ => "nothing to generate",
	}
}

/// Write `file` to `path`, overwriting, creating parent directories.
fn write_file(path: &Path, file: &GeneratedFile) -> io::Result<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)?;
	}
	fs::write(path, &file.content)?;

	#[cfg(unix)]
	{
		use std::os::unix::fs::PermissionsExt;
		if file.executable {
			fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
		}
	}

	Ok(())
}
