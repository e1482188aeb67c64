//! The `init` workflow: guard, resume decision, questions, generation.

use std::path::{Component, Path, PathBuf};

use crate::answers::{AnswerMap, Answers};
use crate::error::{InitError, InitResult};
use crate::generators::Generators;
use crate::progress::{ProgressStore, WorkflowState};
use crate::questions::{Prompter, additional_questions, apply_derived_defaults, ask, project_questions};
use crate::sequencer::{StepReporter, StepSequencer};
use crate::steps::WorkflowStep;

/// Options for one `init` run.
#[derive(Debug, Clone)]
pub struct InitOptions {
	/// Project directory, relative to the current directory unless absolute.
	pub directory: PathBuf,
}

impl Default for InitOptions {
	fn default() -> Self {
		Self {
			directory: PathBuf::from("."),
		}
	}
}

/// Result of a completed `init` run.
#[derive(Debug, Clone)]
pub struct InitOutcome {
	pub answers: Answers,
	/// Directory the files were generated in.
	pub project_path: PathBuf,
	/// Every file written by this run, in order.
	pub written: Vec<PathBuf>,
	/// Step the run resumed from, when it continued a checkpoint.
	pub resumed_from: Option<WorkflowStep>,
}

/// Run the init workflow to completion.
///
/// A checkpoint is written after the main questions, after the deployment
/// questions and after every generation step. Any error after the first
/// checkpoint leaves it in place so a later run can resume.
///
/// # Errors
///
/// Returns [`InitError::UnsafeDirectory`] before anything else when the
/// target is a filesystem root, [`InitError::Cancelled`] when a prompt is
/// cancelled, and step errors from the sequencer.
pub fn run_init<P, R>(
	options: &InitOptions,
	prompter: &mut P,
	store: &ProgressStore,
	reporter: &mut R,
) -> InitResult<InitOutcome>
where
	P: Prompter + ?Sized,
	R: StepReporter + ?Sized,
{
	let directory = resolve_directory(&options.directory)?;
	ensure_safe_directory(&directory)?;

	let (mut state, resumed_from) = match resume_checkpoint(prompter, store)? {
		Some(state) => {
			ensure_safe_directory(&state.project_path)?;
			tracing::info!(
				step = %state.current_step,
				path = %state.project_path.display(),
				"resuming init"
			);
			let step = state.current_step;
			(state, Some(step))
		}
		None => (start_fresh(prompter, store, directory)?, None),
	};

	if state.current_step == WorkflowStep::AdditionalQuestions {
		ask_additional(&mut state, prompter, store)?;
	}

	let sequencer = StepSequencer::new(store, Generators::new()?);
	let written = sequencer.run(&mut state, reporter)?;

	Ok(InitOutcome {
		answers: state.answers,
		project_path: state.project_path,
		written,
		resumed_from,
	})
}

/// Offer to continue a saved checkpoint.
///
/// Returns the checkpoint when the user accepts. Declining clears it, and so
/// does finding one that cannot be read.
fn resume_checkpoint<P>(prompter: &mut P, store: &ProgressStore) -> InitResult<Option<WorkflowState>>
where
	P: Prompter + ?Sized,
{
	if !store.exists() {
		return Ok(None);
	}
	let Some(state) = store.load() else {
		tracing::warn!(path = %store.path().display(), "discarding unreadable checkpoint");
		store.clear();
		return Ok(None);
	};

	let question = format!(
		"Continue with the last project \"{}\"?",
		state.answers.project_name
	);
	if prompter.confirm(&question, true)? {
		Ok(Some(state))
	} else {
		store.clear();
		Ok(None)
	}
}

fn start_fresh<P>(prompter: &mut P, store: &ProgressStore, directory: PathBuf) -> InitResult<WorkflowState>
where
	P: Prompter + ?Sized,
{
	let mut collected = ask(&project_questions(), prompter, &AnswerMap::new())?;
	apply_derived_defaults(&mut collected);
	let answers = Answers::from_map(collected)?;

	let state = WorkflowState::new(answers, WorkflowStep::AdditionalQuestions, directory);
	store.save(&state);
	Ok(state)
}

fn ask_additional<P>(state: &mut WorkflowState, prompter: &mut P, store: &ProgressStore) -> InitResult<()>
where
	P: Prompter + ?Sized,
{
	let questions = additional_questions(state.answers.deployment_target());
	let extra = ask(&questions, prompter, &state.answers.to_map())?;
	state.answers = state.answers.merge(extra)?;
	state.advance_to(WorkflowStep::Dockerfile);
	store.save(state);
	Ok(())
}

/// Absolute, lexically normalized form of `directory`.
pub fn resolve_directory(directory: &Path) -> InitResult<PathBuf> {
	let absolute = if directory.is_absolute() {
		directory.to_path_buf()
	} else {
		std::env::current_dir()?.join(directory)
	};
	Ok(normalize(&absolute))
}

fn normalize(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				normalized.pop();
			}
			other => normalized.push(other.as_os_str()),
		}
	}
	normalized
}

/// Refuse to generate into a filesystem root.
pub fn ensure_safe_directory(path: &Path) -> InitResult<()> {
	if path.parent().is_none() {
		return Err(InitError::UnsafeDirectory {
			path: path.to_path_buf(),
		});
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::answers::{Database, DeploymentTarget, ProjectType};
	use crate::testing::{Reply, ScriptedPrompter};
	use rstest::{fixture, rstest};
	use tempfile::TempDir;

	struct Workspace {
		home: TempDir,
		project: TempDir,
	}

	impl Workspace {
		fn store(&self) -> ProgressStore {
			ProgressStore::at(self.home.path().join("progress.json"))
		}

		fn options(&self) -> InitOptions {
			InitOptions {
				directory: self.project.path().to_path_buf(),
			}
		}
	}

	#[fixture]
	fn workspace() -> Workspace {
		Workspace {
			home: tempfile::tempdir().unwrap(),
			project: tempfile::tempdir().unwrap(),
		}
	}

	fn local_replies() -> Vec<Reply> {
		vec![
			Reply::text("shop"),
			Reply::select("express"),
			Reply::confirm(true),
			Reply::select("none"),
			Reply::select("local"),
		]
	}

	#[rstest]
	#[case("/")]
	#[case("/tmp/..")]
	fn filesystem_root_is_refused(workspace: Workspace, #[case] directory: &str) {
		// Arrange
		let store = workspace.store();
		let mut prompter = ScriptedPrompter::new(local_replies());
		let options = InitOptions {
			directory: PathBuf::from(directory),
		};

		// Act
		let result = run_init(&options, &mut prompter, &store, &mut ());

		// Assert
		assert!(matches!(result, Err(InitError::UnsafeDirectory { .. })));
		assert!(prompter.messages().is_empty());
		assert!(!store.exists());
	}

	#[rstest]
	fn fresh_local_run_generates_all_files(workspace: Workspace) {
		// Arrange
		let store = workspace.store();
		let mut prompter = ScriptedPrompter::new(local_replies());

		// Act
		let outcome = run_init(&workspace.options(), &mut prompter, &store, &mut ()).unwrap();

		// Assert
		assert!(prompter.is_exhausted());
		assert_eq!(outcome.resumed_from, None);
		assert_eq!(outcome.answers.port, 3000);
		assert_eq!(outcome.answers.deployment_target(), DeploymentTarget::Local);
		assert_eq!(outcome.written.len(), 5);
		assert!(!store.exists());
	}

	#[rstest]
	fn vps_run_asks_server_questions(workspace: Workspace) {
		// Arrange
		let store = workspace.store();
		let mut prompter = ScriptedPrompter::new([
			Reply::text("shop"),
			Reply::select("node-basic"),
			Reply::confirm(false),
			Reply::text("8080"),
			Reply::select("redis"),
			Reply::select("vps"),
			Reply::confirm(false),
			Reply::text("203.0.113.7"),
			Reply::text(""),
			Reply::text(""),
		]);

		// Act
		let outcome = run_init(&workspace.options(), &mut prompter, &store, &mut ()).unwrap();

		// Assert
		assert!(prompter.is_exhausted());
		assert_eq!(outcome.answers.port, 8080);
		assert_eq!(outcome.answers.database, Database::Redis);
		let deploy = std::fs::read_to_string(workspace.project.path().join("scripts/deploy.sh")).unwrap();
		assert!(deploy.contains("SERVER_IP=\"203.0.113.7\""));
		assert!(deploy.contains("SERVER_USER=\"root\""));
		assert!(!workspace.project.path().join("nginx.conf").exists());
	}

	#[rstest]
	fn accepted_checkpoint_resumes_without_questions(workspace: Workspace) {
		// Arrange
		let store = workspace.store();
		let answers = Answers::new("shop", ProjectType::Static);
		let state = WorkflowState::new(
			answers,
			WorkflowStep::EnvFile,
			workspace.project.path().to_path_buf(),
		);
		store.save(&state);
		let mut prompter = ScriptedPrompter::new([Reply::confirm(true)]);

		// Act
		let outcome = run_init(&InitOptions::default(), &mut prompter, &store, &mut ()).unwrap();

		// Assert
		assert_eq!(prompter.messages(), ["Continue with the last project \"shop\"?"]);
		assert_eq!(outcome.resumed_from, Some(WorkflowStep::EnvFile));
		assert_eq!(outcome.project_path, workspace.project.path());
		assert_eq!(outcome.written.len(), 2);
		assert!(!workspace.project.path().join("Dockerfile").exists());
		assert!(!store.exists());
	}

	#[rstest]
	fn declined_checkpoint_starts_over(workspace: Workspace) {
		// Arrange
		let store = workspace.store();
		let state = WorkflowState::new(
			Answers::new("old", ProjectType::NextJs),
			WorkflowStep::Readme,
			PathBuf::from("/elsewhere/old"),
		);
		store.save(&state);
		let mut replies = vec![Reply::confirm(false)];
		replies.extend(local_replies());
		let mut prompter = ScriptedPrompter::new(replies);

		// Act
		let outcome = run_init(&workspace.options(), &mut prompter, &store, &mut ()).unwrap();

		// Assert
		assert_eq!(outcome.answers.project_name, "shop");
		assert_eq!(outcome.resumed_from, None);
		assert!(workspace.project.path().join("Dockerfile").is_file());
	}

	#[rstest]
	fn unreadable_checkpoint_is_discarded(workspace: Workspace) {
		// Arrange
		let store = workspace.store();
		std::fs::write(store.path(), "{ broken").unwrap();
		let mut prompter = ScriptedPrompter::new(local_replies());

		// Act
		let outcome = run_init(&workspace.options(), &mut prompter, &store, &mut ()).unwrap();

		// Assert
		assert_eq!(outcome.resumed_from, None);
		assert_eq!(prompter.messages()[0], "Project name:");
	}

	#[rstest]
	fn cancelled_questions_leave_no_checkpoint(workspace: Workspace) {
		// Arrange
		let store = workspace.store();
		let mut prompter = ScriptedPrompter::new([Reply::text("shop"), Reply::Cancel]);

		// Act
		let result = run_init(&workspace.options(), &mut prompter, &store, &mut ());

		// Assert
		assert!(matches!(result, Err(InitError::Cancelled)));
		assert!(!store.exists());
	}

	#[rstest]
	fn cancelled_additional_questions_keep_checkpoint(workspace: Workspace) {
		// Arrange
		let store = workspace.store();
		let mut prompter = ScriptedPrompter::new([
			Reply::text("shop"),
			Reply::select("express"),
			Reply::confirm(true),
			Reply::select("none"),
			Reply::select("cloud"),
			Reply::confirm(false),
			Reply::Cancel,
		]);

		// Act
		let result = run_init(&workspace.options(), &mut prompter, &store, &mut ());

		// Assert
		assert!(matches!(result, Err(InitError::Cancelled)));
		let saved = store.load().unwrap();
		assert_eq!(saved.current_step, WorkflowStep::AdditionalQuestions);
		assert_eq!(saved.answers.deployment_target(), DeploymentTarget::Cloud);
	}

	#[rstest]
	#[case("/work/./shop", "/work/shop")]
	#[case("/work/shop/../other", "/work/other")]
	#[case("/", "/")]
	fn directories_are_normalized(#[case] input: &str, #[case] expected: &str) {
		// Act
		let resolved = resolve_directory(Path::new(input)).unwrap();

		// Assert
		assert_eq!(resolved, PathBuf::from(expected));
	}

	#[rstest]
	fn relative_directory_resolves_against_current_dir() {
		// Act
		let resolved = resolve_directory(Path::new("shop")).unwrap();

		// Assert
		assert!(resolved.is_absolute());
		assert!(resolved.ends_with("shop"));
	}
}
