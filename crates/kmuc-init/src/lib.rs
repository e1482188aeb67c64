//! kmuc-init - resumable project initialization for kmuc-hoster
//!
//! Generates the Docker setup of a small web project (Dockerfile,
//! docker-compose.yml, .dockerignore, deploy scripts, nginx config,
//! `.env.example`, README) from a short interactive questionnaire.
//!
//! # Workflow
//!
//! 1. The target directory is checked; a filesystem root is refused.
//! 2. A saved checkpoint is offered for resumption.
//! 3. The main questions are asked and checkpointed.
//! 4. Questions specific to the deployment target are asked and checkpointed.
//! 5. Each generation step writes its files and checkpoints its successor.
//! 6. The checkpoint is removed once the README is written.
//!
//! An interrupted run continues at the first step that did not complete.
//!
//! # Example
//!
//! ```ignore
//! use kmuc_init::{InitOptions, ProgressStore, run_init};
//!
//! let store = ProgressStore::default_location();
//! let outcome = run_init(&InitOptions::default(), &mut prompter, &store, &mut ())?;
//! println!("wrote {} files", outcome.written.len());
//! ```

pub mod answers;
pub mod error;
pub mod generators;
pub mod progress;
pub mod questions;
pub mod sequencer;
pub mod steps;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod workflow;

pub use answers::{Answers, Database, Deployment, DeploymentTarget, ProjectType};
pub use error::{InitError, InitResult};
pub use generators::{GeneratedFile, Generators};
pub use progress::{ProgressStore, WorkflowState};
pub use questions::{Choice, Prompter};
pub use sequencer::{StepReporter, StepSequencer};
pub use steps::WorkflowStep;
pub use workflow::{InitOptions, InitOutcome, run_init};
