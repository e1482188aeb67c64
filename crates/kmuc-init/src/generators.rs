//! File generators for the init workflow.
//!
//! Every generated file comes from a Tera template embedded at build time.
//! Generators are pure: the same [`Answers`] always render the same content.

use std::path::PathBuf;

use tera::{Context, Tera};

use crate::answers::{Answers, CloudProvider, Deployment, DeploymentTarget, ServerAccess};
use crate::error::{InitError, InitResult};
use crate::steps::WorkflowStep;

/// Embedded project templates.
#[derive(rust_embed::RustEmbed)]
#[folder = "templates/"]
struct ProjectTemplates;

/// Static `.dockerignore` content, stored as-is.
const DOCKERIGNORE: &str = "dockerignore";

/// Placeholder server settings for VPS scripts rendered before the VPS
/// questions were answered.
const PLACEHOLDER_SERVER_IP: &str = "YOUR_SERVER_IP";
const DEFAULT_SERVER_USER: &str = "root";
const DEFAULT_SERVER_PORT: &str = "22";

/// A rendered file, relative to the project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
	pub path: PathBuf,
	pub content: String,
	/// Written with mode 0o755 on Unix.
	pub executable: bool,
}

impl GeneratedFile {
	fn regular(path: impl Into<PathBuf>, content: String) -> Self {
		Self {
			path: path.into(),
			content,
			executable: false,
		}
	}

	fn script(path: impl Into<PathBuf>, content: String) -> Self {
		Self {
			path: path.into(),
			content,
			executable: true,
		}
	}
}

/// Renders project files from the embedded templates.
pub struct Generators {
	tera: Tera,
}

impl std::fmt::Debug for Generators {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Generators").finish_non_exhaustive()
	}
}

impl Generators {
	/// Load and parse all embedded templates.
	///
	/// # Errors
	///
	/// Returns [`InitError::Template`] when a template does not parse.
	pub fn new() -> InitResult<Self> {
		Ok(Self {
			tera: load_project_templates()?,
		})
	}

	/// Files produced by `step`. Empty when the step does not apply.
	pub fn files_for(&self, step: WorkflowStep, answers: &Answers) -> InitResult<Vec<GeneratedFile>> {
		let files = match step {
			WorkflowStep::AdditionalQuestions => Vec::new(),
			WorkflowStep::Dockerfile => {
				vec![GeneratedFile::regular("Dockerfile", self.dockerfile(answers)?)]
			}
			WorkflowStep::DockerCompose => vec![GeneratedFile::regular(
				"docker-compose.yml",
				self.docker_compose(answers)?,
			)],
			WorkflowStep::Dockerignore => {
				vec![GeneratedFile::regular(".dockerignore", self.dockerignore()?)]
			}
			WorkflowStep::DeployScripts => self.deploy_scripts(answers)?,
			WorkflowStep::EnvFile => {
				vec![GeneratedFile::regular(".env.example", self.env_example(answers)?)]
			}
			WorkflowStep::Readme => vec![GeneratedFile::regular("README.md", self.readme(answers)?)],
		};
		Ok(files)
	}

	pub fn dockerfile(&self, answers: &Answers) -> InitResult<String> {
		self.render(
			&format!("dockerfile/{}.tera", answers.project_type.as_str()),
			answers,
		)
	}

	pub fn docker_compose(&self, answers: &Answers) -> InitResult<String> {
		self.render("docker-compose.yml.tera", answers)
	}

	pub fn dockerignore(&self) -> InitResult<String> {
		embedded_text(DOCKERIGNORE)
	}

	pub fn vps_deploy_script(&self, answers: &Answers) -> InitResult<String> {
		self.render("scripts/deploy.sh.tera", answers)
	}

	pub fn cloud_deploy_script(&self, answers: &Answers) -> InitResult<String> {
		self.render("scripts/deploy-cloud.sh.tera", answers)
	}

	pub fn docker_helpers(&self, answers: &Answers) -> InitResult<String> {
		self.render("scripts/docker-helpers.sh.tera", answers)
	}

	pub fn domain_setup_script(&self, answers: &Answers) -> InitResult<String> {
		self.render("scripts/setup-domain.sh.tera", answers)
	}

	pub fn nginx_config(&self, answers: &Answers) -> InitResult<String> {
		self.render("nginx.conf.tera", answers)
	}

	pub fn env_example(&self, answers: &Answers) -> InitResult<String> {
		self.render("env.example.tera", answers)
	}

	pub fn readme(&self, answers: &Answers) -> InitResult<String> {
		self.render("README.md.tera", answers)
	}

	/// Deploy scripts for remote targets. Local projects get none.
	fn deploy_scripts(&self, answers: &Answers) -> InitResult<Vec<GeneratedFile>> {
		let mut files = Vec::new();
		match answers.deployment_target() {
			DeploymentTarget::Local => return Ok(files),
			DeploymentTarget::Vps => files.push(GeneratedFile::script(
				"scripts/deploy.sh",
				self.vps_deploy_script(answers)?,
			)),
			DeploymentTarget::Cloud => files.push(GeneratedFile::script(
				"scripts/deploy-cloud.sh",
				self.cloud_deploy_script(answers)?,
			)),
		}
		if answers.needs_ssl() {
			files.push(GeneratedFile::script(
				"scripts/setup-domain.sh",
				self.domain_setup_script(answers)?,
			));
		}
		if answers.needs_reverse_proxy() {
			files.push(GeneratedFile::regular("nginx.conf", self.nginx_config(answers)?));
		}
		files.push(GeneratedFile::script(
			"scripts/docker-helpers.sh",
			self.docker_helpers(answers)?,
		));
		Ok(files)
	}

	fn render(&self, template: &str, answers: &Answers) -> InitResult<String> {
		let rendered = self.tera.render(template, &template_context(answers))?;
		Ok(rendered)
	}
}

/// Load all `.tera` templates from embedded resources.
fn load_project_templates() -> InitResult<Tera> {
	let mut tera = Tera::default();

	for file_path in ProjectTemplates::iter().filter(|path| path.ends_with(".tera")) {
		let content = embedded_text(&file_path)?;
		tera.add_raw_template(&file_path, &content)?;
	}

	Ok(tera)
}

fn embedded_text(name: &str) -> InitResult<String> {
	let file = ProjectTemplates::get(name).ok_or_else(|| InitError::TemplateNotFound {
		name: name.to_string(),
	})?;
	String::from_utf8(file.data.into_owned()).map_err(|_| InitError::TemplateNotFound {
		name: name.to_string(),
	})
}

/// Flatten the answers into the variables the templates use.
///
/// Every variable is always present so templates can test them with `if`.
fn template_context(answers: &Answers) -> Context {
	let mut ctx = Context::new();
	ctx.insert("project_name", &answers.project_name);
	ctx.insert("project_type", answers.project_type.as_str());
	ctx.insert("port", &answers.port);
	ctx.insert("database", answers.database.as_str());
	ctx.insert("needs_database", &answers.needs_database());
	ctx.insert("deployment_target", answers.deployment_target().as_str());
	ctx.insert("is_remote", &answers.is_remote());
	ctx.insert("domain", answers.domain().unwrap_or_default());
	ctx.insert("needs_ssl", &answers.needs_ssl());

	let server = match &answers.deployment {
		Deployment::Vps(vps) => vps.server.as_ref(),
		_ => None,
	};
	let (server_ip, server_user, server_port) = match server {
		Some(ServerAccess { ip, user, port }) => (ip.as_str(), user.as_str(), port.as_str()),
		None => (PLACEHOLDER_SERVER_IP, DEFAULT_SERVER_USER, DEFAULT_SERVER_PORT),
	};
	ctx.insert("server_ip", server_ip);
	ctx.insert("server_user", server_user);
	ctx.insert("server_port", server_port);

	let provider = match &answers.deployment {
		Deployment::Cloud(cloud) => cloud.provider.unwrap_or(CloudProvider::Generic),
		_ => CloudProvider::Generic,
	};
	ctx.insert("cloud_provider", provider.as_str());

	ctx
}
