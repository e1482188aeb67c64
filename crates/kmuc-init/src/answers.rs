//! The configuration collected by the init questions.
//!
//! [`Answers`] is the typed record every generator reads. On disk (inside the
//! progress checkpoint) it is stored as a flat camelCase key map, where a
//! missing key means the question was never asked. [`RawAnswers`] is that
//! on-disk shape; conversion between the two enforces that deployment-specific
//! answers only exist for the deployment target that asks for them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{InitError, InitResult};

/// Key/value bag produced by the question engine before it is typed.
pub type AnswerMap = Map<String, Value>;

/// Port used for project types without a known default.
pub const FALLBACK_PORT: u16 = 3000;

/// Default application port for a project type token.
///
/// Unknown tokens fall back to [`FALLBACK_PORT`].
pub fn default_port_for(project_type: &str) -> u16 {
	match project_type {
		"express" | "nextjs" | "node-basic" => 3000,
		"react-vite" => 5173,
		"static" => 80,
		_ => FALLBACK_PORT,
	}
}

/// Kind of application being containerized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectType {
	#[serde(rename = "express")]
	Express,
	#[serde(rename = "nextjs")]
	NextJs,
	#[serde(rename = "react-vite")]
	ReactVite,
	#[serde(rename = "node-basic")]
	NodeBasic,
	#[serde(rename = "static")]
	Static,
}

impl ProjectType {
	pub const ALL: [ProjectType; 5] = [
		Self::Express,
		Self::NextJs,
		Self::ReactVite,
		Self::NodeBasic,
		Self::Static,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Express => "express",
			Self::NextJs => "nextjs",
			Self::ReactVite => "react-vite",
			Self::NodeBasic => "node-basic",
			Self::Static => "static",
		}
	}

	/// Human-readable name shown in the project type menu.
	pub fn label(self) -> &'static str {
		match self {
			Self::Express => "Node.js Express API",
			Self::NextJs => "Next.js (React)",
			Self::ReactVite => "React SPA (Vite)",
			Self::NodeBasic => "Node.js (basic)",
			Self::Static => "Static website (nginx)",
		}
	}

	pub fn default_port(self) -> u16 {
		default_port_for(self.as_str())
	}
}

impl fmt::Display for ProjectType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Database service started next to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
	#[default]
	None,
	Postgres,
	MongoDb,
	Redis,
	MySql,
}

impl Database {
	pub const ALL: [Database; 5] = [
		Self::None,
		Self::Postgres,
		Self::MongoDb,
		Self::Redis,
		Self::MySql,
	];

	/// Token used in answers, compose service names and volume names.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Postgres => "postgres",
			Self::MongoDb => "mongodb",
			Self::Redis => "redis",
			Self::MySql => "mysql",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::None => "No database",
			Self::Postgres => "PostgreSQL",
			Self::MongoDb => "MongoDB",
			Self::Redis => "Redis (cache)",
			Self::MySql => "MySQL",
		}
	}
}

impl fmt::Display for Database {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Where the project is going to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentTarget {
	#[default]
	Local,
	Vps,
	Cloud,
}

impl DeploymentTarget {
	pub const ALL: [DeploymentTarget; 3] = [Self::Local, Self::Vps, Self::Cloud];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Local => "local",
			Self::Vps => "vps",
			Self::Cloud => "cloud",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Local => "Local development only",
			Self::Vps => "VPS / own server",
			Self::Cloud => "Cloud (DigitalOcean, Hetzner, ...)",
		}
	}
}

impl fmt::Display for DeploymentTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Cloud provider for the `cloud` deployment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
	DigitalOcean,
	Hetzner,
	Aws,
	Generic,
}

impl CloudProvider {
	pub const ALL: [CloudProvider; 4] = [Self::DigitalOcean, Self::Hetzner, Self::Aws, Self::Generic];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::DigitalOcean => "digitalocean",
			Self::Hetzner => "hetzner",
			Self::Aws => "aws",
			Self::Generic => "generic",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::DigitalOcean => "DigitalOcean",
			Self::Hetzner => "Hetzner Cloud",
			Self::Aws => "AWS EC2",
			Self::Generic => "Generic (own setup)",
		}
	}
}

impl fmt::Display for CloudProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// SSH access to a VPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAccess {
	pub ip: String,
	pub user: String,
	pub port: String,
}

/// Settings for the `vps` deployment target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VpsTarget {
	/// Present when domain and SSL setup was requested.
	pub domain: Option<String>,
	/// Present once the VPS questions have been answered.
	pub server: Option<ServerAccess>,
}

/// Settings for the `cloud` deployment target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudTarget {
	/// Present when domain and SSL setup was requested.
	pub domain: Option<String>,
	/// Present once the cloud questions have been answered.
	pub provider: Option<CloudProvider>,
}

/// Deployment target together with the answers only it carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Deployment {
	#[default]
	Local,
	Vps(VpsTarget),
	Cloud(CloudTarget),
}

impl Deployment {
	pub fn target(&self) -> DeploymentTarget {
		match self {
			Self::Local => DeploymentTarget::Local,
			Self::Vps(_) => DeploymentTarget::Vps,
			Self::Cloud(_) => DeploymentTarget::Cloud,
		}
	}

	pub fn domain(&self) -> Option<&str> {
		match self {
			Self::Local => None,
			Self::Vps(vps) => vps.domain.as_deref(),
			Self::Cloud(cloud) => cloud.domain.as_deref(),
		}
	}
}

/// Complete configuration driving file generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAnswers", into = "RawAnswers")]
pub struct Answers {
	pub project_name: String,
	pub project_type: ProjectType,
	/// Effective application port.
	pub port: u16,
	/// Whether the port came from the project type default.
	pub use_default_port: bool,
	pub database: Database,
	pub deployment: Deployment,
}

impl Answers {
	/// Answers for a local project without database, on the default port.
	pub fn new(project_name: impl Into<String>, project_type: ProjectType) -> Self {
		Self {
			project_name: project_name.into(),
			project_type,
			port: project_type.default_port(),
			use_default_port: true,
			database: Database::None,
			deployment: Deployment::Local,
		}
	}

	/// Type the key/value bag collected by the question engine.
	pub fn from_map(map: AnswerMap) -> InitResult<Self> {
		serde_json::from_value(Value::Object(map)).map_err(|e| InitError::InvalidAnswers {
			message: e.to_string(),
		})
	}

	/// The flat key/value form, as persisted in checkpoints.
	pub fn to_map(&self) -> AnswerMap {
		match serde_json::to_value(RawAnswers::from(self.clone())) {
			Ok(Value::Object(map)) => map,
			_ => AnswerMap::new(),
		}
	}

	/// Add newly collected answers, overwriting keys that already exist.
	pub fn merge(&self, extra: AnswerMap) -> InitResult<Self> {
		let mut map = self.to_map();
		map.extend(extra);
		Self::from_map(map)
	}

	pub fn deployment_target(&self) -> DeploymentTarget {
		self.deployment.target()
	}

	pub fn needs_database(&self) -> bool {
		self.database != Database::None
	}

	/// Requested domain, if domain and SSL setup was chosen.
	pub fn domain(&self) -> Option<&str> {
		self.deployment.domain()
	}

	pub fn needs_domain(&self) -> bool {
		self.domain().is_some()
	}

	/// Whether an nginx reverse proxy fronts the app. Follows the domain choice.
	pub fn needs_reverse_proxy(&self) -> bool {
		self.needs_domain()
	}

	/// Whether Let's Encrypt certificates are set up. Follows the domain choice.
	pub fn needs_ssl(&self) -> bool {
		self.needs_domain()
	}

	/// Whether deploy scripts are generated.
	pub fn is_remote(&self) -> bool {
		!matches!(self.deployment, Deployment::Local)
	}
}

/// On-disk shape of [`Answers`]: one optional key per question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnswers {
	project_name: String,
	project_type: Option<ProjectType>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	use_default_port: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	port: Option<String>,
	#[serde(default)]
	database: Database,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	needs_database: Option<bool>,
	#[serde(default)]
	deployment_target: DeploymentTarget,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	needs_domain: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	domain: Option<String>,
	#[serde(rename = "serverIP", default, skip_serializing_if = "Option::is_none")]
	server_ip: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	server_user: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	server_port: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	cloud_provider: Option<CloudProvider>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	needs_reverse_proxy: Option<bool>,
	#[serde(rename = "needsSSL", default, skip_serializing_if = "Option::is_none")]
	needs_ssl: Option<bool>,
}

impl RawAnswers {
	fn has_server_keys(&self) -> bool {
		self.server_ip.is_some() || self.server_user.is_some() || self.server_port.is_some()
	}
}

fn invalid(message: impl Into<String>) -> InitError {
	InitError::InvalidAnswers {
		message: message.into(),
	}
}

fn parse_port(raw: &str) -> InitResult<u16> {
	match raw.trim().parse::<u16>() {
		Ok(port) if port > 0 => Ok(port),
		_ => Err(invalid(format!("port '{raw}' is not between 1 and 65535"))),
	}
}

fn domain_from(needs_domain: Option<bool>, domain: Option<String>) -> InitResult<Option<String>> {
	match (needs_domain, domain) {
		(Some(true), Some(domain)) => Ok(Some(domain)),
		(Some(true), None) => Err(invalid("needsDomain is set but no domain was given")),
		(_, Some(_)) => Err(invalid("domain given without needsDomain")),
		(_, None) => Ok(None),
	}
}

impl TryFrom<RawAnswers> for Answers {
	type Error = InitError;

	fn try_from(raw: RawAnswers) -> Result<Self, Self::Error> {
		if raw.project_name.is_empty() {
			return Err(invalid("projectName is missing"));
		}
		let project_type = raw
			.project_type
			.ok_or_else(|| invalid("projectType is missing"))?;
		let port = match raw.port.as_deref() {
			Some(port) => parse_port(port)?,
			None => project_type.default_port(),
		};

		let deployment = match raw.deployment_target {
			DeploymentTarget::Local => {
				if raw.needs_domain.is_some()
					|| raw.domain.is_some()
					|| raw.has_server_keys()
					|| raw.cloud_provider.is_some()
				{
					return Err(invalid(
						"deployment answers are not allowed for a local target",
					));
				}
				Deployment::Local
			}
			DeploymentTarget::Vps => {
				if raw.cloud_provider.is_some() {
					return Err(invalid("cloudProvider is not allowed for a vps target"));
				}
				if raw.server_ip.is_none() && raw.has_server_keys() {
					return Err(invalid("serverUser and serverPort require serverIP"));
				}
				let server = raw.server_ip.map(|ip| ServerAccess {
					ip,
					user: raw.server_user.unwrap_or_else(|| "root".to_string()),
					port: raw.server_port.unwrap_or_else(|| "22".to_string()),
				});
				Deployment::Vps(VpsTarget {
					domain: domain_from(raw.needs_domain, raw.domain)?,
					server,
				})
			}
			DeploymentTarget::Cloud => {
				if raw.has_server_keys() {
					return Err(invalid("server access is not allowed for a cloud target"));
				}
				Deployment::Cloud(CloudTarget {
					domain: domain_from(raw.needs_domain, raw.domain)?,
					provider: raw.cloud_provider,
				})
			}
		};

		Ok(Self {
			project_name: raw.project_name,
			project_type,
			port,
			use_default_port: raw.use_default_port.unwrap_or(true),
			database: raw.database,
			deployment,
		})
	}
}

impl From<Answers> for RawAnswers {
	fn from(answers: Answers) -> Self {
		let remote = answers.is_remote();
		let needs_domain = answers.needs_domain();
		let mut raw = RawAnswers {
			project_name: answers.project_name,
			project_type: Some(answers.project_type),
			use_default_port: Some(answers.use_default_port),
			port: Some(answers.port.to_string()),
			database: answers.database,
			needs_database: Some(answers.database != Database::None),
			deployment_target: answers.deployment.target(),
			..RawAnswers::default()
		};
		if remote {
			raw.needs_domain = Some(needs_domain);
			raw.needs_reverse_proxy = Some(needs_domain);
			raw.needs_ssl = Some(needs_domain);
		}
		match answers.deployment {
			Deployment::Local => {}
			Deployment::Vps(vps) => {
				raw.domain = vps.domain;
				if let Some(server) = vps.server {
					raw.server_ip = Some(server.ip);
					raw.server_user = Some(server.user);
					raw.server_port = Some(server.port);
				}
			}
			Deployment::Cloud(cloud) => {
				raw.domain = cloud.domain;
				raw.cloud_provider = cloud.provider;
			}
		}
		raw
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn map(value: Value) -> AnswerMap {
		match value {
			Value::Object(map) => map,
			other => panic!("expected an object, got {other}"),
		}
	}

	#[rstest]
	#[case("express", 3000)]
	#[case("nextjs", 3000)]
	#[case("react-vite", 5173)]
	#[case("node-basic", 3000)]
	#[case("static", 80)]
	#[case("django", 3000)]
	fn default_port_by_project_type(#[case] project_type: &str, #[case] expected: u16) {
		// Act
		let port = default_port_for(project_type);

		// Assert
		assert_eq!(port, expected);
	}

	#[rstest]
	fn missing_port_uses_project_type_default() {
		// Arrange
		let raw = map(json!({
			"projectName": "shop",
			"projectType": "react-vite",
			"useDefaultPort": true,
			"database": "none",
			"deploymentTarget": "local"
		}));

		// Act
		let answers = Answers::from_map(raw).unwrap();

		// Assert
		assert_eq!(answers.port, 5173);
		assert_eq!(answers.port.to_string(), "5173");
	}

	#[rstest]
	fn local_target_serializes_no_deployment_keys() {
		// Arrange
		let answers = Answers::new("shop", ProjectType::Express);

		// Act
		let map = answers.to_map();

		// Assert
		for key in [
			"needsDomain",
			"domain",
			"serverIP",
			"serverUser",
			"serverPort",
			"cloudProvider",
			"needsReverseProxy",
			"needsSSL",
		] {
			assert!(!map.contains_key(key), "unexpected key {key}");
		}
		assert_eq!(map["port"], json!("3000"));
		assert_eq!(map["needsDatabase"], json!(false));
	}

	#[rstest]
	fn vps_answers_survive_map_round_trip() {
		// Arrange
		let mut answers = Answers::new("shop", ProjectType::NextJs);
		answers.database = Database::Postgres;
		answers.deployment = Deployment::Vps(VpsTarget {
			domain: Some("shop.example.com".into()),
			server: Some(ServerAccess {
				ip: "10.0.0.5".into(),
				user: "deploy".into(),
				port: "2222".into(),
			}),
		});

		// Act
		let restored = Answers::from_map(answers.to_map()).unwrap();

		// Assert
		assert_eq!(restored, answers);
		assert!(restored.needs_reverse_proxy());
		assert!(restored.needs_ssl());
	}

	#[rstest]
	fn merge_adds_vps_server_access() {
		// Arrange
		let mut answers = Answers::new("shop", ProjectType::Express);
		answers.deployment = Deployment::Vps(VpsTarget::default());
		let extra = map(json!({
			"serverIP": "192.168.1.10",
			"serverUser": "root",
			"serverPort": "22"
		}));

		// Act
		let merged = answers.merge(extra).unwrap();

		// Assert
		let Deployment::Vps(vps) = &merged.deployment else {
			panic!("expected a vps deployment");
		};
		let server = vps.server.as_ref().unwrap();
		assert_eq!(server.ip, "192.168.1.10");
		assert_eq!(server.user, "root");
		assert_eq!(server.port, "22");
	}

	#[rstest]
	fn local_target_with_domain_is_rejected() {
		// Arrange
		let raw = map(json!({
			"projectName": "shop",
			"projectType": "express",
			"deploymentTarget": "local",
			"needsDomain": true,
			"domain": "shop.example.com"
		}));

		// Act
		let result = Answers::from_map(raw);

		// Assert
		assert!(matches!(result, Err(InitError::InvalidAnswers { .. })));
	}

	#[rstest]
	#[case("local", "serverIP", "10.0.0.5")]
	#[case("local", "serverUser", "root")]
	#[case("local", "serverPort", "22")]
	#[case("cloud", "serverUser", "root")]
	#[case("cloud", "serverPort", "22")]
	#[case("vps", "serverUser", "root")]
	#[case("vps", "serverPort", "22")]
	fn stray_server_key_is_rejected(#[case] target: &str, #[case] key: &str, #[case] value: &str) {
		// Arrange
		let mut raw = map(json!({
			"projectName": "shop",
			"projectType": "express",
			"deploymentTarget": target
		}));
		raw.insert(key.to_string(), json!(value));

		// Act
		let result = Answers::from_map(raw);

		// Assert
		assert!(
			matches!(result, Err(InitError::InvalidAnswers { .. })),
			"{key} accepted for {target}"
		);
	}

	#[rstest]
	fn requested_domain_must_be_present() {
		// Arrange
		let raw = map(json!({
			"projectName": "shop",
			"projectType": "express",
			"deploymentTarget": "cloud",
			"needsDomain": true
		}));

		// Act
		let result = Answers::from_map(raw);

		// Assert
		assert!(result.is_err());
	}

	#[rstest]
	#[case("0")]
	#[case("70000")]
	#[case("http")]
	fn out_of_range_port_is_rejected(#[case] port: &str) {
		// Arrange
		let raw = map(json!({
			"projectName": "shop",
			"projectType": "express",
			"port": port
		}));

		// Act
		let result = Answers::from_map(raw);

		// Assert
		assert!(result.is_err());
	}

	#[rstest]
	fn declined_domain_keeps_needs_domain_false() {
		// Arrange
		let mut answers = Answers::new("shop", ProjectType::Express);
		answers.deployment = Deployment::Cloud(CloudTarget {
			domain: None,
			provider: Some(CloudProvider::Hetzner),
		});

		// Act
		let map = answers.to_map();

		// Assert
		assert_eq!(map["needsDomain"], json!(false));
		assert_eq!(map["cloudProvider"], json!("hetzner"));
		assert!(!map.contains_key("domain"));
	}
}
