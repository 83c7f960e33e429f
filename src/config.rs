//! STS endpoint configuration.
//!
//! Configuration is immutable once handed to an [`StsClient`](crate::sts::StsClient); it can
//! be built in code or loaded from JSON, where durations are whole seconds:
//!
//! ```json
//! {
//!   "server": "vcenter.example.com",
//!   "port": 443,
//!   "tls": { "mode": "custom", "roots": ["-----BEGIN CERTIFICATE-----\n..."] },
//!   "request_validity": 600
//! }
//! ```

// self
use crate::{_prelude::*, credentials::Certificate, error::ConfigError};

/// Default HTTPS port of the STS.
pub const DEFAULT_PORT: u16 = 443;
/// Default STS service path.
pub const DEFAULT_PATH: &str = "/sts/STSService";

/// Where the STS lives and how to trust it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
	/// Host name or address of the STS.
	pub server: String,
	/// HTTPS port.
	#[serde(default = "default_port")]
	pub port: u16,
	/// Service path, starting with `/`.
	#[serde(default = "default_path")]
	pub path: String,
	/// Server certificate trust.
	#[serde(default)]
	pub tls: TlsTrust,
	/// Validity window stamped on outgoing requests.
	#[serde(default = "default_request_validity", with = "seconds")]
	pub request_validity: Duration,
	/// Whole-request timeout applied by the HTTP transport.
	#[serde(default, with = "optional_seconds", skip_serializing_if = "Option::is_none")]
	pub timeout: Option<Duration>,
}
impl EndpointConfig {
	/// Configuration for `server` with every other setting at its default.
	pub fn new(server: impl Into<String>) -> Self {
		Self {
			server: server.into(),
			port: DEFAULT_PORT,
			path: DEFAULT_PATH.into(),
			tls: TlsTrust::default(),
			request_validity: default_request_validity(),
			timeout: None,
		}
	}

	/// Overrides the port.
	pub fn with_port(mut self, port: u16) -> Self {
		self.port = port;

		self
	}

	/// Overrides the service path.
	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		self.path = path.into();

		self
	}

	/// Overrides server certificate trust.
	pub fn with_tls(mut self, tls: TlsTrust) -> Self {
		self.tls = tls;

		self
	}

	/// Overrides the request timestamp validity.
	pub fn with_request_validity(mut self, validity: Duration) -> Self {
		self.request_validity = validity;

		self
	}

	/// Sets a whole-request timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Parses and validates a JSON document, reporting the failing path on errors.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_str(json);
		let config: Self = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ConfigError::Parse { source })?;

		config.validate()?;

		Ok(config)
	}

	/// Checks the settings describe a reachable endpoint.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.server.trim().is_empty() {
			return Err(invalid("server must not be empty"));
		}
		if !self.path.starts_with('/') {
			return Err(invalid("path must start with `/`"));
		}
		if self.port == 0 {
			return Err(invalid("port must not be zero"));
		}
		if !self.request_validity.is_positive() {
			return Err(invalid("request validity must be positive"));
		}
		if self.timeout.is_some_and(|timeout| !timeout.is_positive()) {
			return Err(invalid("timeout must be positive"));
		}

		self.url().map(|_| ())
	}

	/// `https://{server}:{port}{path}`.
	pub fn url(&self) -> Result<Url, ConfigError> {
		let host = if self.server.contains(':') && !self.server.starts_with('[') {
			format!("[{}]", self.server)
		} else {
			self.server.clone()
		};

		Url::parse(&format!("https://{host}:{}{}", self.port, self.path))
			.map_err(|e| invalid(&format!("`{host}` does not form a valid URL: {e}")))
	}
}

/// How the transport decides whether to trust the STS certificate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TlsTrust {
	/// Platform trust store.
	#[default]
	System,
	/// Only the listed roots.
	Custom {
		/// Trusted root certificates.
		roots: Vec<Certificate>,
	},
	/// Accept any certificate and host name. Only for test environments.
	AcceptInvalidCertificates,
}

fn invalid(reason: &str) -> ConfigError {
	ConfigError::InvalidEndpoint { reason: reason.to_owned() }
}

fn default_port() -> u16 {
	DEFAULT_PORT
}

fn default_path() -> String {
	DEFAULT_PATH.into()
}

fn default_request_validity() -> Duration {
	Duration::minutes(10)
}

mod seconds {
	// crates.io
	use serde::{Deserializer, Serializer};
	// self
	use crate::_prelude::*;

	pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(value.whole_seconds())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		i64::deserialize(deserializer).map(Duration::seconds)
	}
}

mod optional_seconds {
	// crates.io
	use serde::{Deserializer, Serializer};
	// self
	use crate::_prelude::*;

	pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match value {
			Some(value) => serializer.serialize_some(&value.whole_seconds()),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
	where
		D: Deserializer<'de>,
	{
		Option::<i64>::deserialize(deserializer).map(|value| value.map(Duration::seconds))
	}
}
