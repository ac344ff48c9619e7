//! Startup configuration, read once from the environment.

use std::{fmt, net::IpAddr, str::FromStr};

/// Path segments that are already routed and cannot host the admin.
pub const RESERVED_PREFIXES: &[&str] = &["posts", "grappelli", "docs"];

pub const DEFAULT_SITE_TITLE: &str = "Blog administration";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{name} is invalid: {reason}")]
	Invalid { name: &'static str, reason: String },
}

/// The location of the admin interface, without leading or trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPath(String);

impl AdminPath {
	pub fn parse(raw: &str) -> Result<Self, String> {
		let path = raw.trim().trim_matches('/');

		if path.is_empty() {
			return Err("the admin path cannot be empty".into());
		}

		for segment in path.split('/') {
			if segment.is_empty() {
				return Err("the admin path cannot contain empty segments".into());
			}

			if let Some(c) = segment
				.chars()
				.find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '~' | '-')))
			{
				return Err(format!("unexpected character `{c}` in the admin path"));
			}

			if segment == "." || segment == ".." {
				return Err("the admin path cannot contain relative segments".into());
			}
		}

		let first = path.split('/').next().unwrap_or(path);

		if RESERVED_PREFIXES.contains(&first) {
			return Err(format!("`/{first}` is already routed"));
		}

		Ok(Self(path.to_owned()))
	}

	/// The path as a router prefix, such as `/admin`.
	pub fn prefix(&self) -> String {
		format!("/{}", self.as_str())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
	pub path: AdminPath,
	pub title: String,
}

#[derive(Debug, Clone)]
pub struct Config {
	pub host: IpAddr,
	pub port: u16,
	/// When unset, the blog runs on an in-memory store.
	pub database_url: Option<String>,
	pub max_connections: u32,
	pub admin: AdminConfig,
}

impl Config {
	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let path = lookup("URLS_ADMIN_PATH").ok_or(ConfigError::Missing("URLS_ADMIN_PATH"))?;
		let path = AdminPath::parse(&path).map_err(|reason| ConfigError::Invalid {
			name: "URLS_ADMIN_PATH",
			reason,
		})?;

		Ok(Self {
			host: parse_or(&lookup, "HOST", IpAddr::from([127, 0, 0, 1]))?,
			port: parse_or(&lookup, "PORT", 3000)?,
			database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
			max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
			admin: AdminConfig {
				path,
				title: lookup("ADMIN_SITE_TITLE").unwrap_or_else(|| DEFAULT_SITE_TITLE.into()),
			},
		})
	}
}

fn parse_or<T>(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &'static str,
	default: T,
) -> Result<T, ConfigError>
where
	T: FromStr,
	T::Err: fmt::Display,
{
	match lookup(name) {
		Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
			name,
			reason: e.to_string(),
		}),
		None => Ok(default),
	}
}
