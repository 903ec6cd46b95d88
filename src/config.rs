//! Application configuration loaded from environment variables.

use std::{net::IpAddr, path::PathBuf, str::FromStr};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MEDIA_ROOT: &str = "media";
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{name} has an invalid value {value:?}")]
	Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub host: IpAddr,
	pub port: u16,
	/// Directory that uploaded images are written to and served from.
	pub media_root: PathBuf,
	pub max_image_bytes: usize,
	/// Whether traces and metrics are exported over OTLP.
	pub otlp: bool,
}

impl Config {
	/// Loads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads the configuration using `lookup` to resolve variables.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		fn parse<T: FromStr>(
			lookup: &impl Fn(&str) -> Option<String>,
			name: &'static str,
			default: T,
		) -> Result<T, ConfigError> {
			match lookup(name) {
				Some(value) => value
					.parse()
					.map_err(|_| ConfigError::Invalid { name, value }),
				None => Ok(default),
			}
		}

		Ok(Self {
			database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
			host: parse(&lookup, "HOST", IpAddr::from([127, 0, 0, 1]))?,
			port: parse(&lookup, "PORT", DEFAULT_PORT)?,
			media_root: lookup("MEDIA_ROOT").map_or_else(|| DEFAULT_MEDIA_ROOT.into(), PathBuf::from),
			max_image_bytes: parse(&lookup, "MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
			otlp: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").is_some_and(|value| !value.is_empty()),
		})
	}
}
