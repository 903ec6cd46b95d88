use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use governor::{
	clock::QuantaInstant,
	middleware::{RateLimitingMiddleware, StateInformationMiddleware},
};
use serde_json::json;
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::{KeyExtractor, PeerIpKeyExtractor},
	GovernorError,
};

use crate::{error, extract::Json};

pub type Config = GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Per-peer limits shared by every route.
pub fn default() -> Arc<Config> {
	Arc::new(
		GovernorConfigBuilder::default()
			.per_second(10)
			.burst_size(50)
			.use_headers()
			.error_handler(error_handler)
			.finish()
			.expect("rate limit quota must be non-zero"),
	)
}

fn error_handler(error: GovernorError) -> Response<Body> {
	match error {
		GovernorError::TooManyRequests { wait_time, headers } => {
			let mut response = (
				StatusCode::TOO_MANY_REQUESTS,
				Json(vec![error::Message {
					content: "too_many_requests".into(),
					field: None,
					details: Some(std::borrow::Cow::Owned({
						let mut map = error::Map::new();
						map.insert("wait_time".into(), json!(wait_time));
						map
					})),
				}]),
			)
				.into_response();

			if let Some(headers) = headers {
				response.headers_mut().extend(headers);
			}

			response
		}
		other => {
			tracing::error!(error = ?other, "rate limiter failed");

			(
				StatusCode::INTERNAL_SERVER_ERROR,
				Json(Vec::<error::Message>::new()),
			)
				.into_response()
		}
	}
}

/// Periodically drops limiter state of peers that have not been seen recently.
pub fn cleanup_old_limits<T, M>(configs: &[&Arc<GovernorConfig<T, M>>])
where
	T: KeyExtractor,
	<T as KeyExtractor>::Key: Send + Sync + 'static,
	M: RateLimitingMiddleware<QuantaInstant> + Send + Sync + 'static,
{
	let limiters = configs
		.iter()
		.map(|config| config.limiter().clone())
		.collect::<Vec<_>>();
	let interval = Duration::from_secs(60);

	std::thread::spawn(move || loop {
		std::thread::sleep(interval);

		for limiter in &limiters {
			tracing::debug!(size = limiter.len(), "pruning rate limiter storage");

			limiter.retain_recent();
		}
	});
}

#[cfg(test)]
mod test {
	use axum::http::{HeaderMap, StatusCode};
	use tower_governor::GovernorError;

	#[test]
	fn test_too_many_requests() {
		let mut headers = HeaderMap::new();
		headers.insert("retry-after", "3".parse().unwrap());

		let response = super::error_handler(GovernorError::TooManyRequests {
			wait_time: 3,
			headers: Some(headers),
		});

		assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
		assert_eq!(response.headers()["retry-after"], "3");
	}

	#[test]
	fn test_key_extraction_failure() {
		let response = super::error_handler(GovernorError::UnableToExtractKey);

		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
