use aide::OperationInput;
use axum::{
	body::{Body, Bytes},
	extract::{FromRequest, Request},
	http::header,
};
use http_body_util::LengthLimitError;

use crate::{error::AppError, media};

/// An uploaded image, read from the raw request body.
#[derive(Debug)]
pub struct Image {
	pub bytes: Bytes,
	pub extension: &'static str,
}

/// A request body that has not been read yet.
///
/// Uploads are only read once the uploader is known to be allowed to make
/// them, so nobody else can make the server buffer a body:
///
/// ```rust
/// async fn route(session: Session, upload: Upload) {
///   // load the post, compare authors, then
///   let image = upload.read(media.max_bytes()).await?;
/// }
/// ```
#[derive(Debug)]
pub struct Upload {
	content_type: Option<String>,
	content_length: Option<usize>,
	body: Body,
}

impl Upload {
	/// Reads the body as an image of at most `limit` bytes.
	///
	/// The `Content-Type` header picks the stored file extension.
	pub async fn read(self, limit: usize) -> Result<Image, AppError> {
		let Some(extension) = self.content_type.as_deref().and_then(media::extension_for) else {
			return Err(AppError::UnsupportedMediaType(self.content_type));
		};

		if self.content_length.is_some_and(|length| length > limit) {
			return Err(AppError::PayloadTooLarge { limit });
		}

		// Bodies without a Content-Length are only caught while reading
		let bytes = axum::body::to_bytes(self.body, limit)
			.await
			.map_err(|error| {
				let error = error.into_inner();

				if error.is::<LengthLimitError>() {
					AppError::PayloadTooLarge { limit }
				} else {
					AppError::Body(axum::Error::new(error))
				}
			})?;

		Ok(Image { bytes, extension })
	}
}

#[axum::async_trait]
impl<S> FromRequest<S> for Upload
where
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
		let (parts, body) = req.into_parts();

		let content_type = parts
			.headers
			.get(header::CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.map(str::to_owned);

		let content_length = parts
			.headers
			.get(header::CONTENT_LENGTH)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.parse().ok());

		Ok(Self {
			content_type,
			content_length,
			body,
		})
	}
}

impl OperationInput for Upload {}
