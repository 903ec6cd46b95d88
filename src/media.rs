//! File system storage for uploaded post images.

use std::{
	io,
	path::{Path, PathBuf},
};

use tokio::fs;
use uuid::Uuid;

/// Directory (relative to the media root) that post images are stored in.
pub const POST_IMAGES: &str = "post_images";

/// Maps an image content type to the file extension it is stored with.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
	let essence = content_type.split(';').next().unwrap_or_default().trim();

	match essence.to_ascii_lowercase().as_str() {
		"image/png" => Some("png"),
		"image/jpeg" => Some("jpg"),
		"image/gif" => Some("gif"),
		"image/webp" => Some("webp"),
		_ => None,
	}
}

#[derive(Debug, Clone)]
pub struct MediaStore {
	root: PathBuf,
	max_bytes: usize,
}

impl MediaStore {
	/// Creates a store rooted at `root`; stored paths are relative to it.
	pub fn new(root: PathBuf, max_bytes: usize) -> Self {
		Self { root, max_bytes }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// The largest upload accepted, in bytes.
	pub fn max_bytes(&self) -> usize {
		self.max_bytes
	}

	/// Writes a post image under a fresh name, returning its relative path.
	pub async fn save_post_image(&self, bytes: &[u8], extension: &str) -> io::Result<String> {
		fs::create_dir_all(self.root.join(POST_IMAGES)).await?;

		let path = format!("{POST_IMAGES}/{}.{extension}", Uuid::new_v4());
		fs::write(self.root.join(&path), bytes).await?;

		Ok(path)
	}

	pub async fn remove(&self, path: &str) -> io::Result<()> {
		fs::remove_file(self.root.join(path)).await
	}

	/// Removes a file that is no longer referenced, logging instead of failing.
	pub async fn discard(&self, path: Option<&str>) {
		let Some(path) = path else {
			return;
		};

		if let Err(error) = self.remove(path).await {
			tracing::warn!(%error, path, "failed to remove stored image");
		}
	}
}
