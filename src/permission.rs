//! Ownership checks for content that belongs to a single user.

use uuid::Uuid;

/// Content with exactly one author, fixed at creation.
pub trait Authored {
	fn author_id(&self) -> Uuid;

	/// Whether `user` may modify or delete this content.
	fn is_authored_by(&self, user: Uuid) -> bool {
		self.author_id() == user
	}
}
