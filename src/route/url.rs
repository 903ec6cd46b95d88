//! Paths of the pages that handlers redirect to.

pub fn post_detail(post_id: i64) -> String {
	format!("/posts/{post_id}/")
}

pub fn profile(username: &str) -> String {
	format!("/profile/{username}/")
}

/// The login page, returning to `next` afterwards.
pub fn login(next: &str) -> String {
	let query = form_urlencoded::Serializer::new(String::new())
		.append_pair("next", next)
		.finish();

	format!("/auth/login?{query}")
}
