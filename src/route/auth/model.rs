use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username.chars().any(|c| !c.is_alphanumeric()) {
		return Err(ValidationError::new("username must be alphanumeric"));
	}

	Ok(())
}

/// A single user.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The user's primary email address, used for logging in.
	#[validate(email)]
	pub email: String,
	/// The hashed password.
	#[serde(skip)]
	pub password: Vec<u8>,
	/// The username that is displayed to the public.
	#[validate(length(min = 3, max = 16), custom(function = "validate_username"))]
	pub username: String,
	#[validate(length(max = 150))]
	pub first_name: String,
	#[validate(length(max = 150))]
	pub last_name: String,
	/// The creation time of the user.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Validate, JsonSchema, sqlx::FromRow)]
pub struct Session {
	/// The session id.
	#[serde(skip_deserializing, rename = "session_id")]
	pub id: Uuid,
	/// The user that owns the session.
	#[serde(skip)]
	#[allow(dead_code)]
	pub user_id: Uuid,
	/// The creation time of the session.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct RegisterInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
	/// The username that is displayed to the public.
	#[validate(length(min = 3, max = 16), custom(function = "validate_username"))]
	pub username: String,
	#[serde(default)]
	#[validate(length(max = 150))]
	pub first_name: String,
	#[serde(default)]
	#[validate(length(max = 150))]
	pub last_name: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginQuery {
	/// Where to continue after logging in.
	pub next: Option<String>,
}

/// The login page, shown to anonymous users that tried to access a protected page.
#[derive(Serialize, JsonSchema)]
pub struct LoginPage {
	pub next: Option<String>,
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::{RegisterInput, UserForm};

	#[test]
	fn test_username_must_be_alphanumeric() {
		let mut input = RegisterInput {
			email: "john@smith.com".into(),
			password: "hunter2hunter".into(),
			username: "john".into(),
			first_name: String::new(),
			last_name: String::new(),
		};

		assert!(input.validate().is_ok());

		input.username = "john smith".into();
		assert!(input.validate().is_err());

		input.username = "jo".into();
		assert!(input.validate().is_err());
	}

	#[test]
	fn test_user_form_validates_email() {
		let form = UserForm {
			email: "not an email".into(),
			username: "john".into(),
			first_name: "John".into(),
			last_name: "Smith".into(),
		};

		assert!(form.validate().is_err());
	}
}
