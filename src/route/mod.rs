pub mod auth;
pub mod category;
pub mod comment;
pub mod docs;
pub mod model;
pub mod post;
pub mod profile;
pub mod url;
