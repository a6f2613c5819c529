pub mod albums;
pub mod auth;
pub mod blog;
pub mod reviews;
pub mod spotify;
pub mod users;
