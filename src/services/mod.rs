pub mod auth;
pub mod credentials;
pub mod image;
pub mod session;
pub mod store;
pub mod thumbnail;
