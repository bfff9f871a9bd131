pub mod auth;
pub mod client;
pub mod connector;
pub mod credentials;
