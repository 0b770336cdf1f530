//! Request middleware.

pub mod home_redirect;

pub use home_redirect::{home_redirect_middleware, LandingPages};
