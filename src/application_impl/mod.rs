mod auth_service_impl;
mod scenario;
mod token_codec_jwt;

pub use auth_service_impl::*;
pub use scenario::*;
pub use token_codec_jwt::*;
