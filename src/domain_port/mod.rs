mod credential_store;
mod refresh_token_store;

pub use credential_store::*;
pub use refresh_token_store::*;
