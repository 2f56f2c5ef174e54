//! Process-local stores. Every key lives in one `DashMap` shard, so a read
//! and write on the same key under one guard are serialized.

mod credential_store_memory;
mod refresh_token_store_memory;

pub use credential_store_memory::*;
pub use refresh_token_store_memory::*;
