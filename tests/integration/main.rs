#[path = "../common/mod.rs"]
mod common;

mod expired_retry;
mod session_invalidation;
