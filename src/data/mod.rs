pub mod session_store;
pub mod user_repository;
