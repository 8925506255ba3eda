pub mod error;
pub mod key_set_service;
