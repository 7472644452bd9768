pub mod api;
pub mod domain;
pub mod error;
pub mod infrastructure;
