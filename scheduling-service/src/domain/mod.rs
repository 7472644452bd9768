pub mod candidate;
pub mod carryover;
pub mod config;
pub mod fitness;
pub mod preference;
pub mod reconcile;
pub mod requirement;
pub mod scheduler;
pub mod seed;
pub mod selector;
pub mod service;
