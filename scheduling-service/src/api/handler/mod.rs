pub mod carryover;
pub mod health;
pub mod schedule;
