pub mod admin;
pub mod common;
pub mod health;
pub mod phase;
pub mod player;
