pub mod command;
pub mod config;
pub mod input;
pub mod messages;
pub mod runtime;
pub mod shaping;
