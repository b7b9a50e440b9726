pub mod catalog;
pub mod config;
pub mod engine;
pub mod feedback;
pub mod output;
pub mod profile;
pub mod selection;
pub mod signal;
