pub mod agent;
pub mod broker;
pub mod config;
pub mod connection;
pub mod conversation;
pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod tools;
