pub mod app;
pub mod candidates;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod heal;
pub mod history;
pub mod output;
pub mod runtime;
pub mod selectors;
