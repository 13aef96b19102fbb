pub mod checklist;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod exit;
pub mod fetch;
pub mod logs;
pub mod rules;
pub mod scan;
pub mod suggest;
pub mod ui;
