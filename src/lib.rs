pub mod action;
pub mod app;
pub mod cluster;
pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod logging;
pub mod refresh;
pub mod ui;
