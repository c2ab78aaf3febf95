//! `TaskDeck` — terminal dashboard for a hosted to-do service.

pub mod api;
pub mod app;
pub mod config;
pub mod keys;
pub mod store;
pub mod ui;
pub mod view;
