//! City list and weather lookup TUI built on tui-dispatch
//!
//! The library exposes the application's modules for testing; `main.rs`
//! wires them to a terminal.

pub mod action;
pub mod api;
pub mod components;
pub mod config;
pub mod effect;
pub mod reducer;
pub mod route;
pub mod state;
pub mod view;
