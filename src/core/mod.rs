//! # Core Application Logic
//!
//! This module contains EduBot's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No network. No UI.     │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!                   ┌────────────┴────────────┐
//!                   ▼                         ▼
//!            ┌────────────┐            ┌────────────┐
//!            │    TUI     │  spawns ─▶ │    API     │
//!            │  Adapter   │ ◀─ Action  │ (reqwest)  │
//!            │ (ratatui)  │            │            │
//!            └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and `update()`
//! - [`session`], [`transcript`], [`composer`], [`upload`], [`study`]: the domain pieces `App` is built from
//! - [`theme`], [`store`]: persisted preferences
//! - [`config`]: layered settings

pub mod action;
pub mod composer;
pub mod config;
pub mod notice;
pub mod session;
pub mod state;
pub mod store;
pub mod study;
pub mod theme;
pub mod transcript;
pub mod upload;
