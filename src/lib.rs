//! Task Notification API Library
//!
//! An in-memory task store with derived due times, a periodic sweep that
//! pushes due-soon notifications to connected clients, and a token-based
//! auth gate in front of the HTTP surface.

pub mod api;
pub mod auth;
pub mod domain;
pub mod infrastructure;
pub mod notification;
