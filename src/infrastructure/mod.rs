//! Infrastructure module for storage and configuration.
//!
//! This module contains the repository abstractions, their in-process
//! implementations and environment-driven configuration.

pub mod config;
pub mod in_memory;
pub mod repository;

pub use config::{ConfigurationError, ServerConfig, ServerConfigBuilder};
pub use in_memory::{InMemoryTaskRepository, InMemoryUserRepository};
pub use repository::{RepositoryError, TaskRepository, UserRepository};
