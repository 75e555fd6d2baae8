//! # Blog Core
//!
//! The domain layer of the blog.
//! Entities, form validation, pagination and the use cases that tie them to
//! the storage and mail ports. No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod service;
pub mod settings;

pub use error::DomainError;
pub use service::BlogService;
pub use settings::BlogSettings;
