pub mod auth_service;
pub mod catalog;
pub mod pricing;
pub mod service;
