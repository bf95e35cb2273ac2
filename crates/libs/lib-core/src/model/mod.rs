//! # Model Layer
//!
//! Storage access for the users service.

pub mod store;
