//! # Data Transfer Objects (DTOs)
//!
//! This module contains all data structures used for communication between
//! clients and the service via the REST API.

pub mod user;

pub use user::*;
