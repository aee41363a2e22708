//! Core types and storage for Product-Process-Resource (PPR) graphs.
//!
//! Provides the entity model ([`model::Node`], [`model::Edge`]), the session
//! [`store::EntityStore`] with its editing operations, lossless JSON
//! import/export, and configuration.

pub mod config;
pub mod error;
pub mod model;
pub mod schema;
pub mod storage;
pub mod store;
