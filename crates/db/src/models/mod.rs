//! Database row structs and request DTOs.

pub mod entity;
pub mod feedback;
pub mod message;
pub mod settings;
pub mod space;
pub mod status;
pub mod web;
