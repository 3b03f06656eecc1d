// navdesk shared type definitions
// Each submodule defines types used across the application.

pub mod bookmark;
pub mod category;
pub mod errors;
pub mod settings;
pub mod timestamp;
pub mod user;
