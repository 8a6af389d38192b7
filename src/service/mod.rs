pub mod chat;
pub mod classifier;
pub mod error;
pub mod gamification;
pub mod gemini;
pub mod pickup;
pub mod response_parser;
pub mod waste_catalog;
