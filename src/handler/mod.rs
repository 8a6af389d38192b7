pub mod chat;
pub mod classify;
pub mod gamification;
pub mod history;
pub mod pickup;
pub mod settings;
