pub mod chat;
pub mod email;
pub mod meeting;
pub mod timefmt;
pub mod user;
