pub mod ask;
pub mod chat;
pub mod config;
pub mod options;
pub mod tools;
