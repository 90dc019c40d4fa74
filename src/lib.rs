//! Terminal chat client for OpenAI models with Microsoft Graph mailbox tools.
//!
//! The library is split the same way the binaries use it: `llm` talks to the
//! model, `graph` runs mailbox functions, `display` renders responses and
//! `chat` ties the three together into a conversation loop.

pub mod build_info;
pub mod chat;
pub mod commands;
pub mod config;
pub mod display;
pub mod graph;
pub mod llm;
pub mod logging;
pub mod settings;
