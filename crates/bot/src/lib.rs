//! Guardian - LINE group-guardian webhook bot.
//!
//! This crate provides the bot functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Architecture
//!
//! - Axum web framework receiving the LINE webhook
//! - `SQLite` (via sqlx) for the admin allow-list
//! - LINE Messaging API for replies, profiles, and member removal
//!
//! A signature-verified webhook delivery fans out to per-event handlers:
//! text commands go through the parser and the admin authorization gate,
//! join events get a greeting, and member-joined events run the membership
//! guard.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod line;
pub mod routes;
pub mod services;
pub mod state;
