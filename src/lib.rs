//! Record store for the J.U.N.E. agent roster: agents, tasks, an audit trail
//! and the admin credential, kept as JSON documents in a key-value backend.

pub mod admin;
pub mod commands;
pub mod config;
pub mod dossier;
pub mod error;
pub mod model;
pub mod output;
pub mod roster;
pub mod secret;
pub mod session;
pub mod store;
pub mod tasking;
