//! Console for SQL Server Reporting Services
//!
//! `api` talks to the REST proxy, `state` holds the client-side containers
//! (browsing, parameters, preview, policies) and `cli` drives them from the
//! terminal.

pub mod api;
pub mod cli;
pub mod config;
pub mod state;
pub mod ui;
