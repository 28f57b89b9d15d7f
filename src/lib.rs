//! VeriPact - Transparent Charity DAO
//!
//! Donors fund a shared treasury, propose grants to charities, and vote on
//! them with power proportional to what they gave.
//!
//! - [`dao`]: the treasury/proposal/voting state machine
//! - [`routes`]: the HTTP/JSON service interface
//! - [`client`]: the console model that consumes the interface

pub mod client;
pub mod config;
pub mod dao;
pub mod error;
pub mod identity;
pub mod models;
pub mod persistence;
pub mod routes;
pub mod state;
