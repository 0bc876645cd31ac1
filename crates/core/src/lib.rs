//! Vigia Core — configuration, domain models, snapshot reconciliation, and
//! the local database layer for the IT-security account portal.

pub mod config;
pub mod db;
pub mod error;
pub mod ldap_time;
pub mod models;
pub mod normalize;
pub mod recon;
pub mod sgu;
