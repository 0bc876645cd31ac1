//! Directory lookups and identity resolution for Vigia.
//!
//! This crate owns the read-only LDAP side of the portal: a thin client
//! wrapper over `ldap3` for querying Active Directory accounts, and the
//! resolver that combines directory state, the SGU personnel source, and
//! the local ticket store into a single identity picture.

pub mod client;
pub mod resolver;

pub use client::DirectoryClient;
pub use resolver::{BatchReport, DirectoryLookup, ResolveOutcome, Resolver, UnitLookup};
