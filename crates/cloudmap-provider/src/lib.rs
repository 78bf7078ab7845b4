//! cloudmap-provider - AWS Cloud Map HTTP namespace provider
//!
//! This crate manages Cloud Map HTTP namespaces through a
//! Create/Read/Update/Delete/Import lifecycle, tracks them in a local SQLite
//! state database and exposes the `cloudmap` command-line tool.

pub mod aws;
pub mod config;
pub mod resource;
pub mod session;
pub mod state;
pub mod wait;

#[cfg(test)]
mod testing;
