//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL task repository via Diesel, plus pool and
//!   migrations.
//! - **memory**: in-process task repository used when no database is
//!   configured and throughout the tests.
//! - **auth**: HS256 JWT access-token verifier.
//!
//! Adapters translate between domain types and infrastructure
//! representations; they hold no business rules.

pub mod auth;
pub mod memory;
pub mod persistence;
