//! Core account logic module
//!
//! This module contains the components that guard shared money:
//! - `traits` - The audit sink abstraction injected into every component
//! - `account` - Lock-guarded account with deposit and withdraw
//! - `transfer` - Deadlock-free two-account transfers
//! - `audit_log` - Serialized audit trail sinks
//! - `registry` - Id-indexed store of shared accounts

pub mod account;
pub mod audit_log;
pub mod registry;
pub mod traits;
pub mod transfer;

pub use account::Account;
pub use audit_log::{AuditEvent, DiscardAuditLog, MemoryAuditLog, WriterAuditLog};
pub use registry::AccountRegistry;
pub use traits::AuditSink;
pub use transfer::{TransferConfig, TransferCoordinator};
