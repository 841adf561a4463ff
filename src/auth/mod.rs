//! Authorization module for fileshelf.
//!
//! Identity is supplied per request by an external provider; this module
//! only decides what a given caller may change.

pub mod permission;

pub use permission::{authorize, Action, Caller, PermissionError, Role};
