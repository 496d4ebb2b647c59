//! Portico Core - data-access and authorization kernel
//!
//! Pure building blocks shared by the Portico HTTP layer and by view code.
//! Nothing in this crate performs I/O.
//!
//! # Modules
//!
//! - [`codec`]: identifier ↔ opaque URL-safe token
//! - [`permission`]: ordered permission levels and grant resolution
//! - [`query`]: typed filters, pagination, and paged results
//! - [`errors`]: the error taxonomy used across the kernel
//!
//! # Example
//!
//! ```
//! use portico_core::codec::{decode_to_number, encode};
//! use portico_core::permission::{GrantSet, PermissionLevel, PermissionRecord, ResourceContext};
//!
//! let token = encode(42_u64);
//! assert_eq!(decode_to_number(&token).unwrap(), 42.0);
//!
//! let grants = GrantSet::from_records([PermissionRecord::new("users", PermissionLevel::Write)]);
//! assert!(grants.level(&ResourceContext::new("users")).can_read());
//! ```

#![forbid(unsafe_code)]

/// Opaque route token codec
pub mod codec;

/// Unified error handling
pub mod errors;

/// Permission levels and grant resolution
pub mod permission;

/// Typed search requests
pub mod query;

pub use codec::{Identifier, OpaqueToken, TokenCodec};
pub use errors::{ErrorKind, FieldError, PorticoError, Result};
pub use permission::{GrantSet, PermissionLevel, PermissionRecord, ResourceContext};
