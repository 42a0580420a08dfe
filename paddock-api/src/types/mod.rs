//! Per-resource request/response types.
//!
//! One module per resource, each declaring the Create/Update/List request
//! types, the response type mirroring the storage row, the input schemas,
//! and the `impl_resource!` block wiring it all into the generic CRUD
//! machinery.

pub mod boarder;
pub mod booking;
pub mod expense;
pub mod horse;
pub mod invoice;
pub mod maintenance_task;
pub mod message;
pub mod pasture;
pub mod shift;
pub mod stall;

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Default page size for message listings, which are read in bulk.
pub const MESSAGE_PAGE_SIZE: i64 = 50;
