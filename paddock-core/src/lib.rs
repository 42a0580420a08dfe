//! Paddock Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types - no business logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub mod enums;
pub mod error;

pub use enums::*;
pub use error::{CoreError, CoreResult, StorageError};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Identifier of the farm (tenant) a record belongs to.
pub type FarmId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

// ============================================================================
// RESOURCE KIND
// ============================================================================

/// Resource discriminator for polymorphic references.
///
/// Doubles as the query-key *scope*: every cache key for a resource carries
/// this value, and invalidation by scope prefix catches every derived key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Boarder,
    Horse,
    Stall,
    Booking,
    Invoice,
    Expense,
    Shift,
    MaintenanceTask,
    Pasture,
    Message,
}

impl ResourceKind {
    /// All resource kinds, in declaration order.
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Boarder,
        ResourceKind::Horse,
        ResourceKind::Stall,
        ResourceKind::Booking,
        ResourceKind::Invoice,
        ResourceKind::Expense,
        ResourceKind::Shift,
        ResourceKind::MaintenanceTask,
        ResourceKind::Pasture,
        ResourceKind::Message,
    ];

    /// Query-key scope string for this resource.
    pub fn scope(&self) -> &'static str {
        match self {
            ResourceKind::Boarder => "boarder",
            ResourceKind::Horse => "horse",
            ResourceKind::Stall => "stall",
            ResourceKind::Booking => "booking",
            ResourceKind::Invoice => "invoice",
            ResourceKind::Expense => "expense",
            ResourceKind::Shift => "shift",
            ResourceKind::MaintenanceTask => "maintenance_task",
            ResourceKind::Pasture => "pasture",
            ResourceKind::Message => "message",
        }
    }

    /// Storage table name. Tables are named after the resource itself.
    pub fn table(&self) -> &'static str {
        self.scope()
    }

    /// Primary key column name (`<resource>_id`).
    pub fn pk_column(&self) -> &'static str {
        match self {
            ResourceKind::Boarder => "boarder_id",
            ResourceKind::Horse => "horse_id",
            ResourceKind::Stall => "stall_id",
            ResourceKind::Booking => "booking_id",
            ResourceKind::Invoice => "invoice_id",
            ResourceKind::Expense => "expense_id",
            ResourceKind::Shift => "shift_id",
            ResourceKind::MaintenanceTask => "maintenance_task_id",
            ResourceKind::Pasture => "pasture_id",
            ResourceKind::Message => "message_id",
        }
    }

    /// Human-readable name for error messages ("Boarder", "Maintenance task").
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::Boarder => "Boarder",
            ResourceKind::Horse => "Horse",
            ResourceKind::Stall => "Stall",
            ResourceKind::Booking => "Booking",
            ResourceKind::Invoice => "Invoice",
            ResourceKind::Expense => "Expense",
            ResourceKind::Shift => "Shift",
            ResourceKind::MaintenanceTask => "Maintenance task",
            ResourceKind::Pasture => "Pasture",
            ResourceKind::Message => "Message",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scope())
    }
}

/// Error returned when parsing a `ResourceKind` from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource kind: {0}")]
pub struct ResourceKindParseError(pub String);

impl FromStr for ResourceKind {
    type Err = ResourceKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .iter()
            .find(|k| k.scope() == s)
            .copied()
            .ok_or_else(|| ResourceKindParseError(s.to_string()))
    }
}
