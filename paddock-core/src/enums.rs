//! Enum types for paddock entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a status string does not match any variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

/// Implement `as_db_str`/`from_db_str`, `Display`, and `FromStr` for a
/// snake_case-serialized status enum.
macro_rules! impl_db_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            /// Convert to database string representation.
            pub fn as_db_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $s,)+
                }
            }

            /// Parse from database string representation.
            pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
                match s {
                    $($s => Ok($ty::$variant),)+
                    _ => Err(EnumParseError { kind: $kind, value: s.to_string() }),
                }
            }

            /// All accepted wire/database strings, for schema `Select` options.
            pub const OPTIONS: &'static [&'static str] = &[$($s),+];
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_db_str())
            }
        }

        impl FromStr for $ty {
            type Err = EnumParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_db_str(s)
            }
        }
    };
}

/// Occupancy status of a stall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum StallStatus {
    /// Stall is empty and ready for a new horse
    #[default]
    Available,
    /// A horse currently lives here
    Occupied,
    /// Out of service for repairs or deep cleaning
    Maintenance,
}

impl_db_enum!(StallStatus, "stall status", {
    Available => "available",
    Occupied => "occupied",
    Maintenance => "maintenance",
});

/// Lifecycle of a facility booking (arena, wash rack, trailer parking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl_db_enum!(BookingStatus, "booking status", {
    Pending => "pending",
    Confirmed => "confirmed",
    Cancelled => "cancelled",
    Completed => "completed",
});

/// Billing state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Void,
}

impl_db_enum!(InvoiceStatus, "invoice status", {
    Draft => "draft",
    Sent => "sent",
    Paid => "paid",
    Overdue => "overdue",
    Void => "void",
});

/// Spending category for farm expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Feed,
    Bedding,
    Veterinary,
    Farrier,
    Equipment,
    Labor,
    Utilities,
    Other,
}

impl_db_enum!(ExpenseCategory, "expense category", {
    Feed => "feed",
    Bedding => "bedding",
    Veterinary => "veterinary",
    Farrier => "farrier",
    Equipment => "equipment",
    Labor => "labor",
    Utilities => "utilities",
    Other => "other",
});

/// Staff role a payroll shift is scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ShiftRole {
    Groom,
    Trainer,
    FarmHand,
    Veterinarian,
    Office,
}

impl_db_enum!(ShiftRole, "shift role", {
    Groom => "groom",
    Trainer => "trainer",
    FarmHand => "farm_hand",
    Veterinarian => "veterinarian",
    Office => "office",
});

/// Progress of a maintenance task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    #[default]
    Open,
    InProgress,
    Done,
}

impl_db_enum!(MaintenanceStatus, "maintenance status", {
    Open => "open",
    InProgress => "in_progress",
    Done => "done",
});

/// Urgency of a maintenance task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MaintenancePriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl_db_enum!(MaintenancePriority, "maintenance priority", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Urgent => "urgent",
});

/// Delivery priority of a barn message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MessagePriority {
    Low,
    #[default]
    Normal,
    High,
}

impl_db_enum!(MessagePriority, "message priority", {
    Low => "low",
    Normal => "normal",
    High => "high",
});

/// Sex of a horse, as tracked for stabling purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum HorseSex {
    Mare,
    Stallion,
    Gelding,
}

impl_db_enum!(HorseSex, "horse sex", {
    Mare => "mare",
    Stallion => "stallion",
    Gelding => "gelding",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_strings_round_trip() {
        for s in StallStatus::OPTIONS {
            assert_eq!(
                StallStatus::from_db_str(s).expect("parses").as_db_str(),
                *s
            );
        }
        for s in InvoiceStatus::OPTIONS {
            assert_eq!(
                InvoiceStatus::from_db_str(s).expect("parses").as_db_str(),
                *s
            );
        }
    }

    #[test]
    fn serde_matches_db_strings() {
        let json = serde_json::to_string(&ShiftRole::FarmHand).expect("serializes");
        assert_eq!(json, "\"farm_hand\"");
        let parsed: ShiftRole = serde_json::from_str("\"farm_hand\"").expect("deserializes");
        assert_eq!(parsed, ShiftRole::FarmHand);
    }

    #[test]
    fn unknown_value_is_rejected() {
        let err = BookingStatus::from_db_str("tentative").expect_err("rejects");
        assert_eq!(err.kind, "booking status");
        assert!(err.to_string().contains("tentative"));
    }
}
