//! Horse-related API types

use paddock_core::{EntityId, FarmId, HorseSex, ResourceKind, Timestamp};
use serde::{Deserialize, Serialize};

use crate::impl_resource;
use crate::resource::{ListFilter, Pagination, SqlParam};
use crate::schema::{Field, Schema};
use crate::validation::HasUpdates;

use super::DEFAULT_PAGE_SIZE;

/// Request to create a new horse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateHorseRequest {
    /// Name of the horse
    pub name: String,
    /// Owning boarder
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub boarder_id: EntityId,
    /// Breed, free-form
    pub breed: Option<String>,
    pub sex: Option<HorseSex>,
    /// Year of birth
    pub birth_year: Option<i32>,
    /// Assigned stall, if any
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub stall_id: Option<EntityId>,
}

/// Request to update an existing horse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateHorseRequest {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub sex: Option<HorseSex>,
    pub birth_year: Option<i32>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub stall_id: Option<EntityId>,
}

impl HasUpdates for UpdateHorseRequest {
    fn has_any_updates(&self) -> bool {
        self.name.is_some()
            || self.breed.is_some()
            || self.sex.is_some()
            || self.birth_year.is_some()
            || self.stall_id.is_some()
    }
}

/// Filter for listing horses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HorseListFilter {
    #[serde(flatten)]
    pub pagination: Pagination,
    /// Only horses owned by this boarder
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub boarder_id: Option<EntityId>,
    pub sex: Option<HorseSex>,
}

impl ListFilter for HorseListFilter {
    fn page(&self) -> i64 {
        self.pagination.page
    }

    fn page_size(&self) -> i64 {
        self.pagination.page_size
    }

    fn predicates(&self) -> Vec<(&'static str, SqlParam)> {
        let mut predicates = Vec::new();
        if let Some(boarder_id) = self.boarder_id {
            predicates.push(("boarder_id =", SqlParam::Uuid(boarder_id)));
        }
        if let Some(sex) = self.sex {
            predicates.push(("sex =", SqlParam::String(sex.as_db_str().to_string())));
        }
        predicates
    }

    fn key_fields(&self) -> Vec<(String, String)> {
        let mut fields = self.pagination.key_fields();
        if let Some(boarder_id) = self.boarder_id {
            fields.push(("boarder_id".to_string(), boarder_id.to_string()));
        }
        if let Some(sex) = self.sex {
            fields.push(("sex".to_string(), sex.as_db_str().to_string()));
        }
        fields
    }
}

/// Horse response mirroring one storage row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HorseResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub horse_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub farm_id: FarmId,
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub boarder_id: EntityId,
    pub breed: Option<String>,
    pub sex: Option<HorseSex>,
    pub birth_year: Option<i32>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub stall_id: Option<EntityId>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

pub fn create_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("name").required())
        .field(Field::id("boarder_id").required())
        .field(Field::text("breed"))
        .field(Field::select("sex", HorseSex::OPTIONS))
        .field(Field::integer("birth_year").min(1980.0).max(2100.0))
        .field(Field::id("stall_id"))
}

pub fn update_schema() -> Schema {
    Schema::new()
        .field(Field::non_empty_text("name"))
        .field(Field::text("breed"))
        .field(Field::select("sex", HorseSex::OPTIONS))
        .field(Field::integer("birth_year").min(1980.0).max(2100.0))
        .field(Field::id("stall_id"))
}

pub fn list_schema() -> Schema {
    Schema::new()
        .paginated(DEFAULT_PAGE_SIZE)
        .field(Field::id("boarder_id"))
        .field(Field::select("sex", HorseSex::OPTIONS))
}

impl_resource! {
    HorseResponse {
        kind: ResourceKind::Horse,
        id_field: horse_id,
        create_type: CreateHorseRequest,
        update_type: UpdateHorseRequest,
        filter_type: HorseListFilter,
        create_columns: ["name", "boarder_id", "breed", "sex", "birth_year", "stall_id"],
        create_params: |req| vec![
            SqlParam::String(req.name.clone()),
            SqlParam::Uuid(req.boarder_id),
            SqlParam::OptString(req.breed.clone()),
            SqlParam::OptString(req.sex.map(|s| s.as_db_str().to_string())),
            SqlParam::OptInt(req.birth_year),
            SqlParam::OptUuid(req.stall_id),
        ],
        update_params: |req| {
            let mut updates = Vec::new();
            if let Some(name) = &req.name {
                updates.push(("name", SqlParam::String(name.clone())));
            }
            if let Some(breed) = &req.breed {
                updates.push(("breed", SqlParam::String(breed.clone())));
            }
            if let Some(sex) = req.sex {
                updates.push(("sex", SqlParam::String(sex.as_db_str().to_string())));
            }
            if let Some(birth_year) = req.birth_year {
                updates.push(("birth_year", SqlParam::Int(birth_year)));
            }
            if let Some(stall_id) = req.stall_id {
                updates.push(("stall_id", SqlParam::Uuid(stall_id)));
            }
            updates
        },
    }
}
