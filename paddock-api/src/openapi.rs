//! OpenAPI Specification
//!
//! The OpenAPI document for the REST API, generated with utoipa from the
//! annotated boarder, message, and health routes plus the shared schemas.
//! The generic CRUD resources follow the boarder routes exactly, so the
//! boarder paths document the shape of every resource.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::resource::Pagination;
use crate::routes::{boarder, health, message};
use crate::schema::{FieldError, ValidationErrors};
use crate::types::{
    boarder::{BoarderResponse, CreateBoarderRequest, UpdateBoarderRequest},
    booking::{BookingResponse, CreateBookingRequest, UpdateBookingRequest},
    expense::{CreateExpenseRequest, ExpenseResponse, UpdateExpenseRequest},
    horse::{CreateHorseRequest, HorseResponse, UpdateHorseRequest},
    invoice::{CreateInvoiceRequest, InvoiceResponse, UpdateInvoiceRequest},
    maintenance_task::{
        CreateMaintenanceTaskRequest, MaintenanceTaskResponse, UpdateMaintenanceTaskRequest,
    },
    message::{CreateMessageRequest, MessageResponse, UpdateMessageRequest},
    pasture::{CreatePastureRequest, PastureResponse, UpdatePastureRequest},
    shift::{CreateShiftRequest, ShiftResponse, UpdateShiftRequest},
    stall::{CreateStallRequest, StallResponse, UpdateStallRequest},
};

use paddock_core::{
    BookingStatus, ExpenseCategory, HorseSex, InvoiceStatus, MaintenancePriority,
    MaintenanceStatus, MessagePriority, ShiftRole, StallStatus,
};

/// OpenAPI document for the paddock API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Paddock API",
        version = "0.1.0",
        description = "Farm and boarding stable management backend",
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Boarders", description = "People boarding horses at the farm"),
        (name = "Messages", description = "Farm message board"),
        (name = "Health", description = "Liveness and readiness checks")
    ),
    paths(
        boarder::create_boarder,
        boarder::list_boarders,
        boarder::get_boarder,
        boarder::update_boarder,
        boarder::delete_boarder,
        boarder::list_boarder_invoices,

        message::latest_message,

        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(schemas(
        // Shared
        ApiError,
        ErrorCode,
        ValidationErrors,
        FieldError,
        Pagination,

        // Domain enums
        StallStatus,
        BookingStatus,
        InvoiceStatus,
        ExpenseCategory,
        ShiftRole,
        MaintenanceStatus,
        MaintenancePriority,
        MessagePriority,
        HorseSex,

        // Resources
        BoarderResponse, CreateBoarderRequest, UpdateBoarderRequest,
        HorseResponse, CreateHorseRequest, UpdateHorseRequest,
        StallResponse, CreateStallRequest, UpdateStallRequest,
        BookingResponse, CreateBookingRequest, UpdateBookingRequest,
        InvoiceResponse, CreateInvoiceRequest, UpdateInvoiceRequest,
        ExpenseResponse, CreateExpenseRequest, UpdateExpenseRequest,
        ShiftResponse, CreateShiftRequest, UpdateShiftRequest,
        MaintenanceTaskResponse, CreateMaintenanceTaskRequest, UpdateMaintenanceTaskRequest,
        PastureResponse, CreatePastureRequest, UpdatePastureRequest,
        MessageResponse, CreateMessageRequest, UpdateMessageRequest,

        // Health
        health::HealthResponse,
        health::HealthStatus,
        health::HealthDetails,
        health::ComponentHealth,
    ))
)]
pub struct ApiDoc;
