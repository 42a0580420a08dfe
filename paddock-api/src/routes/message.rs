//! Message board routes.
//!
//! Standard CRUD plus `GET /latest`, the one read in the API documented to
//! return `data: null` in normal operation: a farm with no posts yet.

use axum::{extract::State, routing::get, Router};

use crate::{
    cached_db::CachedDbClient,
    envelope::Envelope,
    farm::FarmContext,
    operation,
    routes::generic::crud_routes,
    state::AppState,
    types::message::MessageResponse,
};

/// GET /api/v1/messages/latest - Most recent message on the board
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/messages/latest",
    tag = "Messages",
    responses(
        (status = 200, description = "Latest message, or null when the board is empty", body = MessageResponse),
    ),
))]
pub async fn latest_message(
    State(db): State<CachedDbClient>,
    farm: FarmContext,
) -> Envelope<Option<MessageResponse>> {
    operation::run(async move { db.latest::<MessageResponse>(farm.farm_id).await }).await
}

/// Create the message routes router.
pub fn create_router() -> Router<AppState> {
    crud_routes::<MessageResponse>().route("/latest", get(latest_message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_builds() {
        let _router = create_router();
    }
}
