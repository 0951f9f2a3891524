//! Notification publishing endpoint.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use axum_helpers::errors::responses::{BadRequestValidationResponse, InternalServerErrorResponse};
use axum_helpers::{AppError, ValidatedJson};
use messaging::{InMemoryQueue, MessageQueueService};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(
    paths(publish_notification),
    components(
        schemas(PublishNotificationRequest, PublishNotificationResponse),
        responses(BadRequestValidationResponse, InternalServerErrorResponse)
    ),
    tags((name = "Notifications", description = "Queue notifications for the background processor"))
)]
pub struct ApiDoc;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PublishNotificationRequest {
    #[validate(length(min = 1, message = "recipient is required"))]
    pub recipient: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublishNotificationResponse {
    pub message_id: Uuid,
}

pub fn router(publisher: MessageQueueService<InMemoryQueue>) -> Router {
    Router::new()
        .route("/", post(publish_notification))
        .with_state(publisher)
}

/// Queue a notification
#[utoipa::path(
    post,
    path = "",
    tag = "Notifications",
    request_body = PublishNotificationRequest,
    responses(
        (status = 202, description = "Notification queued", body = PublishNotificationResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn publish_notification(
    State(publisher): State<MessageQueueService<InMemoryQueue>>,
    ValidatedJson(request): ValidatedJson<PublishNotificationRequest>,
) -> Result<(StatusCode, Json<PublishNotificationResponse>), AppError> {
    let message_id = publisher
        .publish_notification(&request.recipient, &request.title, &request.content)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishNotificationResponse { message_id }),
    ))
}
