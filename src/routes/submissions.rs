use crate::{
    app_state::AppState,
    domain::{
        EmailStatus, NewSubmission, Normalized, SubmissionDetails, SubmissionPayload,
        SubmissionType, ValidationError,
    },
    notification,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/submissions",
        post(submit).fallback(method_not_allowed),
    )
}

#[tracing::instrument(name = "Handle a form submission", skip_all)]
async fn submit(
    State(app_state): State<AppState>,
    payload: Result<Json<SubmissionPayload>, JsonRejection>,
) -> Result<Response, SubmissionError> {
    // A body the extractor cannot parse still gets the JSON error
    // shape every other failure path responds with.
    let Json(payload) = payload.map_err(SubmissionError::MalformedBody)?;

    let submission = match payload.normalize()? {
        Normalized::Decoy => {
            tracing::info!("Honeypot field was filled. Acknowledging without processing.");
            return Ok(Json(AckBody {
                success: true,
                message: "OK",
            })
            .into_response());
        }
        Normalized::Submission(submission) => submission,
    };

    let outcome = process(&app_state, &submission).await?;

    let message = match submission.kind() {
        SubmissionType::Purchase => {
            "Order registered. You will receive the order receipt with full details by email."
        }
        SubmissionType::Download => {
            "Registration complete. The eBook link will be sent by email."
        }
    };

    Ok(Json(AcceptedBody {
        success: true,
        message,
        id: outcome.id,
        email_sent: outcome.notified,
        email_error: outcome.notify_error,
    })
    .into_response())
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody {
            error: "method not allowed".into(),
        }),
    )
        .into_response()
}

struct SubmissionOutcome {
    id: Uuid,
    notified: bool,
    notify_error: Option<String>,
}

/// Persists the submission, attempts the confirmation email and
/// records the delivery outcome on the stored row.
///
/// Only the insert can fail the request. The email attempt and the
/// status update degrade into the row's `email_status` instead.
#[tracing::instrument(
    name = "Persist and notify",
    skip_all,
    fields(submission_kind = submission.kind().as_ref())
)]
async fn process(
    app_state: &AppState,
    submission: &NewSubmission,
) -> Result<SubmissionOutcome, SubmissionError> {
    let id = insert_submission(&app_state.db_pool, submission)
        .await
        .map_err(SubmissionError::Storage)?;

    let content = notification::content_for(submission, &app_state.payment);
    let notify_error = match app_state
        .email_client
        .send_email(
            &submission.email,
            &content.subject,
            &content.html,
            &content.text,
        )
        .await
    {
        Ok(()) => None,
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to send the confirmation email"
            );
            Some(e.to_string())
        }
    };

    let status = if notify_error.is_none() {
        EmailStatus::Sent
    } else {
        EmailStatus::Failed
    };

    // The submission is already persisted. A failing status update is
    // logged and must not fail the request.
    if let Err(e) = update_email_status(&app_state.db_pool, id, status, notify_error.as_deref()).await
    {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Failed to record the email status"
        );
    }

    Ok(SubmissionOutcome {
        id,
        notified: notify_error.is_none(),
        notify_error,
    })
}

#[tracing::instrument(name = "Insert submission", skip_all)]
async fn insert_submission(
    db_pool: &PgPool,
    submission: &NewSubmission,
) -> Result<Uuid, sqlx::Error> {
    let (quantity, address, delivery_notes, contribution, payment_method) =
        match &submission.details {
            SubmissionDetails::Purchase {
                quantity,
                address,
                delivery_notes,
            } => (
                Some(*quantity),
                Some(address),
                delivery_notes.as_deref(),
                None,
                None,
            ),
            SubmissionDetails::Download {
                contribution,
                payment_method,
            } => (None, None, None, *contribution, payment_method.as_deref()),
        };

    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO submissions (
            type, name, email, phone,
            quantity, contribution, payment_method,
            postal_code, address_line1, address_line2,
            district, city, state, country, delivery_notes,
            pix_key_shown, created_at, email_status
        )
        VALUES (
            $1, $2, $3, $4,
            $5, $6, $7,
            $8, $9, $10,
            $11, $12, $13, $14, $15,
            $16, $17, $18
        )
        RETURNING id
        "#,
    )
    .bind(submission.kind().as_ref())
    .bind(&submission.name)
    .bind(&submission.email)
    .bind(submission.phone.as_deref())
    .bind(quantity)
    .bind(contribution)
    .bind(payment_method)
    .bind(address.map(|a| a.postal_code.as_str()))
    .bind(address.map(|a| a.address_line1.as_str()))
    .bind(address.and_then(|a| a.address_line2.as_deref()))
    .bind(address.map(|a| a.district.as_str()))
    .bind(address.map(|a| a.city.as_str()))
    .bind(address.map(|a| a.state.as_str()))
    .bind(address.map(|a| a.country.as_str()))
    .bind(delivery_notes)
    .bind(submission.pix_key_shown())
    .bind(OffsetDateTime::now_utc())
    .bind(EmailStatus::Pending.as_ref())
    .fetch_one(db_pool)
    .await
}

#[tracing::instrument(
    name = "Record email status",
    skip(db_pool, status, error),
    fields(status = status.as_ref())
)]
async fn update_email_status(
    db_pool: &PgPool,
    id: Uuid,
    status: EmailStatus,
    error: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE submissions SET email_status = $1, email_error = $2
        WHERE id = $3
        "#,
    )
    .bind(status.as_ref())
    .bind(error)
    .bind(id)
    .execute(db_pool)
    .await?;

    Ok(())
}

#[derive(Serialize)]
struct AcceptedBody {
    success: bool,
    message: &'static str,
    id: Uuid,
    #[serde(rename = "emailSent")]
    email_sent: bool,
    #[serde(rename = "emailError")]
    email_error: Option<String>,
}

#[derive(Serialize)]
struct AckBody {
    success: bool,
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, thiserror::Error)]
enum SubmissionError {
    #[error("invalid request body")]
    MalformedBody(#[source] JsonRejection),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to save the submission")]
    Storage(#[source] sqlx::Error),
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        tracing::error!("{:#?}", self);

        let (status, message) = match &self {
            Self::MalformedBody(rejection) => (rejection.status(), self.to_string()),
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
