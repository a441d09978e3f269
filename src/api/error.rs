//! HTTP mapping for [`Error`].
//!
//! Every failure leaves as `{"detail": "..."}`. Internal failures are logged
//! and redacted.

use crate::errors::Error;
use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use serde_json::json;
use tracing::error;

const INTERNAL_DETAIL: &str = "Internal server error";
const GATEWAY_DETAIL: &str = "Error communicating with John Deere";

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Authentication { .. } => StatusCode::UNAUTHORIZED,
            Self::Authorization { .. } => StatusCode::FORBIDDEN,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Gateway(_) => StatusCode::BAD_GATEWAY,
            Self::SchedulerMisconfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            Self::Authentication { message }
            | Self::Authorization { message }
            | Self::Validation { message } => message.clone(),
            Self::NotFound { .. } | Self::SchedulerMisconfigured => self.to_string(),
            Self::Gateway(e) => {
                error!(error = %e, "Vendor request failed");
                GATEWAY_DETAIL.to_string()
            }
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => {
                error!(error = %self, "Request failed");
                INTERNAL_DETAIL.to_string()
            }
        };

        let mut builder = HttpResponse::build(self.status_code());
        if matches!(self, Self::Authentication { .. }) {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(json!({ "detail": detail }))
    }
}
