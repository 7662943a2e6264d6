use crate::errors::{ImportIssue, ServerError};
use crate::templates::components::error_page;
use astra::{Body, Response, ResponseBuilder};
use serde::Serialize;

pub type ResultResp = Result<Response, ServerError>;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<&'a [ImportIssue]>,
}

/// Renders an error for the surface it happened on: JSON under `/api`,
/// the HTML error page everywhere else.
pub fn error_response(err: &ServerError, api: bool) -> Response {
    let status = err.status();
    if status >= 500 {
        tracing::error!(status, error = %err, "request failed");
    } else {
        tracing::debug!(status, error = %err, "request rejected");
    }

    let (content_type, body) = if api {
        let issues = match err {
            ServerError::Import(issues) => Some(issues.as_slice()),
            _ => None,
        };
        let body = ErrorBody { error: err.kind(), message: public_message(err), issues };
        (
            mime::APPLICATION_JSON.as_ref(),
            serde_json::to_string(&body).unwrap_or_else(|_| r#"{"error":"internal"}"#.to_string()),
        )
    } else {
        (
            mime::TEXT_HTML_UTF_8.as_ref(),
            error_page(status, &public_message(err)).into_string(),
        )
    };

    ResponseBuilder::new()
        .status(status)
        .header(http::header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}

/// Database and spreadsheet details stay in the log.
fn public_message(err: &ServerError) -> String {
    match err {
        ServerError::DbError(_) | ServerError::XlsxError(_) | ServerError::InternalError => {
            "Internal Server Error".to_string()
        }
        other => other.to_string(),
    }
}
