use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn attachment(buffer: Vec<u8>, content_type: &str, filename: &str) -> ResultResp {
    ResponseBuilder::new()
        .status(200)
        .header(http::header::CONTENT_TYPE, content_type)
        .header(
            http::header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(buffer))
        .map_err(|_| ServerError::InternalError)
}

pub fn xlsx_response(buffer: Vec<u8>, filename: &str) -> ResultResp {
    attachment(buffer, XLSX_MIME, filename)
}

pub fn csv_response(buffer: Vec<u8>, filename: &str) -> ResultResp {
    attachment(buffer, mime::TEXT_CSV_UTF_8.as_ref(), filename)
}
