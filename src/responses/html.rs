use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};
use maud::Markup;

pub fn html_response(markup: Markup) -> ResultResp {
    html_status_response(200, markup)
}

pub fn html_status_response(status: u16, markup: Markup) -> ResultResp {
    ResponseBuilder::new()
        .status(status)
        .header(http::header::CONTENT_TYPE, mime::TEXT_HTML_UTF_8.as_ref())
        .body(Body::from(markup.into_string()))
        .map_err(|_| ServerError::InternalError)
}

/// 303 so a POSTed form lands on a GET. `cookie` is a full `Set-Cookie` value.
pub fn redirect_response(location: &str, cookie: Option<String>) -> ResultResp {
    let mut builder = ResponseBuilder::new()
        .status(303)
        .header(http::header::LOCATION, location);
    if let Some(c) = cookie {
        builder = builder.header(http::header::SET_COOKIE, c);
    }
    builder
        .body(Body::empty())
        .map_err(|_| ServerError::InternalError)
}
