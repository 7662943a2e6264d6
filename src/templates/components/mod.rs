use maud::{html, Markup};
use time::{macros::format_description, OffsetDateTime, UtcOffset};

use crate::domain::stats::format_cents;
use crate::domain::status::VisitStatus;

pub mod email_cta;
pub mod error;

pub use email_cta::email_cta_form;
pub use error::error_page;

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

pub fn money(cents: i64) -> Markup {
    html! { "$" (format_cents(cents)) }
}

pub fn progress_bar(pct: Option<u8>) -> Markup {
    html! {
        @if let Some(p) = pct {
            div class="progress" title=(format!("{p}% of target")) {
                div class="progress-fill" style=(format!("width: {p}%")) {}
            }
        }
    }
}

pub fn status_badge(status: VisitStatus, corporate: bool) -> Markup {
    let label = if corporate { status.corporate_label() } else { status.label() };
    html! {
        span class=(format!("badge badge-{}", status.as_str())) { (label) }
    }
}

/// `2024-05-01 18:30` in the configured local offset.
pub fn timestamp(ts: i64, tz_offset_minutes: i32) -> String {
    let offset = UtcOffset::from_whole_seconds(tz_offset_minutes * 60).unwrap_or(UtcOffset::UTC);
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|t| t.to_offset(offset).format(&fmt).ok())
        .unwrap_or_else(|| ts.to_string())
}
