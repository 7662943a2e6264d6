use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::campaign::{Business, Campaign, CampaignKind, Room};
use crate::domain::stats::format_cents;
use crate::errors::ServerError;

pub fn iso_time(ts: Option<i64>) -> String {
    ts.and_then(|t| DateTime::<Utc>::from_timestamp(t, 0))
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

fn csv_err(e: impl std::fmt::Display) -> ServerError {
    tracing::error!("csv export failed: {e}");
    ServerError::InternalError
}

/// Rooms (or businesses, for corporate campaigns) as CSV bytes.
pub fn campaign_csv(campaign: &Campaign, rooms: &[Room], businesses: &[Business]) -> Result<Vec<u8>, ServerError> {
    let mut w = csv::Writer::from_writer(Vec::new());
    match campaign.kind {
        CampaignKind::Residential => {
            w.write_record(["floor", "unit", "status", "donation", "note", "updated_at"])
                .map_err(csv_err)?;
            for r in rooms {
                w.write_record([
                    r.floor.to_string(),
                    r.label.clone(),
                    r.status.as_str().to_string(),
                    format_cents(r.donation_cents),
                    r.note.clone().unwrap_or_default(),
                    iso_time(r.updated_at),
                ])
                .map_err(csv_err)?;
            }
        }
        CampaignKind::Corporate => {
            w.write_record(["business", "contact", "status", "supports", "note", "updated_at"])
                .map_err(csv_err)?;
            for b in businesses {
                w.write_record([
                    b.name.clone(),
                    b.contact_name.clone().unwrap_or_default(),
                    b.status.as_str().to_string(),
                    b.supports.to_string(),
                    b.note.clone().unwrap_or_default(),
                    iso_time(b.updated_at),
                ])
                .map_err(csv_err)?;
            }
        }
    }
    w.into_inner().map_err(csv_err)
}
