// src/domain/campaign.rs

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::status::VisitStatus;
use crate::errors::ServerError;

pub const MAX_FLOORS: i64 = 200;
pub const MAX_UNITS_PER_FLOOR: i64 = 100;
/// Largest single donation or campaign target, in cents.
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000;
/// Largest number of supports one business can pledge.
pub const MAX_SUPPORTS: i64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignKind {
    Residential,
    Corporate,
}

impl CampaignKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignKind::Residential => "residential",
            CampaignKind::Corporate => "corporate",
        }
    }
}

impl FromStr for CampaignKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "residential" => Ok(CampaignKind::Residential),
            "corporate" => Ok(CampaignKind::Corporate),
            other => Err(format!("unknown campaign kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Campaign {
    pub id: i64,
    pub team_id: i64,
    pub name: String,
    pub kind: CampaignKind,
    pub floors: i64,
    pub units_per_floor: i64,
    pub target_cents: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: i64,
}

/// Input for creating a campaign, from JSON or a CSV row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewCampaign {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: CampaignKind,
    #[serde(default)]
    pub floors: i64,
    #[serde(default)]
    pub units_per_floor: i64,
    #[serde(default)]
    pub target_cents: Option<i64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

fn default_kind() -> CampaignKind {
    CampaignKind::Residential
}

impl NewCampaign {
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.name.trim().is_empty() {
            return Err(ServerError::BadRequest("campaign name must not be empty".into()));
        }
        if self.kind == CampaignKind::Residential {
            if !(1..=MAX_FLOORS).contains(&self.floors) {
                return Err(ServerError::BadRequest(format!(
                    "floors must be between 1 and {MAX_FLOORS}"
                )));
            }
            if !(1..=MAX_UNITS_PER_FLOOR).contains(&self.units_per_floor) {
                return Err(ServerError::BadRequest(format!(
                    "units_per_floor must be between 1 and {MAX_UNITS_PER_FLOOR}"
                )));
            }
        }
        if matches!(self.target_cents, Some(t) if t < 0) {
            return Err(ServerError::BadRequest("target amount must not be negative".into()));
        }
        if matches!(self.target_cents, Some(t) if t > MAX_AMOUNT_CENTS) {
            return Err(ServerError::BadRequest(format!(
                "target amount must be at most {MAX_AMOUNT_CENTS} cents"
            )));
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(ServerError::BadRequest("coordinates out of range".into()));
                }
            }
            (None, None) => {}
            _ => {
                return Err(ServerError::BadRequest(
                    "latitude and longitude must be given together".into(),
                ))
            }
        }
        Ok(())
    }
}

/// Door label shown to volunteers: floor followed by a two-digit position.
pub fn room_label(floor: i64, position: i64) -> String {
    format!("{floor}{position:02}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub id: i64,
    pub campaign_id: i64,
    pub floor: i64,
    pub position: i64,
    pub label: String,
    pub status: VisitStatus,
    pub note: Option<String>,
    pub donation_cents: i64,
    pub callback_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Business {
    pub id: i64,
    pub campaign_id: i64,
    pub name: String,
    pub contact_name: Option<String>,
    pub status: VisitStatus,
    pub supports: i64,
    pub note: Option<String>,
    pub callback_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub updated_by: Option<i64>,
}

/// Fields a volunteer sets when recording a visit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusUpdate {
    pub status: VisitStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub donation_cents: i64,
    #[serde(default)]
    pub callback_at: Option<i64>,
}

impl StatusUpdate {
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.donation_cents < 0 {
            return Err(ServerError::BadRequest("donation must not be negative".into()));
        }
        if self.donation_cents > MAX_AMOUNT_CENTS {
            return Err(ServerError::BadRequest(format!(
                "donation must be at most {MAX_AMOUNT_CENTS} cents"
            )));
        }
        if self.status == VisitStatus::Callback && self.callback_at.is_none() {
            return Err(ServerError::BadRequest("callback requires callback_at".into()));
        }
        Ok(())
    }

    /// Callback time only survives on callback status.
    pub fn effective_callback_at(&self) -> Option<i64> {
        match self.status {
            VisitStatus::Callback => self.callback_at,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BusinessUpdate {
    pub status: VisitStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub supports: i64,
    #[serde(default)]
    pub callback_at: Option<i64>,
}

impl BusinessUpdate {
    pub fn validate(&self) -> Result<(), ServerError> {
        if !(0..=MAX_SUPPORTS).contains(&self.supports) {
            return Err(ServerError::BadRequest(format!(
                "supports must be between 0 and {MAX_SUPPORTS}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residential(floors: i64, units: i64) -> NewCampaign {
        NewCampaign {
            name: "Maple Court".into(),
            kind: CampaignKind::Residential,
            floors,
            units_per_floor: units,
            target_cents: None,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn label_pads_position() {
        assert_eq!(room_label(3, 5), "305");
        assert_eq!(room_label(12, 14), "1214");
    }

    #[test]
    fn residential_needs_floors_and_units() {
        assert!(residential(0, 4).validate().is_err());
        assert!(residential(4, 0).validate().is_err());
        assert!(residential(4, 6).validate().is_ok());
    }

    #[test]
    fn corporate_ignores_floor_layout() {
        let mut c = residential(0, 0);
        c.kind = CampaignKind::Corporate;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn coordinates_must_pair() {
        let mut c = residential(2, 2);
        c.latitude = Some(45.0);
        assert!(c.validate().is_err());
        c.longitude = Some(-73.5);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn callback_requires_time() {
        let upd = StatusUpdate {
            status: VisitStatus::Callback,
            note: None,
            donation_cents: 0,
            callback_at: None,
        };
        assert!(upd.validate().is_err());
    }

    #[test]
    fn amounts_are_bounded() {
        let mut upd = StatusUpdate {
            status: VisitStatus::Donated,
            note: None,
            donation_cents: MAX_AMOUNT_CENTS,
            callback_at: None,
        };
        assert!(upd.validate().is_ok());
        upd.donation_cents += 1;
        assert!(upd.validate().is_err());

        let mut c = residential(2, 2);
        c.target_cents = Some(MAX_AMOUNT_CENTS + 1);
        assert!(c.validate().is_err());

        let mut b = BusinessUpdate { status: VisitStatus::Donated, note: None, supports: MAX_SUPPORTS, callback_at: None };
        assert!(b.validate().is_ok());
        b.supports = 10_000_000_000_000_000;
        assert!(b.validate().is_err());
        b.supports = -1;
        assert!(b.validate().is_err());
    }
}
