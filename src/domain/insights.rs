// src/domain/insights.rs

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use serde::Serialize;

use crate::domain::status::VisitStatus;

/// Weight of a callback relative to a donation when scoring an hour.
const CALLBACK_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisitSample {
    pub recorded_at: i64,
    pub status: VisitStatus,
    pub donation_cents: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourScore {
    pub hour: u32,
    pub visits: u32,
    pub donations: u32,
    pub callbacks: u32,
    pub refusals: u32,
    pub donated_cents: i64,
    /// `None` until the hour has enough visits to be ranked.
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOfDayReport {
    pub hours: Vec<HourScore>,
    /// Scored hours, best first.
    pub ranked: Vec<u32>,
    pub best_hour: Option<u32>,
    pub current_hour: u32,
    pub current_score: Option<f64>,
}

pub fn local_hour(ts: i64, tz_offset_minutes: i32) -> u32 {
    let offset = FixedOffset::east_opt(tz_offset_minutes * 60).unwrap_or(Utc.fix());
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
        .hour()
}

pub fn score_hours(
    visits: &[VisitSample],
    tz_offset_minutes: i32,
    min_samples: u32,
    now: i64,
) -> TimeOfDayReport {
    let mut hours: Vec<HourScore> = (0..24)
        .map(|hour| HourScore { hour, ..Default::default() })
        .collect();

    for v in visits.iter().filter(|v| v.status.is_visited()) {
        let h = &mut hours[local_hour(v.recorded_at, tz_offset_minutes) as usize];
        h.visits += 1;
        match v.status {
            VisitStatus::Donated => {
                h.donations += 1;
                h.donated_cents = h.donated_cents.saturating_add(v.donation_cents);
            }
            VisitStatus::Callback => h.callbacks += 1,
            VisitStatus::NotInterested => h.refusals += 1,
            _ => {}
        }
    }

    for h in &mut hours {
        if h.visits >= min_samples.max(1) {
            let weighted = h.donations as f64 + CALLBACK_WEIGHT * h.callbacks as f64;
            h.score = Some(weighted / h.visits as f64);
        }
    }

    let mut ranked: Vec<&HourScore> = hours.iter().filter(|h| h.score.is_some()).collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.visits.cmp(&a.visits))
            .then(a.hour.cmp(&b.hour))
    });
    let ranked: Vec<u32> = ranked.into_iter().map(|h| h.hour).collect();

    let current_hour = local_hour(now, tz_offset_minutes);
    TimeOfDayReport {
        best_hour: ranked.first().copied(),
        current_score: hours[current_hour as usize].score,
        current_hour,
        ranked,
        hours,
    }
}
