// src/domain/stats.rs

use serde::Serialize;

use crate::domain::campaign::{Business, Campaign, CampaignKind, Room};
use crate::domain::status::VisitStatus;

/// Aggregate numbers shown on dashboards and reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CampaignStats {
    pub campaign_id: i64,
    pub name: String,
    pub units: usize,
    pub visited: usize,
    pub donated: usize,
    pub refused: usize,
    pub callbacks: usize,
    pub not_home: usize,
    pub raised_cents: i64,
    pub target_cents: Option<i64>,
    /// Whole percent of target reached, capped at 100.
    pub progress_pct: Option<u8>,
}

impl CampaignStats {
    pub fn coverage_pct(&self) -> u8 {
        percent(self.visited as i64, self.units as i64)
    }
}

fn percent(part: i64, whole: i64) -> u8 {
    if whole <= 0 {
        return 0;
    }
    ((i128::from(part.max(0)) * 100) / i128::from(whole)).min(100) as u8
}

fn saturating_sum<I: IntoIterator<Item = i64>>(values: I) -> i64 {
    values.into_iter().fold(0i64, i64::saturating_add)
}

fn tally<I: Iterator<Item = VisitStatus>>(stats: &mut CampaignStats, statuses: I) {
    for st in statuses {
        stats.units += 1;
        if st.is_visited() {
            stats.visited += 1;
        }
        match st {
            VisitStatus::Donated => stats.donated += 1,
            VisitStatus::NotInterested => stats.refused += 1,
            VisitStatus::Callback => stats.callbacks += 1,
            VisitStatus::NotHome => stats.not_home += 1,
            VisitStatus::Unvisited => {}
        }
    }
}

pub fn campaign_stats(
    campaign: &Campaign,
    rooms: &[Room],
    businesses: &[Business],
    support_unit_cents: i64,
) -> CampaignStats {
    let mut stats = CampaignStats {
        campaign_id: campaign.id,
        name: campaign.name.clone(),
        target_cents: campaign.target_cents,
        ..Default::default()
    };

    match campaign.kind {
        CampaignKind::Residential => {
            tally(&mut stats, rooms.iter().map(|r| r.status));
            stats.raised_cents = saturating_sum(rooms.iter().map(|r| r.donation_cents));
        }
        CampaignKind::Corporate => {
            tally(&mut stats, businesses.iter().map(|b| b.status));
            stats.raised_cents =
                saturating_sum(businesses.iter().map(|b| b.supports)).saturating_mul(support_unit_cents);
        }
    }

    stats.progress_pct = stats
        .target_cents
        .filter(|t| *t > 0)
        .map(|t| percent(stats.raised_cents, t));
    stats
}

/// Sum of several campaigns, for a team's headline numbers.
pub fn team_totals(all: &[CampaignStats]) -> CampaignStats {
    let mut total = CampaignStats { name: "All campaigns".to_string(), ..Default::default() };
    let mut target = 0i64;
    let mut any_target = false;
    for s in all {
        total.units += s.units;
        total.visited += s.visited;
        total.donated += s.donated;
        total.refused += s.refused;
        total.callbacks += s.callbacks;
        total.not_home += s.not_home;
        total.raised_cents = total.raised_cents.saturating_add(s.raised_cents);
        if let Some(t) = s.target_cents {
            target = target.saturating_add(t);
            any_target = true;
        }
    }
    if any_target {
        total.target_cents = Some(target);
        total.progress_pct = (target > 0).then(|| percent(total.raised_cents, target));
    }
    total
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub name: String,
    pub visits: i64,
    pub donations: i64,
    pub raised_cents: i64,
}

/// Per-floor breakdown for reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FloorBreakdown {
    pub floor: i64,
    pub units: usize,
    pub visited: usize,
    pub donated: usize,
    pub refused: usize,
    pub callbacks: usize,
    pub raised_cents: i64,
}

pub fn floor_breakdown(floors: i64, rooms: &[Room]) -> Vec<FloorBreakdown> {
    (1..=floors)
        .rev()
        .map(|floor| {
            let mut b = FloorBreakdown { floor, ..Default::default() };
            for r in rooms.iter().filter(|r| r.floor == floor) {
                b.units += 1;
                if r.status.is_visited() {
                    b.visited += 1;
                }
                match r.status {
                    VisitStatus::Donated => b.donated += 1,
                    VisitStatus::NotInterested => b.refused += 1,
                    VisitStatus::Callback => b.callbacks += 1,
                    _ => {}
                }
                b.raised_cents = b.raised_cents.saturating_add(r.donation_cents);
            }
            b
        })
        .collect()
}

/// `12345` cents -> `"123.45"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Parses `"1500"`, `"1500.5"`, `"1,500.50"` into cents.
pub fn parse_amount_cents(raw: &str) -> Result<i64, String> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',' && *c != '$').collect();
    if cleaned.is_empty() {
        return Err("empty amount".into());
    }
    let (whole, frac) = match cleaned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (cleaned.as_str(), ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(format!("'{raw}' is not an amount"));
    }
    if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("'{raw}' is not an amount"));
    }
    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| format!("'{raw}' is not an amount"))?
    };
    if whole < 0 {
        return Err("amount must not be negative".into());
    }
    let frac_cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().unwrap_or(0) * 10,
        _ => frac.parse::<i64>().unwrap_or(0),
    };
    whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac_cents))
        .ok_or_else(|| format!("'{raw}' is too large"))
}
