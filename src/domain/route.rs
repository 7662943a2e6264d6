// src/domain/route.rs

//! Route suggestions for a building: where to start and which floors to skip.
//! Everything here is a pure function over rows already fetched.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::domain::status::VisitStatus;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteParams {
    pub callback_window_secs: i64,
    pub skip_min_visits: usize,
    /// Refusal rate above which an unflagged floor gets flagged.
    pub skip_flag_rate: f64,
    /// Engagement rate above which a flagged floor gets cleared.
    pub skip_clear_engagement_rate: f64,
}

impl Default for RouteParams {
    fn default() -> Self {
        Self {
            callback_window_secs: 2 * 60 * 60,
            skip_min_visits: 5,
            skip_flag_rate: 0.70,
            skip_clear_engagement_rate: 0.40,
        }
    }
}

/// The slice of a room the heuristics look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomSample {
    pub floor: i64,
    pub status: VisitStatus,
    pub callback_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StartFloor {
    Callbacks { floor: i64, due: usize },
    TopFloor { floor: i64 },
}

impl StartFloor {
    pub fn floor(&self) -> i64 {
        match self {
            StartFloor::Callbacks { floor, .. } | StartFloor::TopFloor { floor } => *floor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorSummary {
    pub floor: i64,
    pub visited: usize,
    pub refusals: usize,
    pub callbacks_due: usize,
    pub refusal_rate: Option<f64>,
    pub skip: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub start: Option<StartFloor>,
    pub skip: Vec<i64>,
    pub floors: Vec<FloorSummary>,
}

fn callback_due(room: &RoomSample, now: i64, window: i64) -> bool {
    room.status == VisitStatus::Callback
        && matches!(room.callback_at, Some(at) if at >= now && at <= now + window)
}

/// Floor with the most callbacks due in the window; ties go to the higher
/// floor. Falls back to the top floor.
pub fn best_start_floor(floors: i64, rooms: &[RoomSample], now: i64, window: i64) -> Option<StartFloor> {
    if floors < 1 {
        return None;
    }
    let mut due: BTreeMap<i64, usize> = BTreeMap::new();
    for room in rooms.iter().filter(|r| callback_due(r, now, window)) {
        *due.entry(room.floor).or_default() += 1;
    }
    due.into_iter()
        .max_by(|(fa, na), (fb, nb)| na.cmp(nb).then(fa.cmp(fb)))
        .map(|(floor, due)| StartFloor::Callbacks { floor, due })
        .or(Some(StartFloor::TopFloor { floor: floors }))
}

/// Hysteresis for one floor's skip flag.
pub fn next_skip_flag(previously_flagged: bool, visited: usize, refusals: usize, params: &RouteParams) -> bool {
    if visited < params.skip_min_visits || visited == 0 {
        return previously_flagged;
    }
    let refusal_rate = refusals as f64 / visited as f64;
    if previously_flagged {
        let engagement = (visited - refusals.min(visited)) as f64 / visited as f64;
        engagement <= params.skip_clear_engagement_rate
    } else {
        refusal_rate > params.skip_flag_rate
    }
}

pub fn plan_route(
    floors: i64,
    rooms: &[RoomSample],
    previously_flagged: &HashSet<i64>,
    now: i64,
    params: &RouteParams,
) -> RoutePlan {
    let mut summaries = Vec::new();
    for floor in (1..=floors).rev() {
        let on_floor = rooms.iter().filter(|r| r.floor == floor);
        let (mut visited, mut refusals, mut callbacks_due) = (0usize, 0usize, 0usize);
        for room in on_floor {
            if room.status.is_visited() {
                visited += 1;
            }
            if room.status == VisitStatus::NotInterested {
                refusals += 1;
            }
            if callback_due(room, now, params.callback_window_secs) {
                callbacks_due += 1;
            }
        }
        let skip = next_skip_flag(previously_flagged.contains(&floor), visited, refusals, params);
        summaries.push(FloorSummary {
            floor,
            visited,
            refusals,
            callbacks_due,
            refusal_rate: (visited > 0).then(|| refusals as f64 / visited as f64),
            skip,
        });
    }

    RoutePlan {
        start: best_start_floor(floors, rooms, now, params.callback_window_secs),
        skip: summaries.iter().filter(|s| s.skip).map(|s| s.floor).collect(),
        floors: summaries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn room(floor: i64, status: VisitStatus) -> RoomSample {
        RoomSample { floor, status, callback_at: None }
    }

    fn callback(floor: i64, at: i64) -> RoomSample {
        RoomSample { floor, status: VisitStatus::Callback, callback_at: Some(at) }
    }

    fn floor_with(floor: i64, refusals: usize, others: usize) -> Vec<RoomSample> {
        let mut v = vec![room(floor, VisitStatus::NotInterested); refusals];
        v.extend(vec![room(floor, VisitStatus::Donated); others]);
        v
    }

    #[test]
    fn start_defaults_to_top_floor() {
        let start = best_start_floor(8, &[], 1000, 7200);
        assert_eq!(start, Some(StartFloor::TopFloor { floor: 8 }));
    }

    #[test]
    fn no_floors_no_start() {
        assert_eq!(best_start_floor(0, &[], 1000, 7200), None);
    }

    #[test]
    fn start_prefers_most_callbacks_in_window() {
        let now = 10_000;
        let rooms = vec![
            callback(2, now + 60),
            callback(2, now + 3600),
            callback(5, now + 120),
            // Outside the window or already past.
            callback(5, now + 7201),
            callback(5, now - 1),
            callback(6, now + 8000),
        ];
        assert_eq!(
            best_start_floor(6, &rooms, now, 7200),
            Some(StartFloor::Callbacks { floor: 2, due: 2 })
        );
    }

    #[test]
    fn tie_goes_to_higher_floor() {
        let now = 0;
        let rooms = vec![callback(2, 10), callback(4, 20)];
        assert_eq!(best_start_floor(5, &rooms, now, 7200).unwrap().floor(), 4);
    }

    #[test]
    fn skip_needs_minimum_visits() {
        let params = RouteParams::default();
        assert!(!next_skip_flag(false, 4, 4, &params));
        assert!(next_skip_flag(false, 5, 4, &params));
    }

    #[test]
    fn skip_flag_has_hysteresis() {
        let params = RouteParams::default();
        // 8 of 10 refused: flagged.
        assert!(next_skip_flag(false, 10, 8, &params));
        // 13 of 20 refused (65%): an unflagged floor stays clear...
        assert!(!next_skip_flag(false, 20, 13, &params));
        // ...and a flagged one stays flagged.
        assert!(next_skip_flag(true, 20, 13, &params));
        // 11 of 20 refused: engagement 45% clears it.
        assert!(!next_skip_flag(true, 20, 11, &params));
    }

    #[test]
    fn plan_reports_skips_and_rates() {
        let mut rooms = floor_with(3, 4, 1);
        rooms.extend(floor_with(2, 1, 4));
        let plan = plan_route(3, &rooms, &HashSet::new(), 0, &RouteParams::default());

        assert_eq!(plan.skip, vec![3]);
        assert_eq!(plan.start, Some(StartFloor::TopFloor { floor: 3 }));
        let top = &plan.floors[0];
        assert_eq!((top.floor, top.visited, top.refusals), (3, 5, 4));
        assert_eq!(top.refusal_rate, Some(0.8));
        assert_eq!(plan.floors[2].refusal_rate, None);
    }

    #[test]
    fn previous_flag_survives_thin_data() {
        let flagged: HashSet<i64> = [1].into_iter().collect();
        let plan = plan_route(1, &floor_with(1, 0, 2), &flagged, 0, &RouteParams::default());
        assert_eq!(plan.skip, vec![1]);
    }

    proptest! {
        #[test]
        fn fresh_flag_implies_high_refusals(visited in 0usize..60, refused_frac in 0.0f64..=1.0) {
            let refusals = ((visited as f64) * refused_frac).round() as usize;
            let params = RouteParams::default();
            if next_skip_flag(false, visited, refusals, &params) {
                prop_assert!(visited >= params.skip_min_visits);
                prop_assert!(refusals as f64 / visited as f64 > params.skip_flag_rate);
            }
        }

        #[test]
        fn flagged_floor_clears_only_on_recovery(visited in 5usize..60, refused_frac in 0.0f64..=1.0) {
            let refusals = ((visited as f64) * refused_frac).round() as usize;
            let params = RouteParams::default();
            let engagement = (visited - refusals) as f64 / visited as f64;
            let still = next_skip_flag(true, visited, refusals, &params);
            prop_assert_eq!(still, engagement <= params.skip_clear_engagement_rate);
        }
    }
}
