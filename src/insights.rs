// src/insights.rs

//! Free-text campaign advice from an OpenAI-compatible chat completion endpoint.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;
use thiserror::Error;

use crate::domain::insights::TimeOfDayReport;
use crate::domain::route::RoutePlan;
use crate::domain::stats::{format_cents, CampaignStats};
use crate::errors::ServerError;

const SYSTEM_PROMPT: &str = "You advise volunteer fundraisers going door to door. \
Answer in at most five short bullet points, using only the numbers given.";

#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("endpoint returned status {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl From<InsightsError> for ServerError {
    fn from(e: InsightsError) -> Self {
        ServerError::Upstream(e.to_string())
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

pub struct InsightsClient {
    url: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl InsightsClient {
    pub fn new(url: String, api_key: Option<String>, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { url, api_key, model, client }
    }

    pub fn advise(&self, prompt: &str) -> Result<String, InsightsError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: 0.3,
        };

        let mut req = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().map_err(|e| InsightsError::Request(e.to_string()))?;

        let status = resp.status();
        let text = resp.text().map_err(|e| InsightsError::Request(e.to_string()))?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %text, "insights endpoint refused request");
            return Err(InsightsError::Status(status.as_u16()));
        }
        parse_completion(&text)
    }
}

/// First choice's message content.
pub fn parse_completion(body: &str) -> Result<String, InsightsError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| InsightsError::Malformed(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| InsightsError::Malformed("no content in first choice".into()))
}

pub fn build_prompt(stats: &CampaignStats, hours: &TimeOfDayReport, route: &RoutePlan) -> String {
    let mut p = String::new();
    let _ = writeln!(p, "Campaign: {}", stats.name);
    let _ = writeln!(
        p,
        "Units {}, visited {}, donated {}, refused {}, callbacks {}, not home {}.",
        stats.units, stats.visited, stats.donated, stats.refused, stats.callbacks, stats.not_home
    );
    match stats.target_cents {
        Some(t) => {
            let _ = writeln!(p, "Raised {} of {} target.", format_cents(stats.raised_cents), format_cents(t));
        }
        None => {
            let _ = writeln!(p, "Raised {}.", format_cents(stats.raised_cents));
        }
    }

    let ranked: Vec<String> = hours
        .ranked
        .iter()
        .take(3)
        .filter_map(|h| hours.hours.get(*h as usize))
        .map(|h| format!("{:02}:00 (score {:.2}, {} visits)", h.hour, h.score.unwrap_or(0.0), h.visits))
        .collect();
    if ranked.is_empty() {
        let _ = writeln!(p, "Not enough visits yet to rank hours.");
    } else {
        let _ = writeln!(p, "Best hours: {}.", ranked.join(", "));
    }

    if let Some(start) = &route.start {
        let _ = writeln!(p, "Suggested start floor: {}.", start.floor());
    }
    if !route.skip.is_empty() {
        let floors: Vec<String> = route.skip.iter().map(|f| f.to_string()).collect();
        let _ = writeln!(p, "Floors flagged to skip for high refusals: {}.", floors.join(", "));
    }
    p.push_str("What should the team do next?");
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::insights::score_hours;
    use crate::domain::route::StartFloor;

    #[test]
    fn completion_takes_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  - Start at 6pm \n"}},{"message":{"content":"no"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "- Start at 6pm");
        assert!(parse_completion(r#"{"choices":[]}"#).is_err());
        assert!(parse_completion("not json").is_err());
    }

    #[test]
    fn refused_requests_surface_only_the_status() {
        let err = ServerError::from(InsightsError::Status(429));
        assert!(matches!(&err, ServerError::Upstream(msg) if msg == "endpoint returned status 429"));
    }

    #[test]
    fn prompt_mentions_numbers_and_skips() {
        let stats = CampaignStats {
            name: "Maple Court".into(),
            units: 40,
            visited: 12,
            donated: 4,
            raised_cents: 12_000,
            target_cents: Some(100_000),
            ..Default::default()
        };
        let hours = score_hours(&[], 0, 3, 0);
        let route = RoutePlan { start: Some(StartFloor::TopFloor { floor: 8 }), skip: vec![3], floors: vec![] };

        let p = build_prompt(&stats, &hours, &route);
        assert!(p.contains("Raised 120.00 of 1000.00 target."));
        assert!(p.contains("Not enough visits yet"));
        assert!(p.contains("start floor: 8"));
        assert!(p.contains("skip for high refusals: 3"));
    }
}
