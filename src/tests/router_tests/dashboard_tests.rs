use crate::tests::utils::{body_json, body_string, TestApp};
use scraper::{Html, Selector};
use serde_json::json;

#[test]
fn dashboard_redirects_anonymous_visitors() {
    let t = TestApp::new();
    let resp = t.get("/dashboard", None);
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/login");
}

#[test]
fn leader_dashboard_shows_campaigns_and_leaderboard() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let vol = t.add_volunteer(&lead, team, "vol@example.com");
    let campaign = t.building(&lead, team, 2, 2);

    let rooms = body_json(t.get(&format!("/api/campaigns/{campaign}/rooms"), Some(&vol)));
    let room = rooms[0]["id"].as_i64().unwrap();
    let resp = t.post_json(
        &format!("/api/rooms/{room}/status"),
        &vol,
        json!({ "status": "donated", "donation_cents": 2_000 }),
    );
    assert_eq!(resp.status(), 200);

    let html = body_string(t.get("/dashboard", Some(&lead)));
    let doc = Html::parse_document(&html);
    let rows = Selector::parse("table.campaigns tbody tr").unwrap();
    assert_eq!(doc.select(&rows).count(), 1);
    let board = Selector::parse("ol.leaderboard li").unwrap();
    let first = doc.select(&board).next().unwrap().text().collect::<String>();
    assert!(first.contains("vol@example.com"));
    assert!(first.contains("$20.00"));

    let dash = body_json(t.get(&format!("/api/teams/{team}/dashboard"), Some(&lead)));
    assert_eq!(dash["totals"]["raised_cents"], 2_000);
    assert_eq!(dash["totals"]["units"], 4);
    assert_eq!(dash["campaigns"][0]["progress_pct"], 2);
}

#[test]
fn volunteers_cannot_open_the_team_dashboard() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let vol = t.add_volunteer(&lead, team, "vol@example.com");

    assert_eq!(t.get(&format!("/api/teams/{team}/dashboard"), Some(&vol)).status(), 403);

    // The HTML dashboard still lists the team, without totals.
    let html = body_string(t.get("/dashboard", Some(&vol)));
    assert!(html.contains("Tower Team"));
    assert!(!html.contains("leaderboard"));
}
