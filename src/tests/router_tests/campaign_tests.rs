use crate::tests::utils::{body_json, body_string, TestApp};
use astra::Body;
use http::Method;
use serde_json::json;

fn import(t: &TestApp, token: &str, team: i64, csv: &str) -> astra::Response {
    t.send(
        Method::POST,
        &format!("/api/teams/{team}/campaigns/import"),
        Some(token),
        Body::from(csv.as_bytes().to_vec()),
    )
}

fn campaign_count(t: &TestApp, token: &str, team: i64) -> usize {
    body_json(t.get(&format!("/api/teams/{team}/campaigns"), Some(token)))
        .as_array()
        .unwrap()
        .len()
}

#[test]
fn import_with_missing_column_names_it_and_imports_nothing() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();

    let resp = import(&t, &lead, team, "name,floors\nMaple,10\n");
    assert_eq!(resp.status(), 422);
    let err = body_json(resp);
    assert_eq!(err["issues"][0]["row"], 1);
    assert_eq!(err["issues"][0]["column"], "units_per_floor");
    assert_eq!(campaign_count(&t, &lead, team), 0);
}

#[test]
fn one_bad_row_rejects_the_whole_file() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();

    let csv = "Name, Floors ,units_per_floor\nMaple,10,4\nBirch,abc,4\n";
    let resp = import(&t, &lead, team, csv);
    assert_eq!(resp.status(), 422);
    let err = body_json(resp);
    assert_eq!(err["issues"][0]["row"], 3);
    assert_eq!(err["issues"][0]["column"], "floors");
    assert_eq!(campaign_count(&t, &lead, team), 0);
}

#[test]
fn clean_import_creates_rooms() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();

    let csv = "name,floors,units_per_floor,target_amount\nMaple,3,4,\"1,500\"\nBirch,2,2,\n";
    let resp = import(&t, &lead, team, csv);
    assert_eq!(resp.status(), 201);
    let created = body_json(resp);
    assert_eq!(created.as_array().unwrap().len(), 2);

    let maple = created.as_array().unwrap().iter().find(|c| c["name"] == "Maple").unwrap();
    assert_eq!(maple["target_cents"], 150_000);
    let rooms = body_json(t.get(&format!("/api/campaigns/{}/rooms", maple["id"]), Some(&lead)));
    assert_eq!(rooms.as_array().unwrap().len(), 12);
}

#[test]
fn volunteers_cannot_import_or_delete() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let vol = t.add_volunteer(&lead, team, "vol@example.com");
    let campaign = t.building(&lead, team, 2, 2);

    assert_eq!(import(&t, &vol, team, "name,floors,units_per_floor\nX,1,1\n").status(), 403);
    let del = t.send(Method::DELETE, &format!("/api/campaigns/{campaign}"), Some(&vol), Body::empty());
    assert_eq!(del.status(), 403);

    let del = t.send(Method::DELETE, &format!("/api/campaigns/{campaign}"), Some(&lead), Body::empty());
    assert_eq!(del.status(), 204);
    assert_eq!(t.get(&format!("/api/campaigns/{campaign}"), Some(&lead)).status(), 404);
}

#[test]
fn outsiders_do_not_see_campaigns() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let campaign = t.building(&lead, team, 1, 1);
    let stranger = t.sign_in("stranger@example.com");

    assert_eq!(t.get(&format!("/api/campaigns/{campaign}"), Some(&stranger)).status(), 403);
}

#[test]
fn nearby_sorts_by_distance_and_skips_unplaced() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    for (name, lat, lon) in [("Far", 40.0, -74.0), ("Near", 51.51, -0.13)] {
        let resp = t.post_json(
            &format!("/api/teams/{team}/campaigns"),
            &lead,
            json!({ "name": name, "floors": 1, "units_per_floor": 1, "latitude": lat, "longitude": lon }),
        );
        assert_eq!(resp.status(), 201);
    }
    t.building(&lead, team, 1, 1);

    let found = body_json(t.get("/api/campaigns/nearby?lat=51.5&lon=-0.12", Some(&lead)));
    let names: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["campaign"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Near", "Far"]);

    assert_eq!(t.get("/api/campaigns/nearby?lat=91&lon=0", Some(&lead)).status(), 400);
}

#[test]
fn exports_and_report_render() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let campaign = t.building(&lead, team, 1, 2);

    let resp = t.get(&format!("/campaigns/{campaign}/export.csv"), Some(&lead));
    assert_eq!(resp.status(), 200);
    assert!(resp.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("maple-court.csv"));
    let csv = body_string(resp);
    assert!(csv.starts_with("floor,unit,status,donation,note,updated_at"));
    assert_eq!(csv.lines().count(), 3);

    let resp = t.get(&format!("/campaigns/{campaign}/export.xlsx"), Some(&lead));
    assert_eq!(resp.status(), 200);

    let report = body_string(t.get(&format!("/campaigns/{campaign}/report"), Some(&lead)));
    assert!(report.contains("window.print()"));
    assert!(report.contains("Maple Court"));
}

#[test]
fn ai_insights_need_configuration() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let campaign = t.building(&lead, team, 1, 1);

    let resp = t.send(Method::POST, &format!("/api/campaigns/{campaign}/ai-insights"), Some(&lead), Body::empty());
    assert_eq!(resp.status(), 503);
    assert!(body_string(resp).contains("insights are not configured"));

    let report = body_json(t.get(&format!("/api/campaigns/{campaign}/insights"), Some(&lead)));
    assert_eq!(report["hours"].as_array().unwrap().len(), 24);
}
