use crate::domain::campaign::MAX_SUPPORTS;
use crate::tests::utils::{body_json, TestApp};
use astra::Body;
use http::Method;
use serde_json::{json, Value};

fn first_room(t: &TestApp, token: &str, campaign: i64) -> Value {
    body_json(t.get(&format!("/api/campaigns/{campaign}/rooms"), Some(token)))[0].clone()
}

fn undo(t: &TestApp, token: &str, change_id: i64) -> astra::Response {
    t.send(
        Method::POST,
        &format!("/api/status-changes/{change_id}/undo"),
        Some(token),
        Body::empty(),
    )
}

#[test]
fn undo_restores_exact_previous_values() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let campaign = t.building(&lead, team, 1, 2);
    let room_id = first_room(&t, &lead, campaign)["id"].as_i64().unwrap();

    let first = body_json(t.post_json(
        &format!("/api/rooms/{room_id}/status"),
        &lead,
        json!({ "status": "callback", "note": " come back after 6 ", "callback_at": 2_000_000_000 }),
    ));
    let before = first_room(&t, &lead, campaign);
    assert_eq!(before["note"], "come back after 6");

    let second = body_json(t.post_json(
        &format!("/api/rooms/{room_id}/status"),
        &lead,
        json!({ "status": "donated", "donation_cents": 4_000 }),
    ));
    assert_eq!(second["room"]["callback_at"], Value::Null);

    let resp = undo(&t, &lead, second["change_id"].as_i64().unwrap());
    assert_eq!(resp.status(), 200);
    assert_eq!(first_room(&t, &lead, campaign), before);

    // Once only.
    assert_eq!(undo(&t, &lead, second["change_id"].as_i64().unwrap()).status(), 409);
    // The earlier change is still undoable because the room holds what it wrote.
    assert_eq!(undo(&t, &lead, first["change_id"].as_i64().unwrap()).status(), 200);
    assert_eq!(first_room(&t, &lead, campaign)["status"], "unvisited");
}

#[test]
fn undo_is_refused_after_the_window() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let campaign = t.building(&lead, team, 1, 1);
    let room_id = first_room(&t, &lead, campaign)["id"].as_i64().unwrap();

    let recorded = body_json(t.post_json(
        &format!("/api/rooms/{room_id}/status"),
        &lead,
        json!({ "status": "not_interested" }),
    ));
    let change_id = recorded["change_id"].as_i64().unwrap();
    assert!(recorded["undo_until"].as_i64().unwrap() > 0);

    t.app
        .db
        .with_conn(|conn| {
            conn.execute("update status_changes set changed_at = changed_at - 60 where id = ?", [change_id])?;
            Ok(())
        })
        .unwrap();

    assert_eq!(undo(&t, &lead, change_id).status(), 409);
    assert_eq!(first_room(&t, &lead, campaign)["status"], "not_interested");
}

#[test]
fn only_the_author_can_undo() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let vol = t.add_volunteer(&lead, team, "vol@example.com");
    let campaign = t.building(&lead, team, 1, 1);
    let room_id = first_room(&t, &vol, campaign)["id"].as_i64().unwrap();

    let recorded = body_json(t.post_json(
        &format!("/api/rooms/{room_id}/status"),
        &vol,
        json!({ "status": "donated", "donation_cents": 500 }),
    ));
    assert_eq!(undo(&t, &lead, recorded["change_id"].as_i64().unwrap()).status(), 403);
}

#[test]
fn callback_without_time_is_rejected() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let campaign = t.building(&lead, team, 1, 1);
    let room_id = first_room(&t, &lead, campaign)["id"].as_i64().unwrap();

    let resp = t.post_json(&format!("/api/rooms/{room_id}/status"), &lead, json!({ "status": "callback" }));
    assert_eq!(resp.status(), 400);
}

#[test]
fn skip_suggestion_appears_in_route() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let campaign = t.building(&lead, team, 2, 6);
    let rooms = body_json(t.get(&format!("/api/campaigns/{campaign}/rooms"), Some(&lead)));
    let top: Vec<i64> = rooms
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["floor"] == 2)
        .map(|r| r["id"].as_i64().unwrap())
        .collect();

    for (i, id) in top.iter().take(5).enumerate() {
        let status = if i < 4 { "not_interested" } else { "donated" };
        let body = json!({ "status": status, "donation_cents": 1_000 });
        assert_eq!(t.post_json(&format!("/api/rooms/{id}/status"), &lead, body).status(), 200);
    }

    let plan = body_json(t.get(&format!("/api/campaigns/{campaign}/route"), Some(&lead)));
    assert_eq!(plan["skip"], json!([2]));
}

#[test]
fn corporate_campaign_tracks_businesses() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let resp = t.post_json(
        &format!("/api/teams/{team}/campaigns"),
        &lead,
        json!({ "name": "Offices", "kind": "corporate" }),
    );
    assert_eq!(resp.status(), 201);
    let campaign = body_json(resp)["id"].as_i64().unwrap();

    let resp = t.post_json(
        &format!("/api/campaigns/{campaign}/businesses"),
        &lead,
        json!({ "name": "Acme", "contact_name": "Dana" }),
    );
    assert_eq!(resp.status(), 201);
    let business = body_json(resp)["id"].as_i64().unwrap();

    let resp = t.post_json(
        &format!("/api/businesses/{business}/status"),
        &lead,
        json!({ "status": "donated", "supports": 3 }),
    );
    assert_eq!(resp.status(), 200);

    let detail = body_json(t.get(&format!("/api/campaigns/{campaign}"), Some(&lead)));
    assert_eq!(detail["stats"]["raised_cents"], 15_000);
}

#[test]
fn oversized_supports_are_rejected_and_totals_still_load() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let resp = t.post_json(
        &format!("/api/teams/{team}/campaigns"),
        &lead,
        json!({ "name": "Offices", "kind": "corporate" }),
    );
    let campaign = body_json(resp)["id"].as_i64().unwrap();
    let resp = t.post_json(&format!("/api/campaigns/{campaign}/businesses"), &lead, json!({ "name": "Acme" }));
    let business = body_json(resp)["id"].as_i64().unwrap();

    let resp = t.post_json(
        &format!("/api/businesses/{business}/status"),
        &lead,
        json!({ "status": "donated", "supports": 10_000_000_000_000_000i64 }),
    );
    assert_eq!(resp.status(), 400);

    let resp = t.post_json(
        &format!("/api/businesses/{business}/status"),
        &lead,
        json!({ "status": "donated", "supports": MAX_SUPPORTS }),
    );
    assert_eq!(resp.status(), 200);

    let resp = t.get(&format!("/api/teams/{team}/dashboard"), Some(&lead));
    assert_eq!(resp.status(), 200);
    let dash = body_json(resp);
    assert_eq!(dash["totals"]["raised_cents"], MAX_SUPPORTS * 5_000);
}
