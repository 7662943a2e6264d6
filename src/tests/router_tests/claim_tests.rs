use crate::tests::utils::{body_json, body_string, TestApp};
use astra::Body;
use http::Method;
use serde_json::json;

fn claim(t: &TestApp, token: &str, campaign: i64, floor: i64) -> astra::Response {
    t.send(
        Method::POST,
        &format!("/api/campaigns/{campaign}/floors/{floor}/claim"),
        Some(token),
        Body::empty(),
    )
}

#[test]
fn second_claim_conflicts_and_keeps_first_claimant() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let ann = t.add_volunteer(&lead, team, "ann@example.com");
    let bob = t.add_volunteer(&lead, team, "bob@example.com");
    let campaign = t.building(&lead, team, 5, 4);

    assert_eq!(claim(&t, &ann, campaign, 3).status(), 200);

    let resp = claim(&t, &bob, campaign, 3);
    assert_eq!(resp.status(), 409);
    assert!(body_string(resp).contains("ann@example.com"));

    let claims = body_json(t.get(&format!("/api/campaigns/{campaign}/claims"), Some(&bob)));
    assert_eq!(claims.as_array().unwrap().len(), 1);
    assert_eq!(claims[0]["user_id"], t.user_id("ann@example.com"));
    assert_eq!(claims[0]["active"], true);

    let floors = body_json(t.get(&format!("/api/campaigns/{campaign}/floors"), Some(&bob)));
    assert_eq!(floors.as_array().unwrap().len(), 5);
    assert_eq!(floors[0]["floor"], 5);
    assert_eq!(floors[2]["state"], "claimed");
}

#[test]
fn out_of_range_floor_is_rejected() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let campaign = t.building(&lead, team, 2, 2);

    assert_eq!(claim(&t, &lead, campaign, 3).status(), 400);
    assert_eq!(claim(&t, &lead, campaign, 0).status(), 400);
}

#[test]
fn only_holder_or_leader_releases() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let ann = t.add_volunteer(&lead, team, "ann@example.com");
    let bob = t.add_volunteer(&lead, team, "bob@example.com");
    let campaign = t.building(&lead, team, 2, 2);

    let claim_id = body_json(claim(&t, &ann, campaign, 1))["id"].as_i64().unwrap();
    let del = |token: &str| t.send(Method::DELETE, &format!("/api/claims/{claim_id}"), Some(token), Body::empty());

    assert_eq!(del(&bob).status(), 403);
    assert_eq!(del(&lead).status(), 204);
    assert_eq!(claim(&t, &bob, campaign, 1).status(), 200);
}

#[test]
fn events_replay_claims_after_sequence() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let ann = t.add_volunteer(&lead, team, "ann@example.com");
    let campaign = t.building(&lead, team, 3, 2);

    claim(&t, &ann, campaign, 2);
    let rooms = body_json(t.get(&format!("/api/campaigns/{campaign}/rooms"), Some(&ann)));
    let room_on_two = rooms
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["floor"] == 2)
        .unwrap()["id"]
        .as_i64()
        .unwrap();
    t.post_json(&format!("/api/rooms/{room_on_two}/status"), &ann, json!({ "status": "not_home" }));

    let batch = body_json(t.get(&format!("/api/campaigns/{campaign}/events?since=0&wait=0"), Some(&lead)));
    let kinds: Vec<&str> = batch["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["claim_inserted", "room_updated", "claim_updated"]);
    assert_eq!(batch["seq"], 3);

    let later = body_json(t.get(&format!("/api/campaigns/{campaign}/events?since=3&wait=0"), Some(&lead)));
    assert!(later["events"].as_array().unwrap().is_empty());
    assert_eq!(later["seq"], 3);
}

#[test]
fn long_poll_wakes_on_publish() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let campaign = t.building(&lead, team, 2, 2);

    let app = t.app.clone();
    let lead_token = lead.clone();
    let poller = std::thread::spawn(move || {
        let req = http::Request::builder()
            .uri(format!("/api/campaigns/{campaign}/events?since=0&wait=5"))
            .header("Authorization", format!("Bearer {lead_token}"))
            .body(Body::empty())
            .unwrap();
        crate::router::respond(req, &app)
    });

    // Give the poller time to subscribe, then publish.
    std::thread::sleep(std::time::Duration::from_millis(200));
    assert_eq!(claim(&t, &lead, campaign, 1).status(), 200);

    let batch = body_json(poller.join().unwrap());
    assert_eq!(batch["events"][0]["type"], "claim_inserted");
    assert_eq!(batch["events"][0]["claim"]["floor"], 1);
}

#[test]
fn help_requests_go_to_leaders() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let vol = t.add_volunteer(&lead, team, "vol@example.com");
    let campaign = t.building(&lead, team, 4, 2);

    let resp = t.post_json(
        &format!("/api/campaigns/{campaign}/help-requests"),
        &vol,
        json!({ "floor": 4, "message": "  Door code needed  " }),
    );
    assert_eq!(resp.status(), 201);
    let raised = body_json(resp);
    assert_eq!(raised["message"], "Door code needed");

    let uri = format!("/api/campaigns/{campaign}/help-requests");
    assert_eq!(t.get(&uri, Some(&vol)).status(), 403);
    let open = body_json(t.get(&uri, Some(&lead)));
    assert_eq!(open[0]["requester"], "vol@example.com");

    let resolve = format!("/api/help-requests/{}/resolve", raised["id"]);
    assert_eq!(t.send(Method::POST, &resolve, Some(&lead), Body::empty()).status(), 200);
    assert_eq!(t.send(Method::POST, &resolve, Some(&lead), Body::empty()).status(), 409);
    assert!(body_json(t.get(&uri, Some(&lead))).as_array().unwrap().is_empty());
}

#[test]
fn finished_polls_unsubscribe_and_deleted_campaigns_drop_their_channel() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let campaign = t.building(&lead, team, 2, 2);
    assert_eq!(claim(&t, &lead, campaign, 1).status(), 200);

    for _ in 0..3 {
        let resp = t.get(&format!("/api/campaigns/{campaign}/events?since=0&wait=0"), Some(&lead));
        assert_eq!(resp.status(), 200);
    }
    assert_eq!(t.app.hub.subscriber_count(campaign), 0);
    assert!(t.app.hub.has_channel(campaign));

    let del = t.send(Method::DELETE, &format!("/api/campaigns/{campaign}"), Some(&lead), Body::empty());
    assert_eq!(del.status(), 204);
    assert!(!t.app.hub.has_channel(campaign));
}
