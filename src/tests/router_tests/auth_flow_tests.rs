use crate::auth::magic::MagicLinkService;
use crate::tests::utils::{body_string, TestApp};
use astra::Body;
use http::Method;

#[test]
fn login_page_loads_successfully() {
    let t = TestApp::new();
    let resp = t.get("/login", None);
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Sign in"));
    assert!(body.contains("form"));
}

#[test]
fn request_link_returns_partial_html_for_htmx() {
    let t = TestApp::new();
    let resp = t.send(
        Method::POST,
        "/auth/request-link",
        None,
        Body::from("email=Test%40Example.com".as_bytes().to_vec()),
    );
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Check your email"));
    assert!(body.contains("test@example.com"));
    // A partial, so htmx can swap it in.
    assert!(!body.contains("<!DOCTYPE html>"));
    assert!(!body.contains("<html"));
}

#[test]
fn magic_link_sets_cookie_and_opens_dashboard() {
    let t = TestApp::new();
    let issued = t
        .app
        .db
        .with_conn(|conn| {
            MagicLinkService::new(t.app.magic_link_config()).request_link(conn, "dash@example.com", crate::app::now_unix())
        })
        .unwrap();

    let resp = t.get(&format!("/auth/magic?token={}", issued.token), None);
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/dashboard");
    let cookie = resp.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.contains("HttpOnly"));
    let session = cookie
        .split(';')
        .next()
        .and_then(|kv| kv.strip_prefix("session="))
        .unwrap()
        .to_string();

    let req = http::Request::builder()
        .uri("/dashboard")
        .header("Cookie", format!("session={session}"))
        .body(Body::empty())
        .unwrap();
    let resp = crate::router::respond(req, &t.app);
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("dash@example.com"));

    // Single use.
    let again = t.get(&format!("/auth/magic?token={}", issued.token), None);
    assert_eq!(again.status(), 401);
}

#[test]
fn logout_revokes_the_session() {
    let t = TestApp::new();
    let token = t.sign_in("bye@example.com");
    assert_eq!(t.get("/api/teams", Some(&token)).status(), 200);

    let resp = t.send(Method::POST, "/auth/logout", Some(&token), Body::empty());
    assert_eq!(resp.status(), 303);
    assert!(resp.headers()["set-cookie"].to_str().unwrap().contains("Max-Age=0"));

    assert_eq!(t.get("/api/teams", Some(&token)).status(), 401);
}

#[test]
fn api_errors_are_json_and_pages_are_html() {
    let t = TestApp::new();
    let resp = t.get("/api/teams", None);
    assert_eq!(resp.status(), 401);
    assert!(body_string(resp).contains(r#""error":"unauthorized""#));

    let resp = t.get("/no/such/page", None);
    assert_eq!(resp.status(), 404);
    assert!(body_string(resp).contains("<html"));
}

#[test]
fn display_name_shows_up_in_claim_conflicts() {
    let t = TestApp::new();
    let (lead, team) = t.leader_with_team();
    let ann = t.add_volunteer(&lead, team, "ann@example.com");
    let campaign = t.building(&lead, team, 2, 2);

    let resp = t.post_json("/api/me", &ann, serde_json::json!({ "display_name": "Ann" }));
    assert_eq!(resp.status(), 200);
    assert_eq!(crate::tests::utils::body_json(t.get("/api/me", Some(&ann)))["display_name"], "Ann");

    let claim = |token: &str| {
        t.send(Method::POST, &format!("/api/campaigns/{campaign}/floors/1/claim"), Some(token), Body::empty())
    };
    assert_eq!(claim(&ann).status(), 200);
    let resp = claim(&lead);
    assert_eq!(resp.status(), 409);
    assert!(body_string(resp).contains("claimed by Ann"));
}
