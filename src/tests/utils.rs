use crate::app::{now_unix, AppState};
use crate::auth::sessions::create_session;
use crate::config::Config;
use crate::db::auth::get_or_create_user;
use crate::db::connection::{init_db, Database};
use crate::router::respond;
use astra::{Body, Response};
use http::{Method, Request};
use std::io::Read;

/// App over a throwaway database; the file lives as long as this value.
pub struct TestApp {
    pub app: AppState,
    _dir: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canvass_test.sqlite").to_string_lossy().to_string();
        let db = Database::new(path.clone());
        init_db(&db, "sql/schema.sql").unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

        let config = Config { db_path: path, max_poll_secs: 1, brevo_api_key: None, insights_url: None, ..config };
        Self { app: AppState::new(db, config), _dir: dir }
    }

    /// Session token for `email`, creating the user if needed.
    pub fn sign_in(&self, email: &str) -> String {
        self.app
            .db
            .with_conn(|conn| {
                let now = now_unix();
                let user_id = get_or_create_user(conn, email, now)?;
                create_session(conn, user_id, now, 3600)
            })
            .unwrap()
    }

    pub fn user_id(&self, email: &str) -> i64 {
        self.app
            .db
            .with_conn(|conn| Ok(conn.query_row("select id from users where email = ?", [email], |r| r.get(0))?))
            .unwrap()
    }

    pub fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Body) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        respond(builder.body(body).unwrap(), &self.app)
    }

    pub fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(Method::GET, uri, token, Body::empty())
    }

    pub fn post_json(&self, uri: &str, token: &str, json: serde_json::Value) -> Response {
        self.send(Method::POST, uri, Some(token), Body::from(json.to_string()))
    }

    /// Leader session plus a fresh team id.
    pub fn leader_with_team(&self) -> (String, i64) {
        let token = self.sign_in("lead@example.com");
        let resp = self.post_json("/api/teams", &token, serde_json::json!({ "name": "Tower Team" }));
        assert_eq!(resp.status(), 201);
        let team = body_json(resp);
        (token, team["id"].as_i64().unwrap())
    }

    pub fn add_volunteer(&self, leader: &str, team_id: i64, email: &str) -> String {
        let resp = self.post_json(
            &format!("/api/teams/{team_id}/members"),
            leader,
            serde_json::json!({ "email": email }),
        );
        assert_eq!(resp.status(), 201);
        self.sign_in(email)
    }

    pub fn building(&self, leader: &str, team_id: i64, floors: i64, units: i64) -> i64 {
        let resp = self.post_json(
            &format!("/api/teams/{team_id}/campaigns"),
            leader,
            serde_json::json!({ "name": "Maple Court", "floors": floors, "units_per_floor": units, "target_cents": 100_000 }),
        );
        assert_eq!(resp.status(), 201);
        body_json(resp)["id"].as_i64().unwrap()
    }
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp)).unwrap()
}
