// src/auth/magic.rs
use crate::errors::ServerError;
use rusqlite::Connection;

use crate::auth::token::{generate_token_default, hash_token};
use crate::db::auth as db_auth;

#[derive(Debug, Clone)]
pub struct MagicLinkConfig {
    /// TTL for magic links in seconds.
    pub ttl_secs: i64,
    /// Path the emailed link points at, e.g. "/auth/magic".
    pub magic_path: String,
    /// Prefixed to the path when set, so emailed links are absolute.
    pub base_url: Option<String>,
}

impl Default for MagicLinkConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 15 * 60,
            magic_path: "/auth/magic".to_string(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedMagicLink {
    pub email: String,
    pub user_id: i64,
    /// Raw token (never store this in DB).
    pub token: String,
    pub expires_at: i64,
    pub link: String,
}

#[derive(Debug, Clone)]
pub struct RedeemedMagicLink {
    pub user_id: i64,
    pub email: String,
}

pub struct MagicLinkService {
    cfg: MagicLinkConfig,
}

impl MagicLinkService {
    pub fn new(cfg: MagicLinkConfig) -> Self {
        Self { cfg }
    }

    /// Trim + lowercase, minimal sanity check.
    pub fn normalize_email(email: &str) -> Result<String, ServerError> {
        let e = email.trim().to_lowercase();
        if e.is_empty() || !e.contains('@') || e.starts_with('@') || e.ends_with('@') {
            return Err(ServerError::BadRequest("invalid email".into()));
        }
        Ok(e)
    }

    fn build_link(&self, token: &str) -> String {
        let base = self.cfg.base_url.as_deref().unwrap_or("").trim_end_matches('/');
        format!("{base}{}?token={token}", self.cfg.magic_path)
    }

    /// Sign-up and sign-in share one flow: the user row is created on first request.
    pub fn request_link(
        &self,
        conn: &Connection,
        email: &str,
        now: i64,
    ) -> Result<IssuedMagicLink, ServerError> {
        let email = Self::normalize_email(email)?;
        let user_id = db_auth::get_or_create_user(conn, &email, now)?;

        let token = generate_token_default();
        let token_hash = hash_token(&token);
        let expires_at = now + self.cfg.ttl_secs;

        db_auth::insert_magic_link(conn, user_id, &token_hash, now, expires_at)?;

        Ok(IssuedMagicLink {
            email,
            user_id,
            link: self.build_link(&token),
            token,
            expires_at,
        })
    }

    /// Single-use redemption; records the login time.
    pub fn redeem(
        &self,
        conn: &mut Connection,
        token: &str,
        now: i64,
    ) -> Result<RedeemedMagicLink, ServerError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ServerError::BadRequest("missing token".into()));
        }

        let token_hash = hash_token(token);
        let Some(user_id) = db_auth::consume_magic_link(conn, &token_hash, now)? else {
            return Err(ServerError::Unauthorized("invalid or expired link".into()));
        };
        db_auth::touch_last_login(conn, user_id, now)?;

        let email: String = conn
            .query_row(
                "select email from users where id = ?",
                rusqlite::params![user_id],
                |r| r.get(0),
            )
            .map_err(|e| ServerError::DbError(format!("select user email failed: {e}")))?;

        Ok(RedeemedMagicLink { user_id, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;
    use rusqlite::params;

    fn svc() -> MagicLinkService {
        MagicLinkService::new(MagicLinkConfig {
            ttl_secs: 60,
            magic_path: "/auth/magic".to_string(),
            base_url: Some("https://canvass.example/".to_string()),
        })
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let e = MagicLinkService::normalize_email("  Test@Example.COM ").unwrap();
        assert_eq!(e, "test@example.com");
        assert!(MagicLinkService::normalize_email("no-at-symbol").is_err());
        assert!(MagicLinkService::normalize_email("@example.com").is_err());
        assert!(MagicLinkService::normalize_email("test@").is_err());
    }

    #[test]
    fn request_link_stores_only_the_hash() {
        let conn = test_conn();
        let issued = svc().request_link(&conn, "User@Example.com", 1000).unwrap();

        let token_hash: Vec<u8> = conn
            .query_row(
                "select token_hash from magic_links where user_id = ?",
                params![issued.user_id],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(token_hash.as_slice(), hash_token(&issued.token).as_slice());
        assert_eq!(issued.email, "user@example.com");
        assert!(issued.link.starts_with("https://canvass.example/auth/magic?token="));
        assert_eq!(issued.expires_at, 1060);
    }

    #[test]
    fn redeem_succeeds_once_then_fails() {
        let mut conn = test_conn();
        let service = svc();
        let issued = service.request_link(&conn, "a@b.com", 1000).unwrap();

        let redeemed = service.redeem(&mut conn, &issued.token, 1001).unwrap();
        assert_eq!(redeemed.user_id, issued.user_id);
        let last: Option<i64> = conn
            .query_row("select last_login_at from users where id = ?", params![redeemed.user_id], |r| r.get(0))
            .unwrap();
        assert_eq!(last, Some(1001));

        match service.redeem(&mut conn, &issued.token, 1002) {
            Err(ServerError::Unauthorized(_)) => {}
            other => panic!("expected Unauthorized, got: {:?}", other),
        }
    }

    #[test]
    fn redeem_fails_if_expired_or_blank() {
        let mut conn = test_conn();
        let service = svc();
        let issued = service.request_link(&conn, "x@y.com", 1000).unwrap();

        assert!(matches!(
            service.redeem(&mut conn, &issued.token, 1060),
            Err(ServerError::Unauthorized(_))
        ));
        assert!(matches!(service.redeem(&mut conn, "   ", 1000), Err(ServerError::BadRequest(_))));
    }
}
