use crate::auth::magic::{IssuedMagicLink, MagicLinkConfig, MagicLinkService, RedeemedMagicLink};
use crate::auth::sessions::create_session;
use crate::db::connection::Database;
use crate::errors::ServerError;

/// Request a magic link; returns the issued link (raw token included so the caller can email/log).
pub fn request_magic_link(
    db: &Database,
    cfg: MagicLinkConfig,
    email: &str,
    now: i64,
) -> Result<IssuedMagicLink, ServerError> {
    let svc = MagicLinkService::new(cfg);
    db.with_conn(|conn| svc.request_link(conn, email, now))
}

/// Redeem a single-use token and open a session in one go.
/// Returns the redeemed user and the raw session token.
pub fn redeem_magic_link(
    db: &Database,
    cfg: MagicLinkConfig,
    token: &str,
    now: i64,
    session_ttl_secs: i64,
) -> Result<(RedeemedMagicLink, String), ServerError> {
    let svc = MagicLinkService::new(cfg);

    db.with_conn(|conn| {
        let redeemed = svc.redeem(conn, token, now)?;
        let session = create_session(conn, redeemed.user_id, now, session_ttl_secs)?;
        Ok((redeemed, session))
    })
}
