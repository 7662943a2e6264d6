use crate::app::AppState;
use crate::errors::ServerError;
use crate::handlers::{auth, campaigns, coordination, pages, planning, teams};
use crate::request::path_id;
use crate::responses::{error_response, ResultResp};
use astra::{Request, Response};

/// Runs `handle` and renders any error for the surface it came from.
pub fn respond(req: Request, app: &AppState) -> Response {
    let api = req.uri().path().starts_with("/api/");
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match handle(req, app) {
        Ok(resp) => {
            tracing::debug!(%method, %path, status = resp.status().as_u16(), "request handled");
            resp
        }
        Err(err) => error_response(&err, api),
    }
}

pub fn handle(req: Request, app: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        // Pages
        ("GET", []) => pages::home(&req, app),
        ("GET", ["login"]) => pages::login(),
        ("POST", ["auth", "request-link"]) => auth::request_link(req, app),
        ("GET", ["auth", "magic"]) => auth::magic(&req, app),
        ("POST", ["auth", "logout"]) => auth::logout(&req, app),
        ("GET", ["dashboard"]) => pages::dashboard(&req, app),
        ("GET", ["campaigns", id]) => pages::campaign(&req, app, path_id(id)?),
        ("GET", ["campaigns", id, "report"]) => pages::report(&req, app, path_id(id)?),
        ("GET", ["campaigns", id, "export.csv"]) => pages::export_csv(&req, app, path_id(id)?),
        ("GET", ["campaigns", id, "export.xlsx"]) => pages::export_xlsx(&req, app, path_id(id)?),

        // Account
        ("GET", ["api", "me"]) => auth::me(&req, app),
        ("POST", ["api", "me"]) => auth::update_me(req, app),

        // Teams
        ("GET", ["api", "teams"]) => teams::list(&req, app),
        ("POST", ["api", "teams"]) => teams::create(req, app),
        ("GET", ["api", "teams", id, "members"]) => teams::members(&req, app, path_id(id)?),
        ("POST", ["api", "teams", id, "members"]) => teams::add(req, app, path_id(id)?),
        ("GET", ["api", "teams", id, "campaigns"]) => teams::campaigns(&req, app, path_id(id)?),
        ("POST", ["api", "teams", id, "campaigns"]) => teams::create_one(req, app, path_id(id)?),
        ("POST", ["api", "teams", id, "campaigns", "import"]) => teams::import(req, app, path_id(id)?),
        ("GET", ["api", "teams", id, "dashboard"]) => teams::dashboard(&req, app, path_id(id)?),

        // Campaigns. `nearby` must be matched before the id route.
        ("GET", ["api", "campaigns", "nearby"]) => campaigns::nearby(&req, app),
        ("GET", ["api", "campaigns", id]) => campaigns::get(&req, app, path_id(id)?),
        ("DELETE", ["api", "campaigns", id]) => campaigns::delete(&req, app, path_id(id)?),
        ("GET", ["api", "campaigns", id, "rooms"]) => campaigns::rooms(&req, app, path_id(id)?),
        ("POST", ["api", "rooms", id, "status"]) => campaigns::record_status(req, app, path_id(id)?),
        ("POST", ["api", "status-changes", id, "undo"]) => campaigns::undo(&req, app, path_id(id)?),
        ("GET", ["api", "campaigns", id, "businesses"]) => campaigns::businesses(&req, app, path_id(id)?),
        ("POST", ["api", "campaigns", id, "businesses"]) => {
            campaigns::add_business_to(req, app, path_id(id)?)
        }
        ("POST", ["api", "businesses", id, "status"]) => campaigns::record_business(req, app, path_id(id)?),

        // Claims, live updates, help
        ("GET", ["api", "campaigns", id, "claims"]) => coordination::claims(&req, app, path_id(id)?),
        ("GET", ["api", "campaigns", id, "floors"]) => coordination::floors(&req, app, path_id(id)?),
        ("POST", ["api", "campaigns", id, "floors", floor, "claim"]) => {
            let floor = floor
                .parse()
                .map_err(|_| ServerError::BadRequest(format!("invalid floor '{floor}'")))?;
            coordination::claim_floor(&req, app, path_id(id)?, floor)
        }
        ("DELETE", ["api", "claims", id]) => coordination::release(&req, app, path_id(id)?),
        ("GET", ["api", "campaigns", id, "events"]) => coordination::events(&req, app, path_id(id)?),
        ("GET", ["api", "campaigns", id, "help-requests"]) => {
            coordination::help_requests(&req, app, path_id(id)?)
        }
        ("POST", ["api", "campaigns", id, "help-requests"]) => {
            coordination::raise_help(req, app, path_id(id)?)
        }
        ("POST", ["api", "help-requests", id, "resolve"]) => {
            coordination::resolve_help(&req, app, path_id(id)?)
        }

        // Planning
        ("GET", ["api", "campaigns", id, "route"]) => planning::route(&req, app, path_id(id)?),
        ("GET", ["api", "campaigns", id, "insights"]) => planning::insights(&req, app, path_id(id)?),
        ("POST", ["api", "campaigns", id, "ai-insights"]) => planning::ai_insights(&req, app, path_id(id)?),

        _ => Err(ServerError::NotFound),
    }
}
