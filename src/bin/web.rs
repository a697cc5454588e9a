//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Store and blob files live under DATA_DIR (default "data").

use actix_files::Files;
use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use esports_standings_web::{
    export_file_name, render_standings_table, standings, BlobStore, FileBlobStore, FileKv,
    StandingsStore, TeamSpec, TournamentError,
};
use serde::Deserialize;
use std::sync::RwLock;

/// Shared server state: the store plus its persistence collaborators.
struct AppCtx {
    store: StandingsStore,
    kv: FileKv,
    blobs: FileBlobStore,
}

impl AppCtx {
    /// Persist the whole document after a mutation. A failed write keeps
    /// the in-memory state but tells the caller durability is gone.
    fn persist(&mut self) -> Result<(), HttpResponse> {
        match self.store.save(&mut self.kv) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::error!("Persistence write failed: {}", e);
                Err(HttpResponse::InsufficientStorage().json(serde_json::json!({
                    "error": format!("CRITICAL WARNING: {}. Changes are not saved; clear old tournaments.", e)
                })))
            }
        }
    }
}

type AppState = Data<RwLock<AppCtx>>;

fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::TournamentNotFound(_)
        | TournamentError::MatchNotFound(_)
        | TournamentError::TeamNotFound(_) => HttpResponse::NotFound().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTeamBody {
    name: String,
    /// Inline image as a base64 data URL; saved to the blob store.
    #[serde(default, rename = "logoData")]
    logo_data: Option<String>,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    teams: Vec<CreateTeamBody>,
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
struct SeriesBody {
    count: usize,
}

#[derive(Deserialize)]
struct ResultBody {
    #[serde(default)]
    kills: u32,
    #[serde(default)]
    position: Option<i32>,
}

#[derive(Deserialize)]
struct ManualWinBody {
    /// `null` clears the override back to the computed count.
    wins: Option<i64>,
}

#[derive(Deserialize)]
struct SelectionBody {
    index: Option<usize>,
}

#[derive(Deserialize)]
struct StandingsQuery {
    /// Inclusive upper match index; absent means all matches.
    upto: Option<usize>,
}

/// Path segment: tournament index (e.g. /api/tournaments/{t})
#[derive(Deserialize)]
struct TournamentPath {
    t: usize,
}

#[derive(Deserialize)]
struct TournamentMatchPath {
    t: usize,
    m: usize,
}

#[derive(Deserialize)]
struct TournamentTeamPath {
    t: usize,
    team: usize,
}

#[derive(Deserialize)]
struct MatchTeamPath {
    t: usize,
    m: usize,
    team: usize,
}

#[derive(Deserialize)]
struct BlobPath {
    key: String,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "esports-standings-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Full store: tournaments plus active/current pointers.
#[get("/api/state")]
async fn api_get_state(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(&g.store)
}

/// Create a tournament (name unique case-insensitive, up to 12 teams).
/// Inline logo data URLs are saved to the blob store first; a failed logo
/// save degrades to no logo rather than failing the creation.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ctx = &mut *g;
    let body = body.into_inner();
    let specs: Vec<TeamSpec> = body
        .teams
        .into_iter()
        .map(|t| {
            let logo = t.logo_data.and_then(|d| match ctx.blobs.save_data_url(&d) {
                Ok(key) => Some(key),
                Err(e) => {
                    log::error!("Logo save error for team '{}': {}", t.name, e);
                    None
                }
            });
            TeamSpec { name: t.name, logo }
        })
        .collect();
    match ctx.store.create_tournament(&body.name, specs) {
        Ok(_) => {}
        Err(e) => return error_response(e),
    }
    if let Err(resp) = ctx.persist() {
        return resp;
    }
    HttpResponse::Ok().json(&ctx.store)
}

/// Delete a tournament and release its logo blobs.
#[delete("/api/tournaments/{t}")]
async fn api_delete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ctx = &mut *g;
    if let Err(e) = ctx.store.delete_tournament(path.t, &mut ctx.blobs) {
        return error_response(e);
    }
    if let Err(resp) = ctx.persist() {
        return resp;
    }
    HttpResponse::Ok().json(&ctx.store)
}

/// Switch the active tournament (current match resets).
#[put("/api/state/active-tournament")]
async fn api_select_tournament(state: AppState, body: Json<SelectionBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ctx = &mut *g;
    if let Err(e) = ctx.store.select_tournament(body.index) {
        return error_response(e);
    }
    if let Err(resp) = ctx.persist() {
        return resp;
    }
    HttpResponse::Ok().json(&ctx.store)
}

/// Open a match of the active tournament for edits.
#[put("/api/state/current-match")]
async fn api_select_match(state: AppState, body: Json<SelectionBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ctx = &mut *g;
    if let Err(e) = ctx.store.select_match(body.index) {
        return error_response(e);
    }
    if let Err(resp) = ctx.persist() {
        return resp;
    }
    HttpResponse::Ok().json(&ctx.store)
}

/// Append an empty match.
#[post("/api/tournaments/{t}/matches")]
async fn api_add_match(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<NameBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ctx = &mut *g;
    if let Err(e) = ctx.store.add_match(path.t, &body.name) {
        return error_response(e);
    }
    if let Err(resp) = ctx.persist() {
        return resp;
    }
    HttpResponse::Ok().json(&ctx.store)
}

/// Bulk-create a series; the last match is named "Final".
#[post("/api/tournaments/{t}/series")]
async fn api_add_series(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<SeriesBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ctx = &mut *g;
    if let Err(e) = ctx.store.add_series(path.t, body.count) {
        return error_response(e);
    }
    if let Err(resp) = ctx.persist() {
        return resp;
    }
    HttpResponse::Ok().json(&ctx.store)
}

/// Rename a match (also re-runs final classification on display).
#[put("/api/tournaments/{t}/matches/{m}/name")]
async fn api_rename_match(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<NameBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ctx = &mut *g;
    if let Err(e) = ctx.store.rename_match(path.t, path.m, &body.name) {
        return error_response(e);
    }
    if let Err(resp) = ctx.persist() {
        return resp;
    }
    HttpResponse::Ok().json(&ctx.store)
}

/// Delete a match, shifting the current-match pointer if needed.
#[delete("/api/tournaments/{t}/matches/{m}")]
async fn api_delete_match(state: AppState, path: Path<TournamentMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ctx = &mut *g;
    if let Err(e) = ctx.store.delete_match(path.t, path.m) {
        return error_response(e);
    }
    if let Err(resp) = ctx.persist() {
        return resp;
    }
    HttpResponse::Ok().json(&ctx.store)
}

/// Edit one team's kills/position in one match.
#[put("/api/tournaments/{t}/matches/{m}/results/{team}")]
async fn api_set_result(
    state: AppState,
    path: Path<MatchTeamPath>,
    body: Json<ResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ctx = &mut *g;
    if let Err(e) = ctx
        .store
        .set_result(path.t, path.m, path.team, body.kills, body.position)
    {
        return error_response(e);
    }
    if let Err(resp) = ctx.persist() {
        return resp;
    }
    HttpResponse::Ok().json(&ctx.store)
}

/// Set (or clear, with `wins: null`) a team's manual win override.
#[put("/api/tournaments/{t}/manual-wins/{team}")]
async fn api_set_manual_win(
    state: AppState,
    path: Path<TournamentTeamPath>,
    body: Json<ManualWinBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ctx = &mut *g;
    let result = match body.wins {
        Some(v) => ctx.store.set_manual_win(path.t, path.team, v),
        None => ctx.store.clear_manual_win(path.t, path.team),
    };
    if let Err(e) = result {
        return error_response(e);
    }
    if let Err(resp) = ctx.persist() {
        return resp;
    }
    HttpResponse::Ok().json(&ctx.store)
}

/// Remove a team: splices its result column out of every match, clears
/// overrides, releases its logo blob.
#[delete("/api/tournaments/{t}/teams/{team}")]
async fn api_remove_team(state: AppState, path: Path<TournamentTeamPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ctx = &mut *g;
    if let Err(e) = ctx.store.remove_team(path.t, path.team, &mut ctx.blobs) {
        return error_response(e);
    }
    if let Err(resp) = ctx.persist() {
        return resp;
    }
    HttpResponse::Ok().json(&ctx.store)
}

/// Sorted standings through `?upto=` (inclusive; absent = all matches).
#[get("/api/tournaments/{t}/standings")]
async fn api_standings(
    state: AppState,
    path: Path<TournamentPath>,
    query: Query<StandingsQuery>,
) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = match g.store.tournament(path.t) {
        Ok(t) => t,
        Err(e) => return error_response(e),
    };
    HttpResponse::Ok().json(standings(t, query.upto))
}

/// Rendered export table for one match snapshot plus the suggested PNG
/// file name; the client-side rasterizer consumes this.
#[get("/api/tournaments/{t}/matches/{m}/export")]
async fn api_export_match(state: AppState, path: Path<TournamentMatchPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = match g.store.tournament(path.t) {
        Ok(t) => t,
        Err(e) => return error_response(e),
    };
    let table = match render_standings_table(t, path.m) {
        Ok(table) => table,
        Err(e) => return error_response(e),
    };
    let file_name = export_file_name(&table.title, chrono::Utc::now());
    HttpResponse::Ok().json(serde_json::json!({ "table": table, "fileName": file_name }))
}

/// Resolve a logo blob key to a displayable source. Missing or corrupt
/// blobs resolve to an empty source; the caller drops the placeholder.
#[get("/api/blobs/{key}")]
async fn api_resolve_blob(state: AppState, path: Path<BlobPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let src = g.blobs.resolve(&path.key).unwrap_or_default();
    HttpResponse::Ok().json(serde_json::json!({ "src": src }))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());

    let kv = FileKv::new(format!("{data_dir}/kv"))
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let mut blobs = FileBlobStore::new(format!("{data_dir}/blobs"))
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let store = StandingsStore::load(&kv, &mut blobs);
    log::info!(
        "Loaded {} tournament(s) from {}",
        store.tournaments.len(),
        data_dir
    );

    let state = Data::new(RwLock::new(AppCtx { store, kv, blobs }));

    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_get_state)
            .service(api_create_tournament)
            .service(api_delete_tournament)
            .service(api_select_tournament)
            .service(api_select_match)
            .service(api_add_match)
            .service(api_add_series)
            .service(api_rename_match)
            .service(api_delete_match)
            .service(api_set_result)
            .service(api_set_manual_win)
            .service(api_remove_team)
            .service(api_standings)
            .service(api_export_match)
            .service(api_resolve_blob)
            .service(Files::new("/static", "static"))
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
