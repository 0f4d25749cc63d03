//! Single binary web server: JSON API over in-memory partner tournaments.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT. Log level via RUST_LOG.

use actix_web::{
    get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use partner_tournament::{
    add_extra_round, complete_match, evaluate, evaluate_played, expire_match, form_next_group,
    pause_match, regenerate_group, reset_match, schedule_next_round, start_match, MatchResult,
    Player, PlayerPool, Tournament, TournamentConfig, TournamentError, TournamentId,
    TournamentSnapshot,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-tournament entry: tournament data, delivered results, last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    results: Vec<MatchResult>,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID. Every mutation holds the write lock, so one
/// tournament never sees two interleaved formations.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct PlayerBody {
    alias: String,
    name: String,
    score: f64,
}

#[derive(Deserialize)]
struct RosterBody {
    players: Vec<PlayerBody>,
}

#[derive(Deserialize)]
struct ScoreBody {
    score_a: u32,
    score_b: u32,
}

#[derive(Deserialize)]
struct FairnessQuery {
    #[serde(default)]
    played: bool,
}

#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// `number` is the 1-based group number shown in team ids (`G1T3` is in group 1).
#[derive(Deserialize)]
struct GroupPath {
    id: TournamentId,
    number: usize,
}

#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    match_id: String,
    action: String,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::GroupNotFound(_) | TournamentError::MatchNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        TournamentError::MatchAlreadyFinalized(_)
        | TournamentError::GroupLocked(_)
        | TournamentError::TournamentComplete { .. }
        | TournamentError::RosterLocked => HttpResponse::Conflict().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

/// Run `f` on one tournament under the write lock and answer with the updated tournament.
fn with_tournament<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut TournamentEntry) -> Result<(), TournamentError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    match f(&mut *entry) {
        Ok(()) => HttpResponse::Ok().json(&entry.tournament),
        Err(e) => error_response(&e),
    }
}

fn insert(state: &AppState, tournament: Tournament) -> HttpResponse {
    let id = tournament.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let response = HttpResponse::Ok().json(&tournament);
    g.insert(
        id,
        TournamentEntry {
            tournament,
            results: Vec::new(),
            last_activity: Instant::now(),
        },
    );
    response
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "partner-tournament",
    })
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Option<Json<TournamentConfig>>) -> HttpResponse {
    let config = body.map(Json::into_inner).unwrap_or_default();
    match Tournament::new(config) {
        Ok(t) => insert(&state, t),
        Err(e) => error_response(&e),
    }
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |_| Ok(()))
}

/// Replace the roster from JSON.
#[put("/api/tournaments/{id}/roster")]
async fn api_load_roster(state: AppState, path: Path<TournamentPath>, body: Json<RosterBody>) -> HttpResponse {
    with_tournament(&state, path.id, |entry| {
        let players = body
            .into_inner()
            .players
            .into_iter()
            .map(|p| Player::new(p.alias, p.name, p.score))
            .collect::<Result<Vec<_>, _>>()?;
        entry.tournament.load_roster(players).map(|_| ())
    })
}

/// Replace the roster from a CSV body (`alias,name,score`).
#[put("/api/tournaments/{id}/roster.csv")]
async fn api_load_roster_csv(state: AppState, path: Path<TournamentPath>, body: String) -> HttpResponse {
    with_tournament(&state, path.id, |entry| {
        let pool = PlayerPool::from_csv(body.as_bytes())?;
        entry.tournament.load_roster(pool.players).map(|_| ())
    })
}

/// Form the next group of teams.
#[post("/api/tournaments/{id}/groups")]
async fn api_form_group(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |entry| form_next_group(&mut entry.tournament).map(|_| ()))
}

/// Shuffle (regenerate) the most recent group, addressed by its 1-based number.
#[post("/api/tournaments/{id}/groups/{number}/regenerate")]
async fn api_regenerate_group(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    let Some(index) = path.number.checked_sub(1) else {
        return HttpResponse::NotFound().json(serde_json::json!({ "error": "Group 0 does not exist" }));
    };
    with_tournament(&state, path.id, |entry| {
        regenerate_group(&mut entry.tournament, index).map(|_| ())
    })
}

/// Configuration warnings for the current roster (idle courts, more rounds than partners).
#[get("/api/tournaments/{id}/advisories")]
async fn api_advisories(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get(&path.id) {
        Some(entry) => HttpResponse::Ok().json(entry.tournament.advisories()),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Schedule the next round.
#[post("/api/tournaments/{id}/rounds")]
async fn api_schedule_round(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |entry| {
        schedule_next_round(&mut entry.tournament).map(|_| ())
    })
}

/// Match lifecycle: start, pause, expire, reset.
#[post("/api/tournaments/{id}/matches/{match_id}/{action}")]
async fn api_match_action(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let transition: fn(&mut Tournament, &str) -> Result<(), TournamentError> =
        match path.action.as_str() {
            "start" => start_match,
            "pause" => pause_match,
            "expire" => expire_match,
            "reset" => reset_match,
            other => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({ "error": format!("Unknown action: {other}") }))
            }
        };
    with_tournament(&state, path.id, |entry| {
        transition(&mut entry.tournament, &path.match_id)
    })
}

/// Save final scores for a match.
#[put("/api/tournaments/{id}/matches/{match_id}/score")]
async fn api_complete_match(
    state: AppState,
    path: Path<(TournamentId, String)>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    let (id, match_id) = path.into_inner();
    with_tournament(&state, id, |entry| {
        complete_match(
            &mut entry.tournament,
            &match_id,
            body.score_a,
            body.score_b,
            &mut entry.results,
        )
        .map(|_| ())
    })
}

/// Fairness report: projection by default, played counts with `?played=true`.
#[get("/api/tournaments/{id}/fairness")]
async fn api_fairness(state: AppState, path: Path<TournamentPath>, query: web::Query<FairnessQuery>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let Some(entry) = g.get(&path.id) else {
        return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }));
    };
    let t = &entry.tournament;
    let report = if query.played {
        evaluate_played(t)
    } else {
        evaluate(&t.pool, t.config.total_rounds, t.config.courts_count)
    };
    HttpResponse::Ok().json(report)
}

/// Add a corrective group and one more planned round from the current projection.
#[post("/api/tournaments/{id}/extra-round")]
async fn api_extra_round(state: AppState, path: Path<TournamentPath>, query: web::Query<FairnessQuery>) -> HttpResponse {
    with_tournament(&state, path.id, |entry| {
        let t = &mut entry.tournament;
        let report = if query.played {
            evaluate_played(t)
        } else {
            evaluate(&t.pool, t.config.total_rounds, t.config.courts_count)
        };
        add_extra_round(t, &report).map(|_| ())
    })
}

/// Results delivered so far (for the downstream league table).
#[get("/api/tournaments/{id}/results")]
async fn api_results(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get(&path.id) {
        Some(entry) => HttpResponse::Ok().json(&entry.results),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Export the full snapshot.
#[get("/api/tournaments/{id}/snapshot")]
async fn api_export_snapshot(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get(&path.id) {
        Some(entry) => HttpResponse::Ok().json(entry.tournament.snapshot()),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Import a snapshot (creates or replaces the tournament with the snapshot's id).
#[post("/api/snapshots")]
async fn api_import_snapshot(state: AppState, body: Json<TournamentSnapshot>) -> HttpResponse {
    insert(&state, Tournament::from_snapshot(body.into_inner()))
}

/// Restart: same roster and configuration, no groups or rounds.
#[post("/api/tournaments/{id}/restart")]
async fn api_restart(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |entry| {
        entry.tournament.restart();
        entry.results.clear();
        Ok(())
    })
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
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_load_roster)
            .service(api_load_roster_csv)
            .service(api_form_group)
            .service(api_regenerate_group)
            .service(api_advisories)
            .service(api_schedule_round)
            .service(api_complete_match)
            .service(api_match_action)
            .service(api_fairness)
            .service(api_extra_round)
            .service(api_results)
            .service(api_export_snapshot)
            .service(api_import_snapshot)
            .service(api_restart)
    })
    .bind(bind)?
    .run()
    .await
}
