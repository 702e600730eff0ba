use crate::api_error::ApiError;
use crate::models::*;
use crate::service::{MatchService, TournamentService};
use actix_web::{web, HttpResponse, Responder};
use tracing::info;
use uuid::Uuid;

// =============================================================================
// READ
// =============================================================================

/// GET /api/tournaments
/// Latest, upcoming and all tournaments
pub async fn overview(service: web::Data<TournamentService>) -> Result<impl Responder, ApiError> {
    let result = service.overview().await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /api/tournaments/admin
pub async fn list_tournaments(
    service: web::Data<TournamentService>,
) -> Result<impl Responder, ApiError> {
    let result = service.list().await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /api/tournaments/:id
/// Tournament with teams and matches expanded
pub async fn get_tournament(
    service: web::Data<TournamentService>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let result = service.get_detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

// =============================================================================
// WRITE
// =============================================================================

/// POST /api/tournaments
pub async fn create_tournament(
    service: web::Data<TournamentService>,
    req: web::Json<CreateTournamentRequest>,
) -> Result<impl Responder, ApiError> {
    info!(name = %req.name, "Received create tournament request");

    let result = service.create(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(result))
}

/// PUT /api/tournaments/:id
pub async fn update_tournament(
    service: web::Data<TournamentService>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateTournamentRequest>,
) -> Result<impl Responder, ApiError> {
    let tournament_id = path.into_inner();
    info!(tournament_id = %tournament_id, "Received update tournament request");

    let result = service.update(tournament_id, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// DELETE /api/tournaments/:id
pub async fn delete_tournament(
    service: web::Data<TournamentService>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/tournaments/assign-team
/// Register a team; repeating the call is a no-op
pub async fn assign_team(
    service: web::Data<TournamentService>,
    req: web::Json<AssignTeamRequest>,
) -> Result<impl Responder, ApiError> {
    info!(
        tournament_id = %req.tournament_id,
        team_id = %req.team_id,
        "Received assign team request"
    );

    let tournament = service.assign_team(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(AssignTeamResponse {
        message: "Team assigned to tournament".to_string(),
        tournament,
    }))
}

/// POST /api/tournaments/match
/// Same as POST /api/match
pub async fn create_match(
    service: web::Data<MatchService>,
    req: web::Json<CreateMatchRequest>,
) -> Result<impl Responder, ApiError> {
    super::match_handler::create_match(service, req).await
}

// =============================================================================
// ROUTE CONFIGURATION
// =============================================================================

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tournaments")
            .route("", web::get().to(overview))
            .route("", web::post().to(create_tournament))
            .route("/admin", web::get().to(list_tournaments))
            .route("/assign-team", web::post().to(assign_team))
            .route("/match", web::post().to(create_match))
            .route("/{id}", web::get().to(get_tournament))
            .route("/{id}", web::put().to(update_tournament))
            .route("/{id}", web::delete().to(delete_tournament)),
    );
}
