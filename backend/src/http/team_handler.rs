use crate::api_error::ApiError;
use crate::models::*;
use crate::service::{PlayerService, TeamService};
use actix_web::{web, HttpResponse, Responder};
use tracing::info;
use uuid::Uuid;

// =============================================================================
// READ
// =============================================================================

/// GET /api/team
pub async fn list_teams(service: web::Data<TeamService>) -> Result<impl Responder, ApiError> {
    let result = service.list().await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /api/team/:id
/// Team with its roster expanded
pub async fn get_team(
    service: web::Data<TeamService>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let result = service.get_detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /api/team/names
/// Name and coach for each known id, in request order
pub async fn team_names(
    service: web::Data<TeamService>,
    req: web::Json<TeamNamesRequest>,
) -> Result<impl Responder, ApiError> {
    let result = service.team_names(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

// =============================================================================
// WRITE
// =============================================================================

/// POST /api/team
pub async fn create_team(
    service: web::Data<TeamService>,
    req: web::Json<CreateTeamRequest>,
) -> Result<impl Responder, ApiError> {
    info!(name = %req.name, "Received create team request");

    let result = service.create(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(result))
}

/// PUT /api/team/:id
pub async fn update_team(
    service: web::Data<TeamService>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateTeamRequest>,
) -> Result<impl Responder, ApiError> {
    let result = service.update(path.into_inner(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// PUT /api/team/:id/coach
pub async fn set_coach(
    service: web::Data<TeamService>,
    path: web::Path<Uuid>,
    req: web::Json<Coach>,
) -> Result<impl Responder, ApiError> {
    let result = service.set_coach(path.into_inner(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// DELETE /api/team/:id
pub async fn delete_team(
    service: web::Data<TeamService>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/team/player
/// Create a player on a team's roster
pub async fn create_player(
    service: web::Data<PlayerService>,
    req: web::Json<CreatePlayerRequest>,
) -> Result<impl Responder, ApiError> {
    info!(team_id = %req.current_team, "Received create player request");

    let result = service.create(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(result))
}

// =============================================================================
// ROUTE CONFIGURATION
// =============================================================================

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/team")
            .route("", web::get().to(list_teams))
            .route("", web::post().to(create_team))
            .route("/names", web::post().to(team_names))
            .route("/player", web::post().to(create_player))
            .route("/{id}", web::get().to(get_team))
            .route("/{id}", web::put().to(update_team))
            .route("/{id}", web::delete().to(delete_team))
            .route("/{id}/coach", web::put().to(set_coach)),
    );
}
