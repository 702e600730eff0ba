use crate::api_error::ApiError;
use crate::models::*;
use crate::service::PlayerService;
use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;

// =============================================================================
// READ
// =============================================================================

/// GET /api/player
pub async fn list_players(service: web::Data<PlayerService>) -> Result<impl Responder, ApiError> {
    let result = service.list().await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /api/player/:id
/// Profile with match history expanded
pub async fn get_player(
    service: web::Data<PlayerService>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let result = service.get_detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

// =============================================================================
// WRITE
// =============================================================================

/// PUT /api/player/:id
/// Identity fields only; totals and history are owned by match stats
pub async fn update_player(
    service: web::Data<PlayerService>,
    path: web::Path<Uuid>,
    req: web::Json<UpdatePlayerRequest>,
) -> Result<impl Responder, ApiError> {
    let result = service.update(path.into_inner(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// DELETE /api/player/:id
pub async fn delete_player(
    service: web::Data<PlayerService>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// =============================================================================
// ROUTE CONFIGURATION
// =============================================================================

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/player")
            .route("", web::get().to(list_players))
            .route("", web::post().to(super::team_handler::create_player))
            .route("/{id}", web::get().to(get_player))
            .route("/{id}", web::put().to(update_player))
            .route("/{id}", web::delete().to(delete_player)),
    );
}

#[cfg(test)]
mod tests {
    use crate::http::test_app;
    use crate::service::test_support::*;
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};
    use uuid::Uuid;

    #[actix_web::test]
    async fn test_profile_after_stats() {
        let league = League::new();
        let fixture = league.fixture().await;
        let alex = fixture.team_1_players[0].id;
        league
            .reconcile(fixture.game.id, vec![delta(alex, 11, 4, 2)], vec![])
            .await;
        let app = test::init_service(test_app(&league.store)).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/player/{}", alex))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["total_points"], 11);
        assert_eq!(body["match_history"][0]["points_scored"], 11);
        assert_eq!(body["match_history"][0]["did_not_play"], false);
        assert_eq!(body["match_history"][0]["tournament_name"], "Spring Open");
    }

    #[actix_web::test]
    async fn test_update_ignores_totals() {
        let league = League::new();
        let team = league.team("Falcons").await;
        let player = league.player(team.id, "Alex").await;
        let app = test::init_service(test_app(&league.store)).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/player/{}", player.id))
            .set_json(json!({ "name": "Alexis", "total_points": 99 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["name"], "Alexis");
        assert_eq!(body["total_points"], 0);
    }

    #[actix_web::test]
    async fn test_delete_player() {
        let league = League::new();
        let team = league.team("Falcons").await;
        let player = league.player(team.id, "Alex").await;
        let app = test::init_service(test_app(&league.store)).await;

        let uri = format!("/api/player/{}", player.id);
        let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/player/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
