use crate::api_error::ApiError;
use crate::models::*;
use crate::service::MatchService;
use actix_web::{web, HttpResponse, Responder};
use tracing::info;
use uuid::Uuid;

// =============================================================================
// READ
// =============================================================================

/// GET /api/match
/// Match summaries with team names, rosters and tournament name
pub async fn list_matches(service: web::Data<MatchService>) -> Result<impl Responder, ApiError> {
    let result = service.list().await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /api/match/:id
pub async fn get_match(
    service: web::Data<MatchService>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let result = service.get_detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

// =============================================================================
// WRITE
// =============================================================================

/// POST /api/match
pub async fn create_match(
    service: web::Data<MatchService>,
    req: web::Json<CreateMatchRequest>,
) -> Result<impl Responder, ApiError> {
    info!(
        tournament_id = %req.tournament_id,
        team_1 = %req.team_1,
        team_2 = %req.team_2,
        "Received create match request"
    );

    let game = service.create(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(CreateMatchResponse {
        message: "Match created and added to tournament".to_string(),
        match_data: game,
    }))
}

/// PUT /api/match/:id
/// Apply per-player stat deltas and settle scores and winner
pub async fn update_match_stats(
    service: web::Data<MatchService>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateMatchStatsRequest>,
) -> Result<impl Responder, ApiError> {
    let match_id = path.into_inner();

    info!(
        match_id = %match_id,
        team_1_deltas = req.team_1_players.len(),
        team_2_deltas = req.team_2_players.len(),
        "Received match stats update"
    );

    let result = service.update_stats(match_id, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// PUT /api/match/:id/details
pub async fn update_match_details(
    service: web::Data<MatchService>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateMatchDetailsRequest>,
) -> Result<impl Responder, ApiError> {
    let result = service
        .update_details(path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

/// DELETE /api/match/:id
pub async fn delete_match(
    service: web::Data<MatchService>,
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
        web::scope("/match")
            .route("", web::get().to(list_matches))
            .route("", web::post().to(create_match))
            .route("/{id}", web::get().to(get_match))
            .route("/{id}", web::put().to(update_match_stats))
            .route("/{id}", web::delete().to(delete_match))
            .route("/{id}/details", web::put().to(update_match_details)),
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
    async fn test_stats_update_settles_winner() {
        let league = League::new();
        let fixture = league.fixture().await;
        let app = test::init_service(test_app(&league.store)).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/match/{}", fixture.game.id))
            .set_json(json!({
                "team_1_players": [{"player_id": fixture.team_1_players[0].id, "points": 20}],
                "team_2_players": [{"player_id": fixture.team_2_players[0].id, "points": 18, "rebounds": 4}],
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["applied"], true);
        assert_eq!(body["match"]["team_1_score"], 20);
        assert_eq!(body["match"]["team_2_score"], 18);
        assert_eq!(body["match"]["winner"], json!(fixture.team_1.id));
    }

    #[actix_web::test]
    async fn test_negative_points_are_400() {
        let league = League::new();
        let fixture = league.fixture().await;
        let app = test::init_service(test_app(&league.store)).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/match/{}", fixture.game.id))
            .set_json(json!({
                "team_1_players": [{"player_id": fixture.team_1_players[0].id, "points": -5}],
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 400);
    }

    #[actix_web::test]
    async fn test_malformed_id_is_json_400() {
        let league = League::new();
        let app = test::init_service(test_app(&league.store)).await;

        for req in [
            test::TestRequest::get().uri("/api/match/not-a-uuid"),
            test::TestRequest::put()
                .uri("/api/match/not-a-uuid")
                .set_json(json!({"team_1_players": []})),
        ] {
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["code"], 400);
            assert!(body["error"].is_string());
        }
    }

    #[actix_web::test]
    async fn test_create_with_unregistered_team_is_400() {
        let league = League::new();
        let tournament = league.tournament("Spring Open").await;
        let falcons = league.team("Falcons").await;
        let herons = league.team("Herons").await;
        league.register(tournament.id, falcons.id).await;
        let app = test::init_service(test_app(&league.store)).await;

        let req = test::TestRequest::post()
            .uri("/api/match")
            .set_json(match_request(tournament.id, falcons.id, herons.id))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_tournament_alias_creates_match() {
        let league = League::new();
        let tournament = league.tournament("Spring Open").await;
        let falcons = league.team("Falcons").await;
        let herons = league.team("Herons").await;
        league.register(tournament.id, falcons.id).await;
        league.register(tournament.id, herons.id).await;
        let app = test::init_service(test_app(&league.store)).await;

        let req = test::TestRequest::post()
            .uri("/api/tournaments/match")
            .set_json(match_request(tournament.id, falcons.id, herons.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["match"]["tournament_id"], json!(tournament.id));
    }

    #[actix_web::test]
    async fn test_delete_match_then_404() {
        let league = League::new();
        let fixture = league.fixture().await;
        let app = test::init_service(test_app(&league.store)).await;

        let uri = format!("/api/match/{}", fixture.game.id);
        let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_missing_match_is_404() {
        let league = League::new();
        let app = test::init_service(test_app(&league.store)).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/match/{}", Uuid::new_v4()))
            .set_json(json!({"team_1_players": []}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Match not found");
    }
}
