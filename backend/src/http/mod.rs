// HTTP layer: route tables and shared app data
pub mod health;
pub mod match_handler;
pub mod player_handler;
pub mod team_handler;
pub mod tournament_handler;

use crate::api_error::ApiError;
use crate::service::{MatchService, PlayerService, TeamService, TournamentService};
use crate::store::SharedStore;
use actix_web::web;

/// Registers the store and every service as app data. Malformed JSON bodies
/// are answered with the usual error body.
pub fn register_services(cfg: &mut web::ServiceConfig, store: SharedStore) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::bad_request(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError::bad_request(err.to_string()).into()
    }))
    .app_data(web::Data::new(TournamentService::new(store.clone())))
    .app_data(web::Data::new(TeamService::new(store.clone())))
    .app_data(web::Data::new(PlayerService::new(store.clone())))
    .app_data(web::Data::new(MatchService::new(store.clone())))
    .app_data(web::Data::new(store));
}

/// Everything under `/api`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .configure(tournament_handler::configure_routes)
            .configure(team_handler::configure_routes)
            .configure(player_handler::configure_routes)
            .configure(match_handler::configure_routes),
    );
}

#[cfg(test)]
pub(crate) fn test_app(
    store: &SharedStore,
) -> actix_web::App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let store = store.clone();
    actix_web::App::new()
        .configure(move |cfg| register_services(cfg, store))
        .configure(configure_routes)
}
