use actix_web::{web, HttpResponse, Result};
use crate::api_error::ApiError;
use crate::store::SharedStore;

pub async fn health_check(store: web::Data<SharedStore>) -> Result<HttpResponse, ApiError> {
    store.ping().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "store": "ok"
    })))
}

#[cfg(test)]
mod tests {
    use crate::http::test_app;
    use crate::service::test_support::League;
    use actix_web::test;
    use serde_json::Value;

    #[actix_web::test]
    async fn test_health_reports_store() {
        let league = League::new();
        let app = test::init_service(test_app(&league.store)).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "healthy");
    }
}
