use crate::{
    api::{employee, leave_request},
    config::Config,
    error::LeaveError,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{Responder, error::JsonPayloadError, get, web};
use tracing::warn;

pub type RateLimit = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-peer-IP limiter shared by every API route.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<RateLimit> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {requests_per_min} per minute"))
}

#[get("/")]
async fn index() -> impl Responder {
    "Hello! Your server is working."
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: &RateLimit) {
    cfg.service(index).service(
        web::scope(&config.api_prefix)
            .wrap(Governor::new(limiter))
            .configure(api_routes),
    );
}

/// Employee and leave routes, without middleware.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| {
        warn!(error = %err, path = %req.path(), "Malformed request body");
        match err {
            JsonPayloadError::Deserialize(_) => LeaveError::validation("Invalid request body."),
            other => LeaveError::validation(other.to_string()),
        }
        .into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        LeaveError::validation(err.to_string()).into()
    }))
    .service(
        web::scope("/employees")
            // /employees
            .service(
                web::resource("")
                    .route(web::post().to(employee::create_employee))
                    .route(web::get().to(employee::list_employees)),
            )
            // /employees/{id}
            .service(web::resource("/{id}").route(web::get().to(employee::get_employee)))
            // /employees/{id}/balance
            .service(web::resource("/{id}/balance").route(web::get().to(employee::get_balance))),
    )
    .service(
        web::scope("/leaves")
            // /leaves
            .service(web::resource("").route(web::get().to(leave_request::leave_list)))
            // /leaves/apply
            .service(web::resource("/apply").route(web::post().to(leave_request::apply_leave)))
            // /leaves/{id}
            .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
            // /leaves/{id}/status
            .service(
                web::resource("/{id}/status")
                    .route(web::put().to(leave_request::update_leave_status)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AppState;
    use actix_web::{App, http::StatusCode, middleware::NormalizePath, test};
    use serde_json::{Value, json};
    use std::net::SocketAddr;

    fn config(api_prefix: &str) -> Config {
        Config {
            server_addr: "127.0.0.1:0".to_string(),
            log_dir: "logs".to_string(),
            annual_leave_allowance: 20,
            rate_per_min: 1000,
            api_prefix: api_prefix.to_string(),
        }
    }

    fn peer() -> SocketAddr {
        "10.0.0.7:40000".parse().unwrap()
    }

    macro_rules! served_app {
        ($config:expr, $limiter:expr) => {
            test::init_service(
                App::new()
                    .wrap(NormalizePath::trim())
                    .app_data(web::Data::new(AppState::new($config.annual_leave_allowance)))
                    .configure(|cfg| configure(cfg, &$config, &$limiter)),
            )
            .await
        };
    }

    fn register_req(uri: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri(uri)
            .peer_addr(peer())
            .set_json(json!({
                "name": "Ann",
                "email": "ann@corp.io",
                "department": "Ops",
                "joiningDate": "2025-01-01"
            }))
    }

    #[actix_web::test]
    async fn served_app_answers_health_and_trailing_slash() {
        let config = config("");
        let limiter = build_limiter(config.rate_per_min).unwrap();
        let app = served_app!(config, limiter);

        let req = test::TestRequest::get().uri("/").peer_addr(peer()).to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "Hello! Your server is working.");

        let resp = test::call_service(&app, register_req("/employees/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/employees/1/balance/")
            .peer_addr(peer())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "employeeId": 1, "leaveBalance": 20 }));

        let req = test::TestRequest::get()
            .uri("/employees/abc/balance")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn api_prefix_moves_routes_but_not_health() {
        let config = config("/api/v1");
        let limiter = build_limiter(config.rate_per_min).unwrap();
        let app = served_app!(config, limiter);

        let resp = test::call_service(&app, register_req("/api/v1/employees").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(&app, register_req("/employees").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/").peer_addr(peer()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn wrong_typed_field_gets_stable_message() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(20)))
                .configure(api_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/leaves/apply")
            .set_json(json!({
                "employeeId": "1",
                "startDate": "2025-03-03",
                "endDate": "2025-03-03"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Invalid request body." }));
    }

    #[::core::prelude::v1::test]
    fn limiter_accepts_zero_and_large_rates() {
        assert!(build_limiter(0).is_ok());
        assert!(build_limiter(30).is_ok());
        assert!(build_limiter(120_000).is_ok());
    }
}
