use axum::{
    Extension, Json,
    extract::{Path, State},
    http::Method,
};
use axum_extra::extract::WithRejection;
use tracing::info;

use tradehall_signer::{SignError, SignableParams, SignatureResult};
use tradehall_types::api::{
    BrokerSummary, Claims, HealthResponse, SignRequest, SignedUrlRequest, SignedUrlResponse,
};

use crate::error::ApiError;
use crate::state::{AppState, BrokerEntry};

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".into() })
}

pub async fn list_brokers(State(state): State<AppState>) -> Json<Vec<BrokerSummary>> {
    Json(state.brokers.summaries())
}

/// Sign a parameter set with the named broker's scheme and credentials.
pub async fn sign_params(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<SignRequest>, ApiError>,
) -> Result<Json<SignatureResult>, ApiError> {
    let entry = lookup(&state, &name)?;
    let params = SignableParams::from_json_object(req.params).map_err(SignError::from)?;

    let result = entry.client.signer().sign(&params)?;

    info!(
        broker = %name,
        service = %claims.service,
        scheme = %result.scheme,
        "signed broker params",
    );
    Ok(Json(result))
}

/// Produce a fully signed outbound url for the named broker.
pub async fn signed_request(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<SignedUrlRequest>, ApiError>,
) -> Result<Json<SignedUrlResponse>, ApiError> {
    let entry = lookup(&state, &name)?;
    let method = parse_method(&req.method)?;
    let params = SignableParams::from_json_object(req.params).map_err(SignError::from)?;

    let (url, signature) = entry.client.signed_url(&req.path, &params)?;

    info!(
        broker = %name,
        service = %claims.service,
        method = %method,
        path = url.path(),
        "signed broker request url",
    );
    Ok(Json(SignedUrlResponse {
        method: method.to_string(),
        url: url.to_string(),
        signature,
    }))
}

fn lookup<'a>(state: &'a AppState, name: &str) -> Result<&'a BrokerEntry, ApiError> {
    state
        .brokers
        .get(name)
        .ok_or_else(|| ApiError::NotFound(format!("unknown broker '{}'", name)))
}

fn parse_method(raw: &str) -> Result<Method, ApiError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        other => Err(ApiError::Unprocessable(format!("unsupported method '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use tradehall_broker::{BrokerClient, BrokerProfile};
    use tradehall_signer::{DigestSigner, FixedClock, OutputEncoding, SignatureScheme, TimestampSigner};

    use crate::auth::create_token;
    use crate::router;
    use crate::state::{AppStateInner, BrokerRegistry};

    const SERVICE_SECRET: &str = "service-secret-for-tests";
    const BROKER_SECRET: &str = "test-secret";

    fn app() -> Router {
        let mut brokers = BrokerRegistry::new();

        let perp = BrokerProfile::new("perp", "https://api.perp.example", SignatureScheme::Timestamp)
            .unwrap()
            .with_api_key("pk_perp");
        let perp_signer =
            TimestampSigner::with_clock(BROKER_SECRET, Arc::new(FixedClock::new(1_700_000_000_000))).unwrap();
        brokers.register(BrokerClient::new(perp, Arc::new(perp_signer)), None);

        let spot = BrokerProfile::new("spot", "https://api.spot.example/v1", SignatureScheme::Digest).unwrap();
        let spot_signer = DigestSigner::new(BROKER_SECRET).unwrap();
        brokers.register(
            BrokerClient::new(spot, Arc::new(spot_signer)),
            Some(OutputEncoding::Base64),
        );

        router(Arc::new(AppStateInner { brokers, service_secret: SERVICE_SECRET.into() }))
    }

    fn token() -> String {
        create_token(SERVICE_SECRET, "community-web", chrono::Duration::minutes(5)).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token()))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    #[tokio::test]
    async fn health_is_public() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = call(app(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_need_a_valid_token() {
        let req = Request::builder().uri("/brokers").body(Body::empty()).unwrap();
        assert_eq!(call(app(), req).await.0, StatusCode::UNAUTHORIZED);

        let forged = create_token("some-other-secret", "intruder", chrono::Duration::minutes(5)).unwrap();
        let req = Request::builder()
            .uri("/brokers")
            .header(header::AUTHORIZATION, format!("Bearer {}", forged))
            .body(Body::empty())
            .unwrap();
        assert_eq!(call(app(), req).await.0, StatusCode::UNAUTHORIZED);

        let expired = create_token(SERVICE_SECRET, "stale", chrono::Duration::hours(-1)).unwrap();
        let req = Request::builder()
            .uri("/brokers")
            .header(header::AUTHORIZATION, format!("Bearer {}", expired))
            .body(Body::empty())
            .unwrap();
        assert_eq!(call(app(), req).await.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn lists_brokers_without_credentials() {
        let req = Request::builder()
            .uri("/brokers")
            .header(header::AUTHORIZATION, format!("Bearer {}", token()))
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(app(), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "perp");
        assert_eq!(body[0]["scheme"], "timestamp");
        assert!(body[0].get("encoding").is_none());
        assert_eq!(body[1]["name"], "spot");
        assert_eq!(body[1]["encoding"], "base64");
        assert!(!body.to_string().contains("pk_perp"));
        assert!(!body.to_string().contains(BROKER_SECRET));
    }

    #[tokio::test]
    async fn signs_with_timestamp_scheme() {
        let req = post(
            "/brokers/perp/sign",
            json!({ "params": { "uid": "123", "sourceType": "PERPETUAL", "memo": null } }),
        );
        let (status, body) = call(app(), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["canonical"], "sourceType=PERPETUAL&timestamp=1700000000000&uid=123");
        assert_eq!(body["timestamp"], "1700000000000");
        assert_eq!(
            body["signature"],
            "b5326ee638224b28f17f039b1bf20b6376573d26c44cd36f28ff1ccb9982bdd8"
        );
    }

    #[tokio::test]
    async fn signs_with_digest_scheme_and_drops_sign() {
        let req = post(
            "/brokers/SPOT/sign",
            json!({ "params": { "api_key": "abc", "amount": "1", "sign": "stale" } }),
        );
        let (status, body) = call(app(), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["canonical"], "amount=1&api_key=abc");
        assert_eq!(body["intermediate_digest"], "6D3AB2A534AEA18542966334F58A863D");
        assert_eq!(body["signature"], "pd04LJMZr3WLMLlsqVsRTcG1g4qt/r8tZbkJUPMQGxc=");
    }

    #[tokio::test]
    async fn unknown_broker_is_not_found() {
        let (status, body) = call(app(), post("/brokers/nope/sign", json!({ "params": {} }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "unknown broker 'nope'");
    }

    #[tokio::test]
    async fn nested_params_are_unprocessable() {
        let req = post("/brokers/perp/sign", json!({ "params": { "legs": [1, 2] } }));
        let (status, body) = call(app(), req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("legs"));
    }

    #[tokio::test]
    async fn mistyped_params_are_unprocessable_json() {
        let req = post("/brokers/spot/sign", json!({ "params": "x" }));
        let (status, body) = call(app(), req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn truncated_body_is_unprocessable_json() {
        let req = Request::builder()
            .method("POST")
            .uri("/brokers/spot/requests")
            .header(header::AUTHORIZATION, format!("Bearer {}", token()))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"path":"/x","params":{}"#))
            .unwrap();
        let (status, body) = call(app(), req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn empty_params_still_sign() {
        let (status, body) = call(app(), post("/brokers/spot/sign", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["canonical"], "");
        assert_eq!(body["intermediate_digest"], "D41D8CD98F00B204E9800998ECF8427E");
    }

    #[tokio::test]
    async fn builds_signed_request_url() {
        let req = post(
            "/brokers/spot/requests",
            json!({ "method": "post", "path": "/withdraw", "params": { "api_key": "abc", "amount": 1 } }),
        );
        let (status, body) = call(app(), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["method"], "POST");
        assert_eq!(
            body["url"],
            "https://api.spot.example/v1/withdraw?amount=1&api_key=abc\
             &sign=pd04LJMZr3WLMLlsqVsRTcG1g4qt%2Fr8tZbkJUPMQGxc%3D"
        );
        assert_eq!(body["signature"]["scheme"], "digest");
    }

    #[tokio::test]
    async fn query_delimiters_in_values_are_unprocessable() {
        let req = post(
            "/brokers/perp/requests",
            json!({ "path": "/order", "params": { "memo": "a&b=c d+e#f" } }),
        );
        let (status, body) = call(app(), req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("memo"));

        // The bare signing route has no url to break.
        let req = post("/brokers/perp/sign", json!({ "params": { "memo": "a&b" } }));
        assert_eq!(call(app(), req).await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn rejects_unsupported_methods() {
        let req = post("/brokers/spot/requests", json!({ "method": "TRACE", "path": "/x" }));
        let (status, _) = call(app(), req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
