//! End-to-end CORS decisions through the tower layer.

use axum::http::StatusCode;
use cors_filter::config::{CorsConfig, PreflightRejection};
use tower::ServiceExt;

mod common;

use common::{cors_app, has_cors_headers, header, header_pairs, request, strings};

fn app_policy() -> CorsConfig {
    CorsConfig {
        allowed_origins: strings(&["https://app.com"]),
        allowed_methods: strings(&["GET", "POST"]),
        allowed_headers: strings(&["X-Token"]),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_preflight_success() {
    let (service, app) = cors_app(app_policy());

    let res = service
        .oneshot(request(
            "OPTIONS",
            &[
                ("Origin", "https://app.com"),
                ("Access-Control-Request-Method", "POST"),
                ("Access-Control-Request-Headers", "X-Token"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "access-control-allow-origin"), Some("https://app.com"));
    assert_eq!(header(&res, "access-control-allow-methods"), Some("POST"));
    assert_eq!(header(&res, "access-control-allow-headers"), Some("x-token"));
    assert_eq!(
        header(&res, "vary"),
        Some("Origin, Access-Control-Request-Method, Access-Control-Request-Headers")
    );
    assert_eq!(app.calls(), 0, "generated preflight must not reach the application");
}

#[tokio::test]
async fn test_preflight_origin_rejected() {
    let (service, app) = cors_app(app_policy());

    let res = service
        .oneshot(request(
            "OPTIONS",
            &[
                ("Origin", "https://evil.com"),
                ("Access-Control-Request-Method", "POST"),
                ("Access-Control-Request-Headers", "X-Token"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(!has_cors_headers(&res));
    assert_eq!(app.calls(), 0);
}

#[tokio::test]
async fn test_actual_request_with_credentials_echoes_origin() {
    let (service, app) = cors_app(CorsConfig {
        allowed_origins: strings(&["*"]),
        allowed_methods: strings(&["GET"]),
        allow_credentials: true,
        ..Default::default()
    });

    let res = service
        .oneshot(request("GET", &[("Origin", "https://app.com")]))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "x-app"), Some("yes"));
    assert_eq!(header(&res, "access-control-allow-origin"), Some("https://app.com"));
    assert_eq!(header(&res, "access-control-allow-credentials"), Some("true"));
    assert_eq!(header(&res, "vary"), Some("Origin"));
    assert_eq!(app.calls(), 1);
}

#[tokio::test]
async fn test_actual_request_without_origin_is_untouched() {
    let (service, app) = cors_app(app_policy());

    let res = service.oneshot(request("GET", &[])).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        header_pairs(&res),
        vec![
            ("x-app".to_string(), "yes".to_string()),
        ]
    );
    assert_eq!(app.calls(), 1);
}

#[tokio::test]
async fn test_star_origin_without_credentials_sends_star() {
    let (service, _app) = cors_app(CorsConfig {
        allowed_origins: strings(&["*"]),
        allowed_methods: strings(&["GET"]),
        exposed_headers: strings(&["X-Total-Count"]),
        ..Default::default()
    });

    let res = service
        .oneshot(request("GET", &[("Origin", "https://Anything.Example")]))
        .await
        .unwrap();

    assert_eq!(header(&res, "access-control-allow-origin"), Some("*"));
    assert_eq!(header(&res, "access-control-expose-headers"), Some("x-total-count"));
    assert!(header(&res, "access-control-allow-credentials").is_none());
}

#[tokio::test]
async fn test_wildcard_origin_pattern() {
    let config = CorsConfig {
        allowed_origins: strings(&["https://*.example.com"]),
        allowed_methods: strings(&["GET"]),
        ..Default::default()
    };

    let (service, _) = cors_app(config.clone());
    let res = service
        .oneshot(request(
            "OPTIONS",
            &[("Origin", "https://a.example.com"), ("Access-Control-Request-Method", "GET")],
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "access-control-allow-origin"), Some("https://a.example.com"));

    let (service, _) = cors_app(config);
    let res = service
        .oneshot(request(
            "OPTIONS",
            &[("Origin", "https://example.com"), ("Access-Control-Request-Method", "GET")],
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_no_methods_rejects_every_preflight() {
    let (service, _) = cors_app(CorsConfig {
        allowed_origins: strings(&["*"]),
        allowed_headers: strings(&["*"]),
        ..Default::default()
    });

    let res = service
        .oneshot(request(
            "OPTIONS",
            &[("Origin", "https://app.com"), ("Access-Control-Request-Method", "GET")],
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(!has_cors_headers(&res));
}

#[tokio::test]
async fn test_passthrough_forwards_rejected_preflight_by_default() {
    let (service, app) = cors_app(CorsConfig {
        options_passthrough: true,
        ..app_policy()
    });

    let res = service
        .oneshot(request(
            "OPTIONS",
            &[("Origin", "https://evil.com"), ("Access-Control-Request-Method", "GET")],
        ))
        .await
        .unwrap();

    assert_eq!(app.calls(), 1);
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(header(&res, "x-app"), Some("yes"));
    assert!(!has_cors_headers(&res));
    assert_eq!(
        header(&res, "vary"),
        Some("Origin, Access-Control-Request-Method, Access-Control-Request-Headers")
    );
}

#[tokio::test]
async fn test_passthrough_short_circuit_skips_application() {
    let (service, app) = cors_app(CorsConfig {
        options_passthrough: true,
        preflight_rejection: PreflightRejection::ShortCircuit,
        ..app_policy()
    });

    let res = service
        .oneshot(request(
            "OPTIONS",
            &[("Origin", "https://evil.com"), ("Access-Control-Request-Method", "GET")],
        ))
        .await
        .unwrap();

    assert_eq!(app.calls(), 0);
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(header(&res, "x-app").is_none());
}

#[tokio::test]
async fn test_passthrough_success_uses_application_body() {
    let (service, app) = cors_app(CorsConfig {
        options_passthrough: true,
        max_age: 120,
        ..app_policy()
    });

    let res = service
        .oneshot(request(
            "OPTIONS",
            &[("Origin", "https://app.com"), ("Access-Control-Request-Method", "get")],
        ))
        .await
        .unwrap();

    assert_eq!(app.calls(), 1);
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "x-app"), Some("yes"));
    assert_eq!(header(&res, "access-control-allow-methods"), Some("GET"));
    assert_eq!(header(&res, "access-control-max-age"), Some("120"));

    let body = axum::body::to_bytes(res.into_body(), 64).await.unwrap();
    assert_eq!(&body[..], b"app");
}

#[tokio::test]
async fn test_same_request_twice_gives_same_headers() {
    let config = CorsConfig {
        exposed_headers: strings(&["X-B", "X-A"]),
        allow_credentials: true,
        max_age: 60,
        ..app_policy()
    };
    let preflight = || {
        request(
            "OPTIONS",
            &[
                ("Origin", "https://app.com"),
                ("Access-Control-Request-Method", "POST"),
                ("Access-Control-Request-Headers", "x-token, origin"),
            ],
        )
    };
    let actual = || request("POST", &[("Origin", "https://app.com")]);

    let (service, _) = cors_app(config);
    let first = service.clone().oneshot(preflight()).await.unwrap();
    let second = service.clone().oneshot(preflight()).await.unwrap();
    assert_eq!(header_pairs(&first), header_pairs(&second));

    let first = service.clone().oneshot(actual()).await.unwrap();
    let second = service.oneshot(actual()).await.unwrap();
    assert_eq!(header_pairs(&first), header_pairs(&second));
    assert_eq!(header(&first, "access-control-expose-headers"), Some("x-b, x-a"));
}
