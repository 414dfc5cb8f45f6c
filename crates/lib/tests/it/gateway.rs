//! HTTP gateway tests against a stub catalog service.
//!
//! Each test stands up a real axum server on an ephemeral port and drives
//! the production gateway at it, so header attachment, cookie transport,
//! body shapes and failure classification are all exercised over the wire.

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::Multipart,
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post, put},
};
use ludex::{
    Error,
    gateway::{AuthGateway, AvatarUpload, GatewayError, HttpGateway, ProfileUpdate},
    images::{ImageKind, ImageRef},
    store::{AmbientCredentials, CredentialStore, MemoryStore},
};
use serde_json::{Value, json};

/// Serve `app` on an ephemeral port, returning the base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_login_round_trip() {
    let seen = Arc::new(Mutex::new(None::<Value>));
    let seen_in_handler = seen.clone();
    let token = uuid::Uuid::new_v4().to_string();
    let token_in_handler = token.clone();

    let app = Router::new().route(
        "/api/auth/login",
        post(move |Json(body): Json<Value>| {
            let seen = seen_in_handler.clone();
            let token = token_in_handler.clone();
            async move {
                *seen.lock().unwrap() = Some(body);
                Json(json!({
                    "user": {"id": 7, "username": "alice", "role_id": 2, "avatar": true, "avatar_id": 42},
                    "token": token,
                }))
            }
        }),
    );
    let base = serve(app).await;

    let gateway = HttpGateway::new(&base, Arc::new(MemoryStore::new())).unwrap();
    let payload = gateway.login("alice", "hunter2").await.unwrap();

    assert_eq!(payload.user.id, 7);
    assert_eq!(payload.user.username, "alice");
    // The duck-typed avatar flag arrives normalized
    assert_eq!(
        payload.user.avatar,
        ImageRef::Owner {
            id: 42,
            kind: ImageKind::User
        }
    );
    assert_eq!(payload.token.as_deref(), Some(token.as_str()));

    let body = seen.lock().unwrap().clone().unwrap();
    assert_eq!(body, json!({"username": "alice", "password": "hunter2"}));
}

#[tokio::test]
async fn test_register_round_trip() {
    let app = Router::new().route(
        "/api/auth/register",
        post(|Json(body): Json<Value>| async move {
            let username = body["username"].as_str().unwrap_or_default().to_string();
            Json(json!({
                "user": {"id": 11, "username": username, "role_id": 2, "avatar": "/uploads/11.png"},
                "token": "fresh-token",
            }))
        }),
    );
    let base = serve(app).await;

    let gateway = HttpGateway::new(&base, Arc::new(MemoryStore::new())).unwrap();
    let payload = gateway.register("newcomer", "hunter2").await.unwrap();

    assert_eq!(payload.user.username, "newcomer");
    // Older records carry a raw path instead of the flag-and-id pair
    assert_eq!(
        payload.user.avatar,
        ImageRef::Path("/uploads/11.png".to_string())
    );
    assert_eq!(payload.token.as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn test_me_attaches_the_stored_bearer_token() {
    let seen_auth = Arc::new(Mutex::new(None::<String>));
    let seen_in_handler = seen_auth.clone();

    let app = Router::new().route(
        "/api/auth/me",
        get(move |headers: HeaderMap| {
            let seen = seen_in_handler.clone();
            async move {
                *seen.lock().unwrap() = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);
                Json(json!({"user": {"id": 1, "username": "root", "role_id": 1, "avatar": false}}))
            }
        }),
    );
    let base = serve(app).await;

    let store = Arc::new(MemoryStore::new());
    CredentialStore::save(&*store, "sesame").await.unwrap();
    let gateway = HttpGateway::new(&base, store).unwrap();

    let user = gateway.me().await.unwrap();
    assert!(user.is_admin());
    assert_eq!(user.avatar, ImageRef::None);
    assert_eq!(seen_auth.lock().unwrap().as_deref(), Some("Bearer sesame"));
}

#[tokio::test]
async fn test_ambient_deployment_rides_the_cookie_jar() {
    let sid = uuid::Uuid::new_v4().to_string();
    let sid_for_login = sid.clone();
    let sid_for_me = sid.clone();

    let app = Router::new()
        .route(
            "/api/auth/login",
            post(move |Json(_): Json<Value>| {
                let sid = sid_for_login.clone();
                async move {
                    (
                        AppendHeaders([(header::SET_COOKIE, format!("sid={sid}; Path=/"))]),
                        Json(json!({
                            "user": {"id": 3, "username": "cookie_user", "role_id": 2, "avatar": false}
                        })),
                    )
                }
            }),
        )
        .route(
            "/api/auth/me",
            get(move |headers: HeaderMap| {
                let sid = sid_for_me.clone();
                async move {
                    let cookies = headers
                        .get(header::COOKIE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default();
                    if cookies.contains(&format!("sid={sid}")) {
                        Json(json!({
                            "user": {"id": 3, "username": "cookie_user", "role_id": 2, "avatar": false}
                        }))
                        .into_response()
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"message": "Not signed in"})),
                        )
                            .into_response()
                    }
                }
            }),
        );
    let base = serve(app).await;

    let gateway = HttpGateway::new(&base, Arc::new(AmbientCredentials)).unwrap();

    // No token in the body; the session arrives as a cookie and the jar
    // carries it back on the follow-up request
    let payload = gateway.login("cookie_user", "hunter2").await.unwrap();
    assert_eq!(payload.token, None);

    let user = gateway.me().await.unwrap();
    assert_eq!(user.username, "cookie_user");
}

#[tokio::test]
async fn test_server_messages_surface_verbatim() {
    let app = Router::new()
        .route(
            "/api/auth/login",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"message": "Invalid credentials"})),
                )
            }),
        )
        .route(
            "/api/auth/register",
            post(|| async {
                (
                    StatusCode::CONFLICT,
                    Json(json!({"message": "Username already exists"})),
                )
            }),
        );
    let base = serve(app).await;
    let gateway = HttpGateway::new(&base, Arc::new(MemoryStore::new())).unwrap();

    let err = gateway.login("alice", "wrong").await.unwrap_err();
    match err {
        Error::Gateway(GatewayError::Unauthorized { message }) => {
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("Unexpected error: {other:?}"),
    }

    let err = gateway.register("alice", "hunter2").await.unwrap_err();
    match err {
        Error::Gateway(GatewayError::Rejected { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Username already exists");
        }
        other => panic!("Unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_failures_without_a_message_body_get_a_fallback() {
    let app = Router::new().route(
        "/api/auth/me",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = serve(app).await;
    let store = Arc::new(MemoryStore::new());
    CredentialStore::save(&*store, "sesame").await.unwrap();
    let gateway = HttpGateway::new(&base, store).unwrap();

    let err = gateway.me().await.unwrap_err();
    match err {
        Error::Gateway(GatewayError::Server { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Request failed with status 500 Internal Server Error");
        }
        other => panic!("Unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_service_mounted_under_a_subpath() {
    let inner = Router::new().route(
        "/api/auth/me",
        get(|| async {
            Json(json!({"user": {"id": 2, "username": "nested", "role_id": 2, "avatar": false}}))
        }),
    );
    let app = Router::new().nest("/catalog", inner);
    let base = serve(app).await;

    let gateway =
        HttpGateway::new(&format!("{base}/catalog"), Arc::new(MemoryStore::new())).unwrap();
    let user = gateway.me().await.unwrap();
    assert_eq!(user.username, "nested");
}

#[tokio::test]
async fn test_unreachable_service_classifies_as_connection_failure() {
    // Grab a port and close it again so nothing is listening there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let gateway = HttpGateway::new(&base, Arc::new(MemoryStore::new())).unwrap();
    let err = gateway.me().await.unwrap_err();
    assert!(err.is_network_error());
}

#[tokio::test]
async fn test_logout_posts_to_the_service() {
    let hits = Arc::new(Mutex::new(0u32));
    let hits_in_handler = hits.clone();

    let app = Router::new().route(
        "/api/auth/logout",
        post(move || {
            let hits = hits_in_handler.clone();
            async move {
                *hits.lock().unwrap() += 1;
                Json(json!({"message": "Logged out"}))
            }
        }),
    );
    let base = serve(app).await;

    let gateway = HttpGateway::new(&base, Arc::new(MemoryStore::new())).unwrap();
    gateway.logout().await.unwrap();
    assert_eq!(*hits.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_profile_update_submits_multipart_fields() {
    type Part = (String, Option<String>, Option<String>, Vec<u8>);
    let parts: Arc<Mutex<Vec<Part>>> = Arc::new(Mutex::new(Vec::new()));
    let parts_in_handler = parts.clone();

    let app = Router::new().route(
        "/api/users/profile",
        put(move |mut multipart: Multipart| {
            let parts = parts_in_handler.clone();
            async move {
                while let Some(field) = multipart.next_field().await.unwrap() {
                    let name = field.name().unwrap_or_default().to_string();
                    let filename = field.file_name().map(String::from);
                    let content_type = field.content_type().map(String::from);
                    let bytes = field.bytes().await.unwrap().to_vec();
                    parts.lock().unwrap().push((name, filename, content_type, bytes));
                }
                Json(json!({
                    "user": {"id": 7, "username": "alice_prime", "role_id": 2, "avatar": true, "avatar_id": 7}
                }))
            }
        }),
    );
    let base = serve(app).await;

    let store = Arc::new(MemoryStore::new());
    CredentialStore::save(&*store, "sesame").await.unwrap();
    let gateway = HttpGateway::new(&base, store).unwrap();

    let update = ProfileUpdate {
        username: "alice_prime".to_string(),
        avatar: Some(AvatarUpload {
            filename: "avatar.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }),
    };
    let user = gateway.update_profile(update).await.unwrap();
    assert_eq!(user.username, "alice_prime");
    assert_eq!(
        user.avatar,
        ImageRef::Owner {
            id: 7,
            kind: ImageKind::User
        }
    );

    let parts = parts.lock().unwrap().clone();
    assert_eq!(parts.len(), 2);

    let (name, _, _, bytes) = &parts[0];
    assert_eq!(name, "username");
    assert_eq!(bytes.as_slice(), b"alice_prime".as_slice());

    let (name, filename, content_type, bytes) = &parts[1];
    assert_eq!(name, "avatar");
    assert_eq!(filename.as_deref(), Some("avatar.png"));
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(bytes.as_slice(), [0x89, 0x50, 0x4e, 0x47].as_slice());
}

#[tokio::test]
async fn test_profile_update_without_avatar_sends_one_field() {
    let parts: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let parts_in_handler = parts.clone();

    let app = Router::new().route(
        "/api/users/profile",
        put(move |mut multipart: Multipart| {
            let parts = parts_in_handler.clone();
            async move {
                while let Some(field) = multipart.next_field().await.unwrap() {
                    parts
                        .lock()
                        .unwrap()
                        .push(field.name().unwrap_or_default().to_string());
                    field.bytes().await.unwrap();
                }
                Json(json!({
                    "user": {"id": 7, "username": "quiet_rename", "role_id": 2, "avatar": false}
                }))
            }
        }),
    );
    let base = serve(app).await;

    let gateway = HttpGateway::new(&base, Arc::new(MemoryStore::new())).unwrap();
    let user = gateway
        .update_profile(ProfileUpdate {
            username: "quiet_rename".to_string(),
            avatar: None,
        })
        .await
        .unwrap();

    assert_eq!(user.username, "quiet_rename");
    assert_eq!(*parts.lock().unwrap(), vec!["username".to_string()]);
}
