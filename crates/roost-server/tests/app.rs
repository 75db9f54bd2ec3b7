//! End-to-end tests driving the full router against an in-memory store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use http_body_util::BodyExt;
use tower::ServiceExt;

use roost_api::{AppState, AppStateInner, GateConfig, auth, router};
use roost_db::Database;
use roost_types::api::LikeResponse;

const GATE_USER: &str = "roost";
const GATE_PASS: &str = "not-open-yet";
const PASSWORD: &str = "correct-horse-battery";

fn app() -> (Router, AppState) {
    let state: AppState = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        secret_key: "test-secret".into(),
        gate: GateConfig {
            username: GATE_USER.into(),
            password: GATE_PASS.into(),
        },
    });
    (router(state.clone()), state)
}

fn gate_header() -> String {
    format!("Basic {}", B64.encode(format!("{GATE_USER}:{GATE_PASS}")))
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    form_body: Option<&str>,
    cookie: Option<&str>,
    gate: bool,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if gate {
        builder = builder.header(header::AUTHORIZATION, gate_header());
    }
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let req = match form_body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}

fn session_cookie(res: &Response<Body>) -> Option<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("roost_session="))
        .map(|v| v.split(';').next().unwrap_or(v).to_string())
}

fn location(res: &Response<Body>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

async fn body_string(res: Response<Body>) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Sign up a user through the real handler and hand back their session
/// cookie pair.
async fn signup(app: &Router, username: &str, email: &str) -> String {
    let body = format!(
        "name=Test+User&username={username}&email={email}\
         &password={PASSWORD}&confirm={PASSWORD}&agree_to_tos=on"
    );
    let res = send(app, "POST", "/signup", Some(&body), None, true).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER, "signup should redirect");
    assert_eq!(location(&res), "/home");
    session_cookie(&res).expect("signup should establish a session")
}

// -- Gate --

#[tokio::test]
async fn gate_challenges_without_credentials() {
    let (app, _) = app();
    let res = send(&app, "GET", "/", None, None, false).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn gate_rejects_wrong_pair() {
    let (app, _) = app();
    let bad = format!("Basic {}", B64.encode("roost:wrong"));
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::AUTHORIZATION, bad)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn gate_accepts_configured_pair() {
    let (app, _) = app();
    let res = send(&app, "GET", "/", None, None, true).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn gate_does_not_cover_session_routes() {
    let (app, _) = app();
    let cookie = signup(&app, "alice_01", "alice@example.com").await;
    let res = send(&app, "GET", "/home", None, Some(&cookie), false).await;
    assert_eq!(res.status(), StatusCode::OK);
}

// -- Sessions --

#[tokio::test]
async fn anonymous_home_redirects_to_login() {
    let (app, _) = app();
    let res = send(&app, "GET", "/home", None, None, false).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn landing_redirects_home_when_logged_in() {
    let (app, _) = app();
    let cookie = signup(&app, "alice_01", "alice@example.com").await;
    let res = send(&app, "GET", "/", None, Some(&cookie), true).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/home");
}

#[tokio::test]
async fn logout_clears_the_session() {
    let (app, _) = app();
    let cookie = signup(&app, "alice_01", "alice@example.com").await;

    let res = send(&app, "GET", "/logout", None, Some(&cookie), false).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    // The logout response expires the cookie; a client that honors it has
    // no session any more.
    let cleared = session_cookie(&res).unwrap();
    assert_eq!(cleared, "roost_session=");
}

// -- Signup --

#[tokio::test]
async fn signup_stores_a_verifiable_hash() {
    let (app, state) = app();
    signup(&app, "alice_01", "alice@example.com").await;

    let user = state.db.user_by_username("alice_01").unwrap().unwrap();
    assert_ne!(user.password, PASSWORD);
    assert!(auth::verify_password(&user.password, PASSWORD));
    assert_eq!(user.role, "user");
}

#[tokio::test]
async fn signup_rejects_duplicates() {
    let (app, state) = app();
    signup(&app, "alice_01", "alice@example.com").await;

    // Same email, different username, and vice versa.
    for body in [
        format!(
            "name=Dup&username=alice_02&email=alice@example.com\
             &password={PASSWORD}&confirm={PASSWORD}&agree_to_tos=on"
        ),
        format!(
            "name=Dup&username=alice_01&email=other@example.com\
             &password={PASSWORD}&confirm={PASSWORD}&agree_to_tos=on"
        ),
    ] {
        let res = send(&app, "POST", "/signup", Some(&body), None, true).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(session_cookie(&res).is_none());
    }

    assert_eq!(state.db.list_users().unwrap().len(), 1);
}

#[tokio::test]
async fn signup_rejects_reserved_usernames() {
    let (app, state) = app();
    let body = format!(
        "name=Imposter&username=site_Admin&email=imp@example.com\
         &password={PASSWORD}&confirm={PASSWORD}&agree_to_tos=on"
    );
    let res = send(&app, "POST", "/signup", Some(&body), None, true).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(state.db.list_users().unwrap().is_empty());
}

// -- Login --

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (app, _) = app();
    signup(&app, "alice_01", "alice@example.com").await;

    let wrong_password = "email=alice@example.com&password=nope-nope-nope";
    let unknown_email = format!("email=ghost@example.com&password={PASSWORD}");

    let mut bodies = Vec::new();
    for body in [wrong_password.to_string(), unknown_email] {
        let res = send(&app, "POST", "/login", Some(&body), None, true).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(session_cookie(&res).is_none());
        bodies.push(body_string(res).await);
    }

    assert!(bodies[0].contains("Email or password is wrong"));
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn login_with_correct_credentials() {
    let (app, _) = app();
    signup(&app, "alice_01", "alice@example.com").await;

    let body = format!("email=alice@example.com&password={PASSWORD}");
    let res = send(&app, "POST", "/login", Some(&body), None, true).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/home");
    assert!(session_cookie(&res).is_some());
}

// -- Posts & comments --

#[tokio::test]
async fn create_and_delete_own_post() {
    let (app, state) = app();
    let alice = signup(&app, "alice_01", "alice@example.com").await;

    let res = send(&app, "POST", "/create-post", Some("text=hello"), Some(&alice), false).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let post = &state.db.list_posts().unwrap()[0];
    assert_eq!(post.text, "hello");

    let path = format!("/delete-post/{}", post.id);
    let res = send(&app, "GET", &path, None, Some(&alice), false).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(state.db.list_posts().unwrap().is_empty());
}

#[tokio::test]
async fn empty_post_is_rejected() {
    let (app, state) = app();
    let alice = signup(&app, "alice_01", "alice@example.com").await;

    let res = send(&app, "POST", "/create-post", Some("text=+++"), Some(&alice), false).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(state.db.list_posts().unwrap().is_empty());
}

#[tokio::test]
async fn cannot_delete_someone_elses_post() {
    let (app, state) = app();
    let alice = signup(&app, "alice_01", "alice@example.com").await;
    let bob = signup(&app, "bobby_99", "bob@example.com").await;

    send(&app, "POST", "/create-post", Some("text=hello"), Some(&alice), false).await;
    let post_id = state.db.list_posts().unwrap()[0].id;

    let path = format!("/delete-post/{post_id}");
    let res = send(&app, "GET", &path, None, Some(&bob), false).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/home");

    // The post survives the attempt.
    assert!(state.db.post_by_id(post_id).unwrap().is_some());
}

#[tokio::test]
async fn comment_ownership_is_enforced() {
    let (app, state) = app();
    let alice = signup(&app, "alice_01", "alice@example.com").await;
    let bob = signup(&app, "bobby_99", "bob@example.com").await;

    send(&app, "POST", "/create-post", Some("text=hello"), Some(&alice), false).await;
    let post_id = state.db.list_posts().unwrap()[0].id;

    let path = format!("/post-comment/{post_id}");
    send(&app, "POST", &path, Some("text=nice+post"), Some(&alice), false).await;
    let comment_id = state.db.list_comments().unwrap()[0].id;

    let path = format!("/delete-comment/{comment_id}");
    send(&app, "GET", &path, None, Some(&bob), false).await;
    assert!(state.db.comment_by_id(comment_id).unwrap().is_some());

    send(&app, "GET", &path, None, Some(&alice), false).await;
    assert!(state.db.comment_by_id(comment_id).unwrap().is_none());
}

#[tokio::test]
async fn unknown_user_page_redirects_home() {
    let (app, _) = app();
    let alice = signup(&app, "alice_01", "alice@example.com").await;

    let res = send(&app, "GET", "/user/nobody_here", None, Some(&alice), false).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/home");
}

// -- Likes --

#[tokio::test]
async fn like_toggle_round_trips() {
    let (app, state) = app();
    let alice = signup(&app, "alice_01", "alice@example.com").await;
    let bob = signup(&app, "bobby_99", "bob@example.com").await;

    send(&app, "POST", "/create-post", Some("text=hello"), Some(&alice), false).await;
    let post_id = state.db.list_posts().unwrap()[0].id;
    let path = format!("/like-post/{post_id}");

    let res = send(&app, "POST", &path, None, Some(&bob), false).await;
    assert_eq!(res.status(), StatusCode::OK);
    let reply: LikeResponse = serde_json::from_str(&body_string(res).await).unwrap();
    assert_eq!((reply.likes, reply.liked), (1, true));

    let res = send(&app, "POST", &path, None, Some(&bob), false).await;
    let reply: LikeResponse = serde_json::from_str(&body_string(res).await).unwrap();
    assert_eq!((reply.likes, reply.liked), (0, false));
}

#[tokio::test]
async fn liking_a_missing_post_is_404() {
    let (app, _) = app();
    let alice = signup(&app, "alice_01", "alice@example.com").await;

    let res = send(&app, "POST", "/like-post/999", None, Some(&alice), false).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// -- Account deletion --

#[tokio::test]
async fn delete_account_requires_matching_credentials() {
    let (app, state) = app();
    let alice = signup(&app, "alice_01", "alice@example.com").await;

    let body = "email=alice@example.com&password=wrong-wrong-wrong";
    let res = send(&app, "POST", "/delete", Some(body), Some(&alice), false).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(state.db.user_by_username("alice_01").unwrap().is_some());

    // Someone else's email does not work either, even with its password.
    signup(&app, "bobby_99", "bob@example.com").await;
    let body = format!("email=bob@example.com&password={PASSWORD}");
    let res = send(&app, "POST", "/delete", Some(&body), Some(&alice), false).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(state.db.list_users().unwrap().len(), 2);
}

#[tokio::test]
async fn delete_account_cascades_everything() {
    let (app, state) = app();
    let alice = signup(&app, "alice_01", "alice@example.com").await;
    let bob = signup(&app, "bobby_99", "bob@example.com").await;

    send(&app, "POST", "/create-post", Some("text=hello"), Some(&alice), false).await;
    let post_id = state.db.list_posts().unwrap()[0].id;

    // Bob engages with Alice's post.
    let path = format!("/post-comment/{post_id}");
    send(&app, "POST", &path, Some("text=nice"), Some(&bob), false).await;
    let path = format!("/like-post/{post_id}");
    send(&app, "POST", &path, None, Some(&alice), false).await;

    let body = format!("email=alice@example.com&password={PASSWORD}");
    let res = send(&app, "POST", "/delete", Some(&body), Some(&alice), false).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    assert!(state.db.user_by_username("alice_01").unwrap().is_none());
    assert!(state.db.list_posts().unwrap().is_empty());
    assert!(state.db.list_comments().unwrap().is_empty());
    assert!(state.db.list_likes().unwrap().is_empty());
    assert!(state.db.user_by_username("bobby_99").unwrap().is_some());

    // The stale session token no longer restores a user.
    let res = send(&app, "GET", "/home", None, Some(&alice), false).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

// -- Admin --

#[tokio::test]
async fn admin_surface_redirects_non_admins_home() {
    let (app, state) = app();

    // Anonymous visitors are sent home, not challenged.
    let res = send(&app, "GET", "/admin", None, None, false).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/home");

    let alice = signup(&app, "alice_01", "alice@example.com").await;
    let res = send(&app, "GET", "/admin", None, Some(&alice), false).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/home");

    // Promote Alice and the same session gets through.
    let id = state.db.user_by_username("alice_01").unwrap().unwrap().id;
    state.db.update_user(id, "Test User", "admin").unwrap();
    let res = send(&app, "GET", "/admin", None, Some(&alice), false).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_edit_and_delete_are_explicit_per_entity() {
    let (app, state) = app();
    let alice = signup(&app, "alice_01", "alice@example.com").await;
    let id = state.db.user_by_username("alice_01").unwrap().unwrap().id;
    state.db.update_user(id, "Test User", "admin").unwrap();

    send(&app, "POST", "/create-post", Some("text=typo"), Some(&alice), false).await;
    let post_id = state.db.list_posts().unwrap()[0].id;

    let path = format!("/admin/posts/{post_id}/edit");
    let res = send(&app, "POST", &path, Some("text=fixed"), Some(&alice), false).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.db.post_by_id(post_id).unwrap().unwrap().text, "fixed");

    let path = format!("/admin/posts/{post_id}/delete");
    send(&app, "POST", &path, Some(""), Some(&alice), false).await;
    assert!(state.db.post_by_id(post_id).unwrap().is_none());

    // Unknown roles leave the user row untouched.
    let path = format!("/admin/users/{id}/edit");
    send(&app, "POST", &path, Some("name=Root&role=superuser"), Some(&alice), false).await;
    let user = state.db.user_by_id(id).unwrap().unwrap();
    assert_eq!(user.role, "admin");
    assert_eq!(user.name, "Test User");
}
