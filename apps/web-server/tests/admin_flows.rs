#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;

use common::{Jar, body_string, location, register, register_admin, test_state};

#[actix_web::test]
async fn anonymous_admin_visit_redirects_to_login() {
    let state = test_state();
    let app = test_app!(state);
    let mut jar = Jar::default();

    let resp = send!(app, jar, TestRequest::get().uri("/admin/users/"));
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login?next=/admin/users/");
}

#[actix_web::test]
async fn non_admin_is_forbidden() {
    let state = test_state();
    register(&state, "alice").await;
    let app = test_app!(state);
    let mut jar = Jar::default();
    log_in!(app, jar, "alice@example.com", false);

    let resp = send!(app, jar, TestRequest::get().uri("/admin/"));
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = send!(app, jar, TestRequest::get().uri("/admin/posts/"));
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn dashboard_and_user_list_for_admins() {
    let state = test_state();
    register_admin(&state, "root").await;
    register(&state, "alice").await;
    let app = test_app!(state);
    let mut jar = Jar::default();
    log_in!(app, jar, "root@example.com", false);

    let resp = send!(app, jar, TestRequest::get().uri("/admin/"));
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send!(app, jar, TestRequest::get().uri("/admin/users/?search=ali"));
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("alice@example.com"));
    assert!(!html.contains("root@example.com"));
    assert!(!html.contains("argon2"), "password hashes never reach the page");
}

#[actix_web::test]
async fn new_user_form_starts_without_admin_flag() {
    let state = test_state();
    register_admin(&state, "root").await;
    let app = test_app!(state);
    let mut jar = Jar::default();
    log_in!(app, jar, "root@example.com", false);

    let resp = send!(app, jar, TestRequest::get().uri("/admin/users/new"));
    let html = body_string(resp).await;
    assert!(html.contains(r#"name="admin""#));
    assert!(!html.contains("checked"));
}

#[actix_web::test]
async fn mismatched_confirmation_leaves_user_untouched() {
    let state = test_state();
    register_admin(&state, "root").await;
    let alice = register(&state, "alice").await;
    let app = test_app!(state);
    let mut jar = Jar::default();
    log_in!(app, jar, "root@example.com", false);

    let edit_url = format!("/admin/users/edit/{}", alice.id);
    let token = csrf_for!(app, jar, &edit_url);
    let resp = send!(
        app,
        jar,
        TestRequest::post().uri(&edit_url).set_form([
            ("username", "renamed"),
            ("email", "alice@example.com"),
            ("about_me", ""),
            ("admin", "y"),
            ("new_password", "brandnew1"),
            ("confirm", "different1"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Passwords must match"));

    let stored = state.users.find_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, alice.password_hash);
    assert_eq!(stored.username, "alice");
    assert!(!stored.admin);
}

#[actix_web::test]
async fn matching_new_password_is_rehashed() {
    let state = test_state();
    register_admin(&state, "root").await;
    let alice = register(&state, "alice").await;
    let app = test_app!(state);
    let mut jar = Jar::default();
    log_in!(app, jar, "root@example.com", false);

    let edit_url = format!("/admin/users/edit/{}", alice.id);
    let token = csrf_for!(app, jar, &edit_url);
    let resp = send!(
        app,
        jar,
        TestRequest::post().uri(&edit_url).set_form([
            ("username", "alice"),
            ("email", "alice@example.com"),
            ("new_password", "brandnew1"),
            ("confirm", "brandnew1"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(location(&resp), "/admin/users/");

    let stored = state.users.find_by_id(alice.id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, alice.password_hash);
}

#[actix_web::test]
async fn admin_cannot_delete_themselves() {
    let state = test_state();
    let root = register_admin(&state, "root").await;
    let app = test_app!(state);
    let mut jar = Jar::default();
    log_in!(app, jar, "root@example.com", false);

    let token = csrf_for!(app, jar, "/admin/users/");
    let resp = send!(
        app,
        jar,
        TestRequest::post()
            .uri(&format!("/admin/users/delete/{}", root.id))
            .set_form([("csrf_token", token.as_str())])
    );
    assert_eq!(location(&resp), "/admin/users/");
    assert!(state.users.find_by_id(root.id).await.unwrap().is_some());
}

#[actix_web::test]
async fn deleting_a_user_removes_their_posts() {
    let state = test_state();
    register_admin(&state, "root").await;
    let alice = register(&state, "alice").await;
    state
        .post_service()
        .create(&alice, quill_core::services::PostDraft::new("Bye", "soon gone"))
        .await
        .unwrap();
    let app = test_app!(state);
    let mut jar = Jar::default();
    log_in!(app, jar, "root@example.com", false);

    let token = csrf_for!(app, jar, "/admin/users/");
    let resp = send!(
        app,
        jar,
        TestRequest::post()
            .uri(&format!("/admin/users/delete/{}", alice.id))
            .set_form([("csrf_token", token.as_str())])
    );
    assert_eq!(location(&resp), "/admin/users/");
    assert!(state.users.find_by_id(alice.id).await.unwrap().is_none());
    assert_eq!(state.posts.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn admin_files_post_under_another_author() {
    let state = test_state();
    register_admin(&state, "root").await;
    let alice = register(&state, "alice").await;
    let app = test_app!(state);
    let mut jar = Jar::default();
    log_in!(app, jar, "root@example.com", false);

    let token = csrf_for!(app, jar, "/admin/posts/new");
    let resp = send!(
        app,
        jar,
        TestRequest::post().uri("/admin/posts/new").set_form([
            ("title", "Guest post"),
            ("body", "Written for alice"),
            ("author_id", alice.id.to_string().as_str()),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(location(&resp), "/admin/posts/");

    let resp = send!(
        app,
        jar,
        TestRequest::post().uri("/admin/posts/new").set_form([
            ("title", "Orphan"),
            ("body", "Nobody wrote this"),
            ("author_id", "not-a-user"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Not a valid choice"));

    let page = state.post_service().list(Some("Guest"), 1).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].author.id, alice.id);
}
