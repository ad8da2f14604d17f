#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;

use quill_core::services::PostDraft;

use common::{Jar, body_string, location, register, test_state};

#[actix_web::test]
async fn posts_listing_requires_login() {
    let state = test_state();
    let app = test_app!(state);
    let mut jar = Jar::default();

    let resp = send!(app, jar, TestRequest::get().uri("/posts?q=fox"));
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login?next=/posts%3Fq%3Dfox");
}

#[actix_web::test]
async fn search_finds_a_term_that_only_appears_in_the_body() {
    let state = test_state();
    let alice = register(&state, "alice").await;
    let posts = state.post_service();
    posts
        .create(&alice, PostDraft::new("Fox tale", "the quick brown fox jumps"))
        .await
        .unwrap();
    posts
        .create(&alice, PostDraft::new("Cat story", "a sleepy cat"))
        .await
        .unwrap();

    let app = test_app!(state);
    let mut jar = Jar::default();
    log_in!(app, jar, "alice@example.com", false);

    let resp = send!(app, jar, TestRequest::get().uri("/posts?q=brown"));
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Fox tale"));
    assert!(!html.contains("Cat story"));

    let resp = send!(app, jar, TestRequest::get().uri("/posts?page=abc"));
    let html = body_string(resp).await;
    assert!(html.contains("Fox tale") && html.contains("Cat story"));
}

#[actix_web::test]
async fn author_creates_edits_and_deletes_a_post() {
    let state = test_state();
    register(&state, "alice").await;
    let app = test_app!(state);
    let mut jar = Jar::default();
    log_in!(app, jar, "alice@example.com", false);

    let token = csrf_for!(app, jar, "/create_post");
    let resp = send!(
        app,
        jar,
        TestRequest::post().uri("/create_post").set_form([
            ("title", "First"),
            ("body", "Hello world"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(resp.status(), StatusCode::FOUND);
    let post_url = location(&resp);
    let id = post_url.trim_start_matches("/post/").to_string();

    let resp = send!(app, jar, TestRequest::get().uri(&post_url));
    let html = body_string(resp).await;
    assert!(html.contains("Post created successfully"));
    assert!(html.contains("Hello world"));

    let edit_url = format!("/edit_post/{id}");
    let token = csrf_for!(app, jar, &edit_url);
    let resp = send!(
        app,
        jar,
        TestRequest::post().uri(&edit_url).set_form([
            ("title", "First, revised"),
            ("body", "Hello again"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(location(&resp), post_url);

    let post = state
        .posts
        .find_by_id(id.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(post.title, "First, revised");
    assert!(post.updated_at >= post.created_at);

    let resp = send!(
        app,
        jar,
        TestRequest::post()
            .uri(&format!("/delete_post/{id}"))
            .set_form([("csrf_token", token.as_str())])
    );
    assert_eq!(location(&resp), "/posts");
    assert_eq!(state.posts.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn blank_post_is_rerendered_with_errors() {
    let state = test_state();
    register(&state, "alice").await;
    let app = test_app!(state);
    let mut jar = Jar::default();
    log_in!(app, jar, "alice@example.com", false);

    let token = csrf_for!(app, jar, "/create_post");
    let resp = send!(
        app,
        jar,
        TestRequest::post().uri("/create_post").set_form([
            ("title", "  "),
            ("body", "text"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("This field is required."));
    assert_eq!(state.posts.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn non_author_cannot_edit_or_delete() {
    let state = test_state();
    let alice = register(&state, "alice").await;
    register(&state, "bobby").await;
    let post = state
        .post_service()
        .create(&alice, PostDraft::new("Mine", "Original body"))
        .await
        .unwrap();

    let app = test_app!(state);
    let mut jar = Jar::default();
    log_in!(app, jar, "bobby@example.com", false);

    let edit_url = format!("/edit_post/{}", post.id);
    let resp = send!(app, jar, TestRequest::get().uri(&edit_url));
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let token = csrf_for!(app, jar, "/create_post");
    let resp = send!(
        app,
        jar,
        TestRequest::post().uri(&edit_url).set_form([
            ("title", "Hijacked"),
            ("body", "Changed"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let resp = send!(
        app,
        jar,
        TestRequest::post()
            .uri(&format!("/delete_post/{}", post.id))
            .set_form([("csrf_token", token.as_str())])
    );
    assert_eq!(location(&resp), "/");

    let stored = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Mine");
    assert_eq!(stored.body, "Original body");
    assert_eq!(stored.updated_at, post.updated_at);
}

#[actix_web::test]
async fn unknown_post_is_not_found() {
    let state = test_state();
    let app = test_app!(state);
    let mut jar = Jar::default();

    let resp = send!(
        app,
        jar,
        TestRequest::get().uri(&format!("/post/{}", uuid::Uuid::new_v4()))
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send!(app, jar, TestRequest::get().uri("/post/not-an-id"));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
