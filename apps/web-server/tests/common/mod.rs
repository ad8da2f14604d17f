//! Shared helpers for the HTTP flow tests.
#![allow(dead_code, unused_macros)]

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test::{self, TestRequest};
use uuid::Uuid;

use quill_core::domain::User;
use quill_core::services::{AdminUserCreate, Registration};
use quill_infra::JwtConfig;
use web_server::AppState;
use web_server::config::Settings;
use web_server::middleware::SESSION_COOKIE;

pub const PASSWORD: &str = "secret123";

/// Fresh in-memory application state.
pub fn test_state() -> AppState {
    let settings = Settings {
        media_root: std::env::temp_dir().join(format!("quill-test-{}", Uuid::new_v4().simple())),
        ..Settings::default()
    };
    AppState::in_memory(settings, JwtConfig::default())
}

pub async fn register(state: &AppState, username: &str) -> User {
    state
        .accounts()
        .register(Registration {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: PASSWORD.to_string(),
            password2: PASSWORD.to_string(),
        })
        .await
        .expect("registration succeeds")
}

pub async fn register_admin(state: &AppState, username: &str) -> User {
    state
        .user_admin()
        .create(AdminUserCreate {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: PASSWORD.to_string(),
            password2: PASSWORD.to_string(),
            about_me: None,
            admin: true,
        })
        .await
        .expect("admin creation succeeds")
}

/// The browser side of a session: whatever `quill_session` cookie the server
/// last handed out.
#[derive(Debug, Default, Clone)]
pub struct Jar(Option<Cookie<'static>>);

impl Jar {
    pub fn apply(&self, req: TestRequest) -> TestRequest {
        match &self.0 {
            Some(cookie) => req.cookie(cookie.clone()),
            None => req,
        }
    }

    pub fn store<B>(&mut self, resp: &ServiceResponse<B>) {
        if let Some(cookie) = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
        {
            self.0 = Some(cookie.into_owned());
        }
    }

    pub fn cookie(&self) -> Option<&Cookie<'static>> {
        self.0.as_ref()
    }
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body_string<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// The hidden `csrf_token` value of the first form on a page.
pub fn csrf_token(html: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker).expect("page has a CSRF field") + marker.len();
    let end = html[start..].find('"').expect("closing quote") + start;
    html[start..end].to_string()
}

/// Build the application service around `state`.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(web_server::SessionMiddleware)
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure(web_server::configure_routes),
        )
        .await
    };
}

/// Send a request with the jar's cookie and keep any cookie handed back.
macro_rules! send {
    ($app:expr, $jar:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $jar.apply($req).to_request()).await;
        $jar.store(&resp);
        resp
    }};
}

/// The CSRF token rendered on `uri` for this jar's session.
macro_rules! csrf_for {
    ($app:expr, $jar:expr, $uri:expr) => {{
        let resp = send!($app, $jar, actix_web::test::TestRequest::get().uri($uri));
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK, "GET {}", $uri);
        common::csrf_token(&common::body_string(resp).await)
    }};
}

/// Log in through the login form.
macro_rules! log_in {
    ($app:expr, $jar:expr, $email:expr, $remember:expr) => {
        log_in!($app, $jar, $email, $remember, "/login")
    };
    ($app:expr, $jar:expr, $email:expr, $remember:expr, $uri:expr) => {{
        let token = csrf_for!($app, $jar, "/login");
        let mut form = vec![
            ("email", $email.to_string()),
            ("password", common::PASSWORD.to_string()),
            ("csrf_token", token),
        ];
        if $remember {
            form.push(("remember", "y".to_string()));
        }
        send!(
            $app,
            $jar,
            actix_web::test::TestRequest::post().uri($uri).set_form(&form)
        )
    }};
}
