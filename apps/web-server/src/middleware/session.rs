//! Cookie-backed server-side sessions.
//!
//! The `quill_session` cookie holds a signed token naming a record in the
//! [`SessionStore`]. The middleware loads that record before the handler runs,
//! resolves the logged-in user into [`CurrentUser`], and writes the record
//! back (re-issuing the cookie) afterwards.

use std::cell::RefCell;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, web};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use quill_core::ports::{Flash, FlashLevel, SessionRecord};

use super::auth::CurrentUser;
use super::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "quill_session";

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

struct SessionInner {
    id: String,
    record: SessionRecord,
    changed: bool,
    /// Ids given up by rotation; their records are destroyed on write-back.
    retired: Vec<String>,
}

/// The visitor's session for the current request.
#[derive(Clone)]
pub struct Session(Rc<RefCell<SessionInner>>);

impl Session {
    fn new(id: String, record: SessionRecord, changed: bool) -> Self {
        Self(Rc::new(RefCell::new(SessionInner {
            id,
            record,
            changed,
            retired: Vec::new(),
        })))
    }

    fn fresh() -> Self {
        Self::new(new_session_id(), SessionRecord::default(), false)
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.0.borrow().record.user_id
    }

    fn rotate(inner: &mut SessionInner) {
        let old = std::mem::replace(&mut inner.id, new_session_id());
        inner.retired.push(old);
        inner.record.csrf_token = None;
        inner.changed = true;
    }

    /// Bind `user_id` to a new session id; pending flashes carry over.
    pub fn log_in(&self, user_id: Uuid, remember: bool) {
        let mut inner = self.0.borrow_mut();
        Self::rotate(&mut inner);
        inner.record.user_id = Some(user_id);
        inner.record.remember = remember;
    }

    pub fn log_out(&self) {
        let mut inner = self.0.borrow_mut();
        Self::rotate(&mut inner);
        inner.record.user_id = None;
        inner.record.remember = false;
    }

    /// Drop a user that no longer exists.
    fn forget_user(&self) {
        let mut inner = self.0.borrow_mut();
        inner.record.user_id = None;
        inner.record.remember = false;
        inner.changed = true;
    }

    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        let mut inner = self.0.borrow_mut();
        inner.record.flashes.push(Flash {
            level,
            message: message.into(),
        });
        inner.changed = true;
    }

    /// Messages queued for display; they are shown once.
    pub fn take_flashes(&self) -> Vec<Flash> {
        let mut inner = self.0.borrow_mut();
        if inner.record.flashes.is_empty() {
            return Vec::new();
        }
        inner.changed = true;
        std::mem::take(&mut inner.record.flashes)
    }

    /// This session's CSRF token, created on first use.
    pub fn csrf_token(&self) -> String {
        let mut inner = self.0.borrow_mut();
        if let Some(token) = &inner.record.csrf_token {
            return token.clone();
        }
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        inner.record.csrf_token = Some(token.clone());
        inner.changed = true;
        token
    }

    pub fn verify_csrf(&self, submitted: &str) -> bool {
        let inner = self.0.borrow();
        match &inner.record.csrf_token {
            Some(expected) if !submitted.is_empty() => {
                bool::from(expected.as_bytes().ct_eq(submitted.as_bytes()))
            }
            _ => false,
        }
    }

    /// Reject the request unless the form echoed this session's token.
    pub fn require_csrf(&self, submitted: &str) -> Result<(), AppError> {
        if self.verify_csrf(submitted) {
            Ok(())
        } else {
            tracing::warn!("Rejected form post with missing or invalid CSRF token");
            Err(AppError::BadRequest(
                "The CSRF token is missing or invalid.".to_string(),
            ))
        }
    }
}

impl FromRequest for Session {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(req.extensions().get::<Session>().cloned().ok_or_else(|| {
            AppError::Internal("SessionMiddleware is not installed".to_string())
        }))
    }
}

/// Session middleware factory.
pub struct SessionMiddleware;

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                tracing::error!("AppState missing; sessions disabled for this request");
                return service.call(req).await;
            };

            let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
            let session = restore(&state, token.as_deref()).await;

            let mut current = None;
            if let Some(user_id) = session.user_id() {
                match state.accounts().resume(user_id).await {
                    Ok(Some(user)) => current = Some(user),
                    Ok(None) => {
                        tracing::info!(user_id = %user_id, "Session names a deleted user");
                        session.forget_user();
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to resolve session user"),
                }
            }

            req.extensions_mut().insert(session.clone());
            req.extensions_mut().insert(CurrentUser(current));

            let mut res = service.call(req).await?;
            if let Some(cookie) = write_back(&state, &session).await {
                if let Err(e) = res.response_mut().add_cookie(&cookie) {
                    tracing::error!(error = %e, "Failed to set session cookie");
                }
            }
            Ok(res)
        })
    }
}

/// Load the session named by the cookie, or start an empty one.
///
/// Store failures are logged and treated as "no session".
async fn restore(state: &AppState, token: Option<&str>) -> Session {
    let Some(token) = token else {
        return Session::fresh();
    };
    let session_id = match state.tokens.verify(token) {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session cookie");
            return Session::fresh();
        }
    };
    match state.sessions.load(&session_id).await {
        Ok(Some(record)) => Session::new(session_id, record, false),
        Ok(None) => Session::fresh(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load session");
            Session::fresh()
        }
    }
}

/// Persist the session and build the cookie to send, if any.
///
/// Unchanged anonymous sessions are not written. Logged-in sessions are
/// written every request so their expiry slides.
async fn write_back(state: &AppState, session: &Session) -> Option<Cookie<'static>> {
    let (id, record, changed, retired) = {
        let mut inner = session.0.borrow_mut();
        (
            inner.id.clone(),
            inner.record.clone(),
            inner.changed,
            std::mem::take(&mut inner.retired),
        )
    };

    for old in retired {
        if let Err(e) = state.sessions.destroy(&old).await {
            tracing::warn!(error = %e, "Failed to destroy rotated session");
        }
    }

    if !changed && record.user_id.is_none() {
        return None;
    }

    let lifetime: Duration = if record.remember {
        state.settings.remember_for
    } else {
        state.settings.session_ttl
    };

    if let Err(e) = state.sessions.save(&id, &record, lifetime).await {
        tracing::error!(error = %e, "Failed to save session");
        return None;
    }

    let token = match state.tokens.issue(&id, lifetime) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to sign session cookie");
            return None;
        }
    };

    let mut cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.settings.cookie_secure)
        .finish();
    if record.remember {
        cookie.set_max_age(time::Duration::seconds(lifetime.as_secs() as i64));
    }
    Some(cookie)
}
