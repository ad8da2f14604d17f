//! The logged-in user's profile page.

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpResponse, web};
use futures::TryStreamExt;

use quill_core::DomainError;
use quill_core::domain::User;
use quill_core::ports::FlashLevel;
use quill_core::services::Picture;
use quill_core::validation::FieldErrors;
use quill_shared::UserView;
use quill_shared::forms::AccountForm;

use crate::middleware::{AppError, AppResult, AuthUser, CurrentUser, Session};
use crate::state::AppState;
use crate::views;

const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;
const MAX_TEXT_BYTES: usize = 64 * 1024;

fn account_page(
    session: &Session,
    current: &CurrentUser,
    user: &User,
    form: &AccountForm,
    errors: &FieldErrors,
) -> AppResult<HttpResponse> {
    let mut ctx = views::page("Account", session, current);
    views::with_form(&mut ctx, form, errors);
    ctx.insert("user", &UserView::from(user));
    views::render("account.html", &ctx)
}

/// GET /account
pub async fn show(
    session: Session,
    current: CurrentUser,
    AuthUser(user): AuthUser,
) -> AppResult<HttpResponse> {
    let form = AccountForm {
        username: user.username.clone(),
        email: user.email.clone(),
        about_me: user.about_me.clone().unwrap_or_default(),
        ..AccountForm::default()
    };
    account_page(&session, &current, &user, &form, &FieldErrors::new())
}

/// POST /account (multipart/form-data)
pub async fn update(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    AuthUser(user): AuthUser,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let (form, picture) = read_account_form(payload).await?;
    session.require_csrf(&form.csrf_token)?;

    match state
        .accounts()
        .update_profile(&user, (&form).into(), picture)
        .await
    {
        Ok(_) => {
            session.flash(FlashLevel::Success, "Your account has been updated!");
            Ok(views::redirect("/account"))
        }
        Err(DomainError::Invalid(errors)) => account_page(&session, &current, &user, &form, &errors),
        Err(e) => Err(e.into()),
    }
}

async fn read_account_form(
    mut payload: Multipart,
) -> AppResult<(AccountForm, Option<Picture>)> {
    let mut form = AccountForm::default();
    let mut picture = None;

    while let Some(field) = payload.try_next().await.map_err(bad_multipart)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "picture" {
            let file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string)
                .unwrap_or_default();
            let bytes = read_field(field, MAX_PICTURE_BYTES).await?;
            // An empty file input still submits a nameless part.
            if !file_name.is_empty() && !bytes.is_empty() {
                picture = Some(Picture { file_name, bytes });
            }
        } else {
            let bytes = read_field(field, MAX_TEXT_BYTES).await?;
            let value = String::from_utf8(bytes)
                .map_err(|_| AppError::BadRequest(format!("Field {name} is not valid UTF-8.")))?;
            form.set(&name, value);
        }
    }
    Ok((form, picture))
}

async fn read_field(mut field: Field, limit: usize) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
        if data.len() + chunk.len() > limit {
            return Err(AppError::BadRequest("The uploaded data is too large.".to_string()));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn bad_multipart(err: MultipartError) -> AppError {
    tracing::debug!(error = %err, "Malformed multipart body");
    AppError::BadRequest("The submitted form could not be read.".to_string())
}
