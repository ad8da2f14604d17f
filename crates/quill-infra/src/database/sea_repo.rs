//! SeaORM repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use quill_core::domain::{AuthoredPost, Page, PageRequest, Post, User, masked_email};
use quill_core::error::RepoError;
use quill_core::ports::{PostRepository, UserFilter, UserRepository, UserSort};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::sea_base::{SeaBaseRepository, fetch_clamped, repo_err};

/// SeaORM user repository.
pub type SeaUserRepository = SeaBaseRepository<UserEntity>;

/// SeaORM post repository.
pub type SeaPostRepository = SeaBaseRepository<PostEntity>;

/// `%term%` with LIKE wildcards in `term` matched literally.
fn contains_literal(term: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}

fn authored(post: post::Model, author: Option<user::Model>) -> Option<AuthoredPost> {
    let author = author?;
    Some(AuthoredPost {
        author: (&author).into(),
        post: post.into(),
    })
}

#[async_trait]
impl UserRepository for SeaUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %masked_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn touch_last_seen(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        UserEntity::update_many()
            .col_expr(user::Column::LastSeen, Expr::value(at.fixed_offset()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(())
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, RepoError> {
        let mut query = UserEntity::find();
        if let Some(term) = filter.search.as_deref() {
            query = query.filter(user::Column::Username.like(contains_literal(term)));
        }

        let order = if filter.descending { Order::Desc } else { Order::Asc };
        query = match filter.sort {
            UserSort::Username => query.order_by(user::Column::Username, order),
            UserSort::Admin => query
                .order_by(user::Column::Admin, order)
                .order_by_asc(user::Column::Username),
        };

        let (models, current, total) =
            fetch_clamped(query.paginate(&self.db, page.per_page), page).await?;
        let users = models.into_iter().map(Into::into).collect();
        Ok(Page::new(users, current, page.per_page, total))
    }

    async fn all(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for SeaPostRepository {
    async fn find_with_author(&self, id: Uuid) -> Result<Option<AuthoredPost>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.and_then(|(post, author)| authored(post, author)))
    }

    async fn search(
        &self,
        term: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<AuthoredPost>, RepoError> {
        let mut query = PostEntity::find().find_also_related(UserEntity);
        if let Some(term) = term {
            query = query.filter(
                Condition::any()
                    .add(post::Column::Title.like(contains_literal(term)))
                    .add(post::Column::Body.like(contains_literal(term))),
            );
        }
        let query = query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id);

        let (rows, current, total) =
            fetch_clamped(query.paginate(&self.db, page.per_page), page).await?;
        let posts = rows
            .into_iter()
            .filter_map(|(post, author)| authored(post, author))
            .collect();
        Ok(Page::new(posts, current, page.per_page, total))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
