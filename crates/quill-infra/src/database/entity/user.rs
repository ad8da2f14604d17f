//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub image_file: String,
    pub about_me: Option<String>,
    pub last_seen: DateTimeWithTimeZone,
    pub admin: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for quill_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            image_file: model.image_file,
            about_me: model.about_me,
            last_seen: model.last_seen.into(),
            admin: model.admin,
            created_at: model.created_at.into(),
        }
    }
}

impl From<quill_core::domain::User> for ActiveModel {
    fn from(user: quill_core::domain::User) -> Self {
        Self {
            id: Set(user.id),
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            image_file: Set(user.image_file),
            about_me: Set(user.about_me),
            last_seen: Set(user.last_seen.into()),
            admin: Set(user.admin),
            created_at: Set(user.created_at.into()),
        }
    }
}

impl From<&Model> for quill_core::domain::Author {
    fn from(model: &Model) -> Self {
        Self {
            id: model.id,
            username: model.username.clone(),
            image_file: model.image_file.clone(),
        }
    }
}
