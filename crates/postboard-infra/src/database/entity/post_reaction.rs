//! Like/dislike entity for SeaORM. One row per (user, post).

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use postboard_core::domain::{Reaction, ReactionKind};
use postboard_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post_reactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: i32,
    /// `like` or `dislike`.
    pub kind: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Reaction {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = ReactionKind::parse(&model.kind)
            .ok_or_else(|| RepoError::Query(format!("unknown reaction kind '{}'", model.kind)))?;

        Ok(Self {
            user_id: model.user_id,
            post_id: model.post_id,
            kind,
            created_at: model.created_at.into(),
        })
    }
}

impl From<Reaction> for ActiveModel {
    fn from(reaction: Reaction) -> Self {
        Self {
            user_id: Set(reaction.user_id),
            post_id: Set(reaction.post_id),
            kind: Set(reaction.kind.as_str().to_string()),
            created_at: Set(reaction.created_at.into()),
        }
    }
}
