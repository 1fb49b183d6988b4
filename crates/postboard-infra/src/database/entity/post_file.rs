//! Post attachment entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{FromQueryResult, NotSet, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub post_id: i32,
    pub file_name: String,
    pub file_type: String,
    pub file_content: Vec<u8>,
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
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Attachment row without its content, size computed by the database.
#[derive(Debug, FromQueryResult)]
pub struct InfoRow {
    pub id: i32,
    pub post_id: i32,
    pub file_name: String,
    pub file_type: String,
    pub size: i64,
}

impl From<InfoRow> for postboard_core::domain::PostFileInfo {
    fn from(row: InfoRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            file_name: row.file_name,
            file_type: row.file_type,
            size: row.size.max(0) as u64,
        }
    }
}

impl From<Model> for postboard_core::domain::PostFile {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            file_name: model.file_name,
            file_type: model.file_type,
            file_content: model.file_content,
            created_at: model.created_at.into(),
        }
    }
}

impl From<postboard_core::domain::PostFile> for ActiveModel {
    fn from(file: postboard_core::domain::PostFile) -> Self {
        Self {
            id: if file.id > 0 { Set(file.id) } else { NotSet },
            post_id: Set(file.post_id),
            file_name: Set(file.file_name),
            file_type: Set(file.file_type),
            file_content: Set(file.file_content),
            created_at: Set(file.created_at.into()),
        }
    }
}
