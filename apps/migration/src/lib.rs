//! Postboard schema migrations.

pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_users;
mod m20240601_000002_create_posts;
mod m20240601_000003_create_post_files;
mod m20240601_000004_create_post_reactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users::Migration),
            Box::new(m20240601_000002_create_posts::Migration),
            Box::new(m20240601_000003_create_post_files::Migration),
            Box::new(m20240601_000004_create_post_reactions::Migration),
        ]
    }
}
