#![allow(dead_code)]

use blogly_service::{Mutation, PostParams, TagParams, TagRef, UserParams};
use entity::{post, tag, user};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub async fn setup() -> DatabaseConnection {
    // One connection, or every pooled connection would see its own empty database.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn user_params(first_name: &str, last_name: &str) -> UserParams {
    UserParams {
        first_name: Some(first_name.to_owned()),
        last_name: Some(last_name.to_owned()),
        image_url: None,
    }
}

pub fn post_params(title: &str, content: &str, tags: &[i32]) -> PostParams {
    PostParams {
        title: Some(title.to_owned()),
        content: Some(content.to_owned()),
        tags: Some(tags.iter().copied().map(TagRef::from).collect()),
    }
}

pub async fn create_user(db: &DatabaseConnection) -> user::Model {
    Mutation::create_user(db, user_params("Alan", "Alda"))
        .await
        .unwrap()
}

pub async fn create_tag(db: &DatabaseConnection, name: &str) -> tag::Model {
    Mutation::create_tag(
        db,
        TagParams {
            name: Some(name.to_owned()),
        },
    )
    .await
    .unwrap()
}

pub async fn create_post(db: &DatabaseConnection, user_id: i32, tags: &[i32]) -> post::Model {
    Mutation::create_post(db, user_id, post_params("First Post", "Hello!", tags))
        .await
        .unwrap()
}

pub fn tag_ids(tags: &[tag::Model]) -> Vec<i32> {
    let mut ids: Vec<i32> = tags.iter().map(|tag| tag.id).collect();
    ids.sort_unstable();
    ids
}
