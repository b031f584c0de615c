pub mod common;

use blogly_service::{Mutation, PostParams, Query, Resource, ServiceError, TagRef};
use common::*;
use entity::prelude::{Post, PostTag};
use entity::post_tag;
use pretty_assertions::assert_eq;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[tokio::test]
async fn create_post_with_tags() {
    let db = &setup().await;
    let user = create_user(db).await;
    let rust = create_tag(db, "rust").await;
    let web = create_tag(db, "web").await;

    let post = Mutation::create_post(
        db,
        user.id,
        PostParams {
            title: Some("  Hello ".to_owned()),
            content: Some("World".to_owned()),
            tags: Some(vec![TagRef::Id(rust.id.into()), TagRef::Text(web.id.to_string())]),
        },
    )
    .await
    .unwrap();

    assert_eq!(post.title, "Hello");
    assert_eq!(post.user_id, user.id);
    assert_eq!(post.created_at, post.updated_at);

    let view = Query::find_post_by_id(db, post.id).await.unwrap().unwrap();
    assert_eq!(view.post, post);
    assert_eq!(tag_ids(&view.tags), vec![rust.id, web.id]);
}

#[tokio::test]
async fn create_post_with_unknown_tag_creates_nothing() {
    let db = &setup().await;
    let user = create_user(db).await;
    let tag = create_tag(db, "rust").await;
    assert_eq!(tag.id, 1);

    let err = Mutation::create_post(db, user.id, post_params("T", "C", &[1, 2]))
        .await
        .unwrap_err();

    match err {
        ServiceError::Validation(errors) => {
            assert_eq!(errors, vec!["Invalid tag ID 2".to_owned()])
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(Post::find().count(db).await.unwrap(), 0);
    assert_eq!(PostTag::find().count(db).await.unwrap(), 0);
}

#[tokio::test]
async fn create_post_reports_every_problem() {
    let db = &setup().await;
    let user = create_user(db).await;

    let err = Mutation::create_post(
        db,
        user.id,
        PostParams {
            title: Some(" ".to_owned()),
            content: None,
            tags: Some(vec![TagRef::Text("abc".to_owned()), TagRef::Id(5)]),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.messages(),
        vec![
            "title must contain non-whitespace characters".to_owned(),
            "missing parameter: content".to_owned(),
            "Invalid tag ID abc".to_owned(),
            "Invalid tag ID 5".to_owned(),
        ]
    );
}

#[tokio::test]
async fn same_missing_tag_written_twice_is_one_error() {
    let db = &setup().await;
    let user = create_user(db).await;
    let tag = create_tag(db, "rust").await;

    let err = Mutation::create_post(
        db,
        user.id,
        PostParams {
            title: Some("T".to_owned()),
            content: Some("C".to_owned()),
            tags: Some(vec![
                TagRef::Text("9".to_owned()),
                TagRef::Text(" 9 ".to_owned()),
                TagRef::Id(9),
                TagRef::Text(" x".to_owned()),
                TagRef::Text("x ".to_owned()),
                TagRef::Text(format!(" {} ", tag.id)),
                TagRef::Id(tag.id.into()),
            ]),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.messages(),
        vec!["Invalid tag ID 9".to_owned(), "Invalid tag ID x".to_owned()]
    );
    assert_eq!(Post::find().count(db).await.unwrap(), 0);
}

#[tokio::test]
async fn create_post_for_missing_user_is_not_found() {
    let db = &setup().await;

    let err = Mutation::create_post(db, 42, post_params("T", "C", &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::User)));
}

#[tokio::test]
async fn edit_post_reconciles_tags() {
    let db = &setup().await;
    let user = create_user(db).await;
    let t1 = create_tag(db, "one").await;
    let t2 = create_tag(db, "two").await;
    let t3 = create_tag(db, "three").await;
    let post = create_post(db, user.id, &[t1.id, t2.id]).await;

    let edited = Mutation::update_post_by_id(
        db,
        post.id,
        PostParams {
            tags: Some(vec![t2.id.into(), t3.id.into()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(edited.title, post.title);
    assert!(edited.updated_at >= post.updated_at);

    let rows = PostTag::find()
        .filter(post_tag::Column::PostId.eq(post.id))
        .all(db)
        .await
        .unwrap();
    let mut ids: Vec<i32> = rows.iter().map(|row| row.tag_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![t2.id, t3.id]);
}

#[tokio::test]
async fn edit_post_without_tags_key_keeps_tags() {
    let db = &setup().await;
    let user = create_user(db).await;
    let tag = create_tag(db, "rust").await;
    let post = create_post(db, user.id, &[tag.id]).await;

    let edited = Mutation::update_post_by_id(
        db,
        post.id,
        PostParams {
            content: Some("Updated".to_owned()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(edited.content, "Updated");
    let view = Query::find_post_by_id(db, post.id).await.unwrap().unwrap();
    assert_eq!(tag_ids(&view.tags), vec![tag.id]);
}

#[tokio::test]
async fn edit_post_with_nothing_changed_is_a_no_op() {
    let db = &setup().await;
    let user = create_user(db).await;
    let tag = create_tag(db, "rust").await;
    let post = create_post(db, user.id, &[tag.id]).await;

    let unchanged = Mutation::update_post_by_id(db, post.id, PostParams::default())
        .await
        .unwrap();
    assert_eq!(unchanged, post);

    // Same values and the same tag set do not count as an edit either.
    let unchanged = Mutation::update_post_by_id(
        db,
        post.id,
        post_params(" First Post ", "Hello!", &[tag.id]),
    )
    .await
    .unwrap();
    assert_eq!(unchanged, post);

    let view = Query::find_post_by_id(db, post.id).await.unwrap().unwrap();
    assert_eq!(view.post.updated_at, post.updated_at);
}

#[tokio::test]
async fn edit_post_with_bad_tag_changes_nothing() {
    let db = &setup().await;
    let user = create_user(db).await;
    let tag = create_tag(db, "rust").await;
    let post = create_post(db, user.id, &[tag.id]).await;

    let err = Mutation::update_post_by_id(db, post.id, post_params("New", "New", &[77]))
        .await
        .unwrap_err();
    assert_eq!(err.messages(), vec!["Invalid tag ID 77".to_owned()]);

    let view = Query::find_post_by_id(db, post.id).await.unwrap().unwrap();
    assert_eq!(view.post, post);
    assert_eq!(tag_ids(&view.tags), vec![tag.id]);
}

#[tokio::test]
async fn delete_post_removes_associations() {
    let db = &setup().await;
    let user = create_user(db).await;
    let tag = create_tag(db, "rust").await;
    let post = create_post(db, user.id, &[tag.id]).await;

    let deleted = Mutation::delete_post(db, post.id).await.unwrap();
    assert_eq!(deleted.user_id, user.id);

    assert_eq!(Query::find_post_by_id(db, post.id).await.unwrap(), None);
    assert_eq!(PostTag::find().count(db).await.unwrap(), 0);
    assert!(Query::find_tag_by_id(db, tag.id).await.unwrap().is_some());

    let err = Mutation::delete_post(db, post.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Resource::Post)));
}

#[tokio::test]
async fn recent_posts_are_newest_first_and_capped() {
    let db = &setup().await;
    let user = create_user(db).await;
    for _ in 0..7 {
        create_post(db, user.id, &[]).await;
    }

    let recent = Query::find_recent_posts(db, 5).await.unwrap();
    let ids: Vec<i32> = recent.iter().map(|p| p.post.id).collect();
    assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    assert!(recent.iter().all(|p| p.author.as_ref() == Some(&user)));
}

#[tokio::test]
async fn posts_by_user() {
    let db = &setup().await;
    let user = create_user(db).await;
    let other = create_user(db).await;
    let mine = create_post(db, user.id, &[]).await;
    create_post(db, other.id, &[]).await;

    let posts = Query::find_posts_by_user(db, user.id).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].post, mine);
    assert!(posts[0].tags.is_empty());
}
