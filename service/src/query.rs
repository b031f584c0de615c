use ::entity::prelude::{Post, PostTag, Tag, User};
use ::entity::{post, post_tag, tag, user};
use sea_orm::*;
use serde::Serialize;

/// A post together with the tags attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: post::Model,
    pub tags: Vec<tag::Model>,
}

impl From<(post::Model, Vec<tag::Model>)> for PostView {
    fn from((post, tags): (post::Model, Vec<tag::Model>)) -> Self {
        Self { post, tags }
    }
}

/// A post with whoever wrote it, as listed on the homepage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthoredPost {
    #[serde(flatten)]
    pub post: post::Model,
    pub author: Option<user::Model>,
}

pub struct Query;

impl Query {
    pub async fn find_user_by_id(db: &DbConn, id: i32) -> Result<Option<user::Model>, DbErr> {
        User::find_by_id(id).one(db).await
    }

    pub async fn find_users_sorted(db: &DbConn) -> Result<Vec<user::Model>, DbErr> {
        User::find()
            .order_by_asc(user::Column::LastName)
            .order_by_asc(user::Column::FirstName)
            .order_by_asc(user::Column::Id)
            .all(db)
            .await
    }

    pub async fn find_posts_by_user(db: &DbConn, user_id: i32) -> Result<Vec<PostView>, DbErr> {
        let posts = Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .find_with_related(Tag)
            .all(db)
            .await?;

        Ok(posts.into_iter().map(PostView::from).collect())
    }

    /// The newest `limit` posts, most recent first.
    pub async fn find_recent_posts(db: &DbConn, limit: u64) -> Result<Vec<AuthoredPost>, DbErr> {
        let posts = Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .limit(limit)
            .find_also_related(User)
            .all(db)
            .await?;

        Ok(posts
            .into_iter()
            .map(|(post, author)| AuthoredPost { post, author })
            .collect())
    }

    pub async fn find_post_by_id(db: &DbConn, id: i32) -> Result<Option<PostView>, DbErr> {
        let post = Post::find_by_id(id)
            .find_with_related(Tag)
            .all(db)
            .await?
            .into_iter()
            .next();

        Ok(post.map(PostView::from))
    }

    pub async fn find_post_author(
        db: &DbConn,
        post: &post::Model,
    ) -> Result<Option<user::Model>, DbErr> {
        post.find_related(User).one(db).await
    }

    pub async fn find_all_tags(db: &DbConn) -> Result<Vec<tag::Model>, DbErr> {
        Tag::find().order_by_asc(tag::Column::Id).all(db).await
    }

    pub async fn find_tag_by_id(db: &DbConn, id: i32) -> Result<Option<tag::Model>, DbErr> {
        Tag::find_by_id(id).one(db).await
    }

    /// Posts carrying `tag_id`, each with its full tag list.
    pub async fn find_posts_by_tag(db: &DbConn, tag_id: i32) -> Result<Vec<PostView>, DbErr> {
        let post_ids: Vec<i32> = PostTag::find()
            .filter(post_tag::Column::TagId.eq(tag_id))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.post_id)
            .collect();

        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let posts = Post::find()
            .filter(post::Column::Id.is_in(post_ids))
            .find_with_related(Tag)
            .all(db)
            .await?;

        Ok(posts.into_iter().map(PostView::from).collect())
    }
}
