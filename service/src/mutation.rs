use std::collections::BTreeSet;

use ::entity::prelude::{Post, PostTag, Tag, User};
use ::entity::{post, post_tag, tag, user};
use chrono::Utc;
use itertools::Itertools;
use sea_orm::*;
use tracing::{debug, info};

use crate::{PostParams, Resource, Result, ServiceError, TagParams, TagRef, UserParams};
use crate::{Validator, invalid_tag_id};

/// Tag associations to add and remove so a post ends up with the desired set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub added: Vec<i32>,
    pub removed: Vec<i32>,
}

impl TagDiff {
    pub fn between(current: &[i32], desired: &[i32]) -> Self {
        let current: BTreeSet<i32> = current.iter().copied().collect();
        let desired: BTreeSet<i32> = desired.iter().copied().collect();

        Self {
            added: desired.difference(&current).copied().collect(),
            removed: current.difference(&desired).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Resolves client tag references to existing tag IDs.
///
/// Records one error per reference that is malformed or names a missing tag.
async fn resolve_tags<C>(db: &C, refs: &[TagRef], validator: &mut Validator) -> Result<Vec<i32>>
where
    C: ConnectionTrait,
{
    // The same tag written two ways counts once.
    let refs: Vec<&TagRef> = refs
        .iter()
        .unique_by(|r| r.id().ok_or_else(|| r.to_string()))
        .collect();
    let wanted: Vec<i32> = refs.iter().filter_map(|r| r.id()).unique().collect();

    let existing: BTreeSet<i32> = if wanted.is_empty() {
        BTreeSet::new()
    } else {
        Tag::find()
            .filter(tag::Column::Id.is_in(wanted.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|tag| tag.id)
            .collect()
    };

    for tag_ref in refs {
        match tag_ref.id() {
            Some(id) if existing.contains(&id) => {}
            _ => validator.push(invalid_tag_id(tag_ref)),
        }
    }

    Ok(wanted.into_iter().filter(|id| existing.contains(id)).collect())
}

async fn attach_tags<C>(db: &C, post_id: i32, tag_ids: &[i32]) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    for &tag_id in tag_ids {
        post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(tag_id),
        }
        .insert(db)
        .await?;
        debug!(post_id, tag_id, "added tag");
    }

    Ok(())
}

pub struct Mutation;

impl Mutation {
    pub async fn create_user(db: &DbConn, params: UserParams) -> Result<user::Model> {
        let mut validator = Validator::new();
        let first_name = validator.required("first_name", params.first_name.as_deref());
        let last_name = validator.required("last_name", params.last_name.as_deref());
        let (first_name, last_name) = validator.finish_with(first_name.zip(last_name))?;

        // A blank avatar on create just means "use the default".
        let image_url = params
            .image_url
            .flatten()
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| user::DEFAULT_IMAGE_URL.to_owned());

        let txn = db.begin().await?;
        let user = user::ActiveModel {
            first_name: Set(first_name),
            last_name: Set(last_name),
            image_url: Set(image_url),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(user_id = user.id, "created user");
        Ok(user)
    }

    /// Applies the fields present in `params`; absent fields stay as they are.
    pub async fn update_user_by_id(
        db: &DbConn,
        id: i32,
        params: UserParams,
    ) -> Result<user::Model> {
        let txn = db.begin().await?;
        let user = User::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound(Resource::User))?;

        let mut validator = Validator::new();
        let mut active: user::ActiveModel = user.clone().into();

        if let Some(first_name) = validator.optional("first_name", params.first_name.as_deref()) {
            if first_name != user.first_name {
                active.first_name = Set(first_name);
            }
        }

        if let Some(last_name) = validator.optional("last_name", params.last_name.as_deref()) {
            if last_name != user.last_name {
                active.last_name = Set(last_name);
            }
        }

        if let Some(image_url) = params.image_url {
            let image_url = match image_url {
                None => Some(user::DEFAULT_IMAGE_URL.to_owned()),
                Some(raw) => validator.optional("image_url", Some(&raw)),
            };
            if let Some(image_url) = image_url.filter(|url| *url != user.image_url) {
                active.image_url = Set(image_url);
            }
        }

        validator.finish()?;

        if !active.is_changed() {
            return Ok(user);
        }

        let user = active.update(&txn).await?;
        txn.commit().await?;

        info!(user_id = user.id, "updated user");
        Ok(user)
    }

    /// Deletes a user along with every post they wrote.
    pub async fn delete_user(db: &DbConn, id: i32) -> Result<user::Model> {
        let txn = db.begin().await?;
        let user = User::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound(Resource::User))?;

        let post_ids: Vec<i32> = Post::find()
            .filter(post::Column::UserId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|post| post.id)
            .collect();

        if !post_ids.is_empty() {
            PostTag::delete_many()
                .filter(post_tag::Column::PostId.is_in(post_ids.clone()))
                .exec(&txn)
                .await?;
            Post::delete_many()
                .filter(post::Column::UserId.eq(id))
                .exec(&txn)
                .await?;
        }

        User::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(user_id = id, posts = post_ids.len(), "deleted user");
        Ok(user)
    }

    pub async fn create_post(db: &DbConn, user_id: i32, params: PostParams) -> Result<post::Model> {
        let txn = db.begin().await?;
        if User::find_by_id(user_id).one(&txn).await?.is_none() {
            return Err(ServiceError::NotFound(Resource::User));
        }

        let mut validator = Validator::new();
        let title = validator.required("title", params.title.as_deref());
        let content = validator.required("content", params.content.as_deref());
        let tag_ids = match &params.tags {
            Some(refs) => resolve_tags(&txn, refs, &mut validator).await?,
            None => Vec::new(),
        };
        let (title, content) = validator.finish_with(title.zip(content))?;

        let now = Utc::now();
        let post = post::ActiveModel {
            title: Set(title),
            content: Set(content),
            created_at: Set(now),
            updated_at: Set(now),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        attach_tags(&txn, post.id, &tag_ids).await?;
        txn.commit().await?;

        info!(post_id = post.id, user_id, tags = tag_ids.len(), "created post");
        Ok(post)
    }

    /// Applies the fields present in `params` and, when a tag list is given,
    /// reconciles the post's tags against it.
    ///
    /// `updated_at` only moves when something actually changed.
    pub async fn update_post_by_id(
        db: &DbConn,
        id: i32,
        params: PostParams,
    ) -> Result<post::Model> {
        let txn = db.begin().await?;
        let post = Post::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Post))?;

        let mut validator = Validator::new();
        let mut active: post::ActiveModel = post.clone().into();

        if let Some(title) = validator.optional("title", params.title.as_deref()) {
            if title != post.title {
                active.title = Set(title);
            }
        }

        if let Some(content) = validator.optional("content", params.content.as_deref()) {
            if content != post.content {
                active.content = Set(content);
            }
        }

        let desired = match &params.tags {
            Some(refs) => Some(resolve_tags(&txn, refs, &mut validator).await?),
            None => None,
        };

        validator.finish()?;

        let mut diff = TagDiff::default();
        if let Some(desired) = desired {
            let current: Vec<i32> = PostTag::find()
                .filter(post_tag::Column::PostId.eq(id))
                .all(&txn)
                .await?
                .into_iter()
                .map(|row| row.tag_id)
                .collect();
            diff = TagDiff::between(&current, &desired);

            if !diff.removed.is_empty() {
                PostTag::delete_many()
                    .filter(post_tag::Column::PostId.eq(id))
                    .filter(post_tag::Column::TagId.is_in(diff.removed.clone()))
                    .exec(&txn)
                    .await?;
                debug!(post_id = id, removed = ?diff.removed, "removed tags");
            }
            attach_tags(&txn, id, &diff.added).await?;
        }

        if !active.is_changed() && diff.is_empty() {
            return Ok(post);
        }

        active.updated_at = Set(Utc::now());
        let post = active.update(&txn).await?;
        txn.commit().await?;

        info!(post_id = id, "updated post");
        Ok(post)
    }

    /// Deletes a post and its tag associations. Hands back the deleted row.
    pub async fn delete_post(db: &DbConn, id: i32) -> Result<post::Model> {
        let txn = db.begin().await?;
        let post = Post::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Post))?;

        PostTag::delete_many()
            .filter(post_tag::Column::PostId.eq(id))
            .exec(&txn)
            .await?;
        Post::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(post_id = id, "deleted post");
        Ok(post)
    }

    pub async fn create_tag(db: &DbConn, params: TagParams) -> Result<tag::Model> {
        let mut validator = Validator::new();
        let name = validator.required("name", params.name.as_deref());
        let name = validator.finish_with(name)?;

        let txn = db.begin().await?;
        let tag = tag::ActiveModel {
            name: Set(name),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(tag_id = tag.id, "created tag");
        Ok(tag)
    }

    pub async fn update_tag_by_id(db: &DbConn, id: i32, params: TagParams) -> Result<tag::Model> {
        let txn = db.begin().await?;
        let tag = Tag::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Tag))?;

        let mut validator = Validator::new();
        let name = validator.optional("name", params.name.as_deref());
        validator.finish()?;

        let Some(name) = name.filter(|name| *name != tag.name) else {
            return Ok(tag);
        };

        let mut active: tag::ActiveModel = tag.into();
        active.name = Set(name);
        let tag = active.update(&txn).await?;
        txn.commit().await?;

        info!(tag_id = id, "updated tag");
        Ok(tag)
    }

    /// Deletes a tag. Posts that carried it are left in place.
    pub async fn delete_tag(db: &DbConn, id: i32) -> Result<tag::Model> {
        let txn = db.begin().await?;
        let tag = Tag::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Tag))?;

        PostTag::delete_many()
            .filter(post_tag::Column::TagId.eq(id))
            .exec(&txn)
            .await?;
        Tag::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(tag_id = id, "deleted tag");
        Ok(tag)
    }
}
