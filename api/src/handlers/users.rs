use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use blogly_service::{Mutation, PostParams, Query, Resource, UserParams};
use serde_json::{Value, json};
use tera::Context;

use super::{form_redirect, json_reply, parse_id};
use crate::envelope;
use crate::error::AppError;
use crate::flash::Flash;
use crate::negotiate::{Accept, Format};
use crate::payload::Payload;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    accept: Accept,
    flash: Flash,
) -> Result<Response, AppError> {
    let format = accept.negotiate(&[Format::Html, Format::Json])?;
    let users = Query::find_users_sorted(&state.conn).await?;

    match format {
        Format::Json => Ok(Json(users).into_response()),
        Format::Html => {
            let mut ctx = Context::new();
            ctx.insert("users", &users);
            Ok(state.page("user_listing.html.tera", ctx, &flash)?.into_response())
        }
    }
}

pub async fn new_form(State(state): State<AppState>, flash: Flash) -> Result<Response, AppError> {
    Ok(state
        .page("user_form.html.tera", Context::new(), &flash)?
        .into_response())
}

pub async fn create(
    State(state): State<AppState>,
    accept: Accept,
    flash: Flash,
    payload: Payload,
) -> Result<Response, AppError> {
    let format = accept.negotiate(&[Format::Html, Format::Json])?;
    let result = Mutation::create_user(&state.conn, payload.parse()?).await;

    match format {
        Format::Html => form_redirect(&flash, result, "/users/new", "User created", |user| {
            format!("/users/{}", user.id)
        }),
        Format::Json => json_reply(result, |user| json!({ "user_id": user.id })),
    }
}

pub async fn show(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    accept: Accept,
    flash: Flash,
) -> Result<Response, AppError> {
    let format = accept.negotiate(&[Format::Json, Format::Html])?;
    let id = parse_id(&raw, format, Resource::User)?;
    let user = Query::find_user_by_id(&state.conn, id)
        .await?
        .ok_or(AppError::NotFound(format, Resource::User))?;

    match format {
        Format::Json => Ok(envelope::success(json!({ "user": user }))),
        Format::Html => {
            let posts = Query::find_posts_by_user(&state.conn, id).await?;
            let mut ctx = Context::new();
            ctx.insert("user", &user);
            ctx.insert("posts", &posts);
            Ok(state.page("user.html.tera", ctx, &flash)?.into_response())
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    payload: Payload,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Json, Resource::User)?;
    let result = Mutation::update_user_by_id(&state.conn, id, payload.parse()?).await;
    json_reply(result, |_| Value::Null)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Json, Resource::User)?;
    json_reply(Mutation::delete_user(&state.conn, id).await, |_| Value::Null)
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    flash: Flash,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Html, Resource::User)?;
    let user = Query::find_user_by_id(&state.conn, id)
        .await?
        .ok_or(AppError::NotFound(Format::Html, Resource::User))?;

    let mut ctx = Context::new();
    ctx.insert("user", &user);
    Ok(state.page("user_form.html.tera", ctx, &flash)?.into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    flash: Flash,
    payload: Payload,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Html, Resource::User)?;
    let params: UserParams = payload.parse()?;
    let result = Mutation::update_user_by_id(&state.conn, id, params).await;

    let retry = format!("/users/{id}/edit");
    form_redirect(&flash, result, &retry, "User updated", |user| {
        format!("/users/{}", user.id)
    })
}

pub async fn remove(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    flash: Flash,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Html, Resource::User)?;
    let result = Mutation::delete_user(&state.conn, id).await;
    form_redirect(&flash, result, "/users", "User deleted", |_| "/users".to_owned())
}

pub async fn list_posts(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    accept: Accept,
) -> Result<Response, AppError> {
    let format = accept.negotiate(&[Format::Json])?;
    let id = parse_id(&raw, format, Resource::User)?;
    if Query::find_user_by_id(&state.conn, id).await?.is_none() {
        return Err(AppError::NotFound(format, Resource::User));
    }

    let posts = Query::find_posts_by_user(&state.conn, id).await?;
    Ok(envelope::success(json!({ "posts": posts })))
}

pub async fn new_post_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    flash: Flash,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Html, Resource::User)?;
    let user = Query::find_user_by_id(&state.conn, id)
        .await?
        .ok_or(AppError::NotFound(Format::Html, Resource::User))?;
    let tags = Query::find_all_tags(&state.conn).await?;

    let mut ctx = Context::new();
    ctx.insert("user", &user);
    ctx.insert("tags", &tags);
    ctx.insert("selected", &Vec::<i32>::new());
    Ok(state.page("post_form.html.tera", ctx, &flash)?.into_response())
}

pub async fn create_post(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    accept: Accept,
    flash: Flash,
    payload: Payload,
) -> Result<Response, AppError> {
    let format = accept.negotiate(&[Format::Html, Format::Json])?;
    let id = parse_id(&raw, format, Resource::User)?;
    let params: PostParams = payload.with_form_tags().parse()?;
    let result = Mutation::create_post(&state.conn, id, params).await;

    match format {
        Format::Html => {
            let retry = format!("/users/{id}/posts/new");
            form_redirect(&flash, result, &retry, "Post created", |post| {
                format!("/posts/{}", post.id)
            })
        }
        Format::Json => json_reply(result, |post| json!({ "post_id": post.id })),
    }
}
