use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use blogly_service::{Mutation, PostParams, Query, Resource};
use serde_json::{Value, json};
use tera::Context;

use super::{form_redirect, json_reply, parse_id};
use crate::envelope;
use crate::error::AppError;
use crate::flash::Flash;
use crate::negotiate::{Accept, Format};
use crate::payload::Payload;
use crate::state::AppState;

pub async fn show(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    accept: Accept,
    flash: Flash,
) -> Result<Response, AppError> {
    let format = accept.negotiate(&[Format::Html, Format::Json])?;
    let id = parse_id(&raw, format, Resource::Post)?;
    let post = Query::find_post_by_id(&state.conn, id)
        .await?
        .ok_or(AppError::NotFound(format, Resource::Post))?;

    match format {
        Format::Json => Ok(envelope::success(json!({ "post": post }))),
        Format::Html => {
            let author = Query::find_post_author(&state.conn, &post.post).await?;
            let mut ctx = Context::new();
            ctx.insert("post", &post);
            ctx.insert("author", &author);
            Ok(state.page("post.html.tera", ctx, &flash)?.into_response())
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    payload: Payload,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Json, Resource::Post)?;
    let params: PostParams = payload.with_form_tags().parse()?;
    let result = Mutation::update_post_by_id(&state.conn, id, params).await;
    json_reply(result, |_| Value::Null)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Json, Resource::Post)?;
    json_reply(Mutation::delete_post(&state.conn, id).await, |_| Value::Null)
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    flash: Flash,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Html, Resource::Post)?;
    let post = Query::find_post_by_id(&state.conn, id)
        .await?
        .ok_or(AppError::NotFound(Format::Html, Resource::Post))?;
    let author = Query::find_post_author(&state.conn, &post.post).await?;
    let tags = Query::find_all_tags(&state.conn).await?;
    let selected: Vec<i32> = post.tags.iter().map(|tag| tag.id).collect();

    let mut ctx = Context::new();
    ctx.insert("post", &post);
    ctx.insert("user", &author);
    ctx.insert("tags", &tags);
    ctx.insert("selected", &selected);
    Ok(state.page("post_form.html.tera", ctx, &flash)?.into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    flash: Flash,
    payload: Payload,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Html, Resource::Post)?;
    let params: PostParams = payload.with_form_tags().parse()?;
    let result = Mutation::update_post_by_id(&state.conn, id, params).await;

    let retry = format!("/posts/{id}/edit");
    form_redirect(&flash, result, &retry, "Post updated", |post| {
        format!("/posts/{}", post.id)
    })
}

pub async fn remove(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    flash: Flash,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Html, Resource::Post)?;
    let result = Mutation::delete_post(&state.conn, id).await;
    form_redirect(&flash, result, "/", "Post deleted", |post| {
        format!("/users/{}", post.user_id)
    })
}
