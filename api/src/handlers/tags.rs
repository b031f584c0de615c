use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use blogly_service::{Mutation, Query, Resource};
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
    let tags = Query::find_all_tags(&state.conn).await?;

    match format {
        Format::Json => Ok(Json(tags).into_response()),
        Format::Html => {
            let mut ctx = Context::new();
            ctx.insert("tags", &tags);
            Ok(state.page("tag_listing.html.tera", ctx, &flash)?.into_response())
        }
    }
}

pub async fn new_form(State(state): State<AppState>, flash: Flash) -> Result<Response, AppError> {
    Ok(state
        .page("tag_form.html.tera", Context::new(), &flash)?
        .into_response())
}

pub async fn create(
    State(state): State<AppState>,
    accept: Accept,
    flash: Flash,
    payload: Payload,
) -> Result<Response, AppError> {
    let format = accept.negotiate(&[Format::Html, Format::Json])?;
    let result = Mutation::create_tag(&state.conn, payload.parse()?).await;

    match format {
        Format::Html => form_redirect(&flash, result, "/tags/new", "Tag created", |tag| {
            format!("/tags/{}", tag.id)
        }),
        Format::Json => json_reply(result, |tag| json!({ "tag_id": tag.id })),
    }
}

pub async fn show(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    accept: Accept,
    flash: Flash,
) -> Result<Response, AppError> {
    let format = accept.negotiate(&[Format::Json, Format::Html])?;
    let id = parse_id(&raw, format, Resource::Tag)?;
    let tag = Query::find_tag_by_id(&state.conn, id)
        .await?
        .ok_or(AppError::NotFound(format, Resource::Tag))?;
    let posts = Query::find_posts_by_tag(&state.conn, id).await?;

    match format {
        Format::Json => Ok(envelope::success(json!({ "tag": tag, "posts": posts }))),
        Format::Html => {
            let mut ctx = Context::new();
            ctx.insert("tag", &tag);
            ctx.insert("posts", &posts);
            Ok(state.page("tag.html.tera", ctx, &flash)?.into_response())
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    payload: Payload,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Json, Resource::Tag)?;
    let result = Mutation::update_tag_by_id(&state.conn, id, payload.parse()?).await;
    json_reply(result, |_| Value::Null)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Json, Resource::Tag)?;
    json_reply(Mutation::delete_tag(&state.conn, id).await, |_| Value::Null)
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    flash: Flash,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Html, Resource::Tag)?;
    let tag = Query::find_tag_by_id(&state.conn, id)
        .await?
        .ok_or(AppError::NotFound(Format::Html, Resource::Tag))?;

    let mut ctx = Context::new();
    ctx.insert("tag", &tag);
    Ok(state.page("tag_form.html.tera", ctx, &flash)?.into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    flash: Flash,
    payload: Payload,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Html, Resource::Tag)?;
    let result = Mutation::update_tag_by_id(&state.conn, id, payload.parse()?).await;

    let retry = format!("/tags/{id}/edit");
    form_redirect(&flash, result, &retry, "Tag updated", |tag| {
        format!("/tags/{}", tag.id)
    })
}

pub async fn remove(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    flash: Flash,
) -> Result<Response, AppError> {
    let id = parse_id(&raw, Format::Html, Resource::Tag)?;
    let result = Mutation::delete_tag(&state.conn, id).await;
    form_redirect(&flash, result, "/tags", "Tag deleted", |_| "/tags".to_owned())
}
