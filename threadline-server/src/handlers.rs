use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use threadline_api::{
    json, AuthResponse, Comment, CommentId, Error as ApiError, Health, NewComment, NewReply,
    NewSession, NewUser, User,
};

use crate::{extractors::*, Accounts, Comments, Error};

pub async fn fetch_comments(State(comments): State<Comments>) -> Result<impl IntoResponse, Error> {
    let store = comments.read().await;
    let tree = store.tree();
    for c in tree.dangling() {
        tracing::warn!(id = %c.id, parent = ?c.parent_id, "comment has a dangling parent, leaving it out of the tree");
    }
    let body = json::to_vec(&tree).context("serializing comment tree")?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

pub async fn create_comment(
    State(comments): State<Comments>,
    JsonBody(data): JsonBody<NewComment>,
) -> Result<(StatusCode, Json<Comment>), Error> {
    let comment = comments.write().await.create_comment(data)?;
    tracing::debug!(id = %comment.id, parent = ?comment.parent_id, "created comment");
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn like_comment(
    LikeIdentity(liker): LikeIdentity,
    State(comments): State<Comments>,
    Path(id): Path<CommentId>,
) -> Result<Json<Comment>, Error> {
    let comment = comments.write().await.toggle_like(&id, liker)?;
    tracing::debug!(%id, ?liker, likes = comment.likes, "toggled like");
    Ok(Json(comment))
}

pub async fn reply_comment(
    State(comments): State<Comments>,
    Path(parent): Path<CommentId>,
    JsonBody(data): JsonBody<NewReply>,
) -> Result<(StatusCode, Json<Comment>), Error> {
    let reply = comments.write().await.create_reply(parent, data)?;
    tracing::debug!(id = %reply.id, parent = ?reply.parent_id, "created reply");
    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn hash_password(password: String, cost: u32) -> Result<String, Error> {
    Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("joining password hashing task")?
        .context("hashing password")?)
}

async fn verify_password(password: String, hash: String) -> Result<bool, Error> {
    Ok(
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .context("joining password verification task")?
            .context("verifying password")?,
    )
}

pub async fn register(
    State(accounts): State<Accounts>,
    State(PasswordHashing(cost)): State<PasswordHashing>,
    JsonBody(data): JsonBody<NewUser>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    data.validate()?;
    // fail early to skip hashing, the check is redone under the write lock
    if accounts.read().await.name_taken(&data.username) {
        return Err(Error::Api(ApiError::NameAlreadyUsed(data.username)));
    }
    let pass_hash = hash_password(data.password, cost).await?;
    let mut accounts = accounts.write().await;
    let user = accounts.create_user(data.username, pass_hash)?;
    let token = accounts.open_session(user.id);
    tracing::info!(user = ?user.id, "registered new user");
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(
    State(accounts): State<Accounts>,
    JsonBody(data): JsonBody<NewSession>,
) -> Result<Json<AuthResponse>, Error> {
    data.validate()?;
    let (user, pass_hash) = accounts
        .read()
        .await
        .find_login(&data.username)
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(data.password, pass_hash).await? {
        return Err(Error::Api(ApiError::InvalidCredentials));
    }
    let token = accounts.write().await.open_session(user.id);
    Ok(Json(AuthResponse { token, user }))
}

pub async fn whoami(Auth(user): Auth) -> Json<User> {
    Json(user)
}
