use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{self, request, Request},
    Json,
};
use threadline_api::{AuthToken, Error as ApiError, Liker, User, Uuid};

use crate::{Accounts, Comments, Error};

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub comments: Comments,
    pub accounts: Accounts,
    pub hashing: PasswordHashing,
}

/// bcrypt cost applied to newly registered passwords
#[derive(Clone, Copy, Debug)]
pub struct PasswordHashing(pub u32);

pub struct PreAuth(pub AuthToken);

/// Token of an `Authorization: Bearer <uuid>` header, case-insensitive on the
/// scheme
fn bearer_token(header: &http::HeaderValue) -> Option<Uuid> {
    let mut parts = header.to_str().ok()?.split(' ');
    if !parts.next()?.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Uuid::try_from(token).ok()
}

#[async_trait]
impl<S: Sync> FromRequestParts<S> for PreAuth {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<PreAuth, Error> {
        let token = req
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(bearer_token)
            .ok_or(ApiError::PermissionDenied)?;
        Ok(PreAuth(AuthToken(token)))
    }
}

pub struct Auth(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, state: &AppState) -> Result<Auth, Error> {
        let token = PreAuth::from_request_parts(req, state).await?.0;
        Ok(Auth(state.accounts.read().await.recover_session(&token)?))
    }
}

/// Who a like gets recorded for: the session's user when the request carries a
/// bearer token, the shared anonymous identity otherwise
pub struct LikeIdentity(pub Liker);

#[async_trait]
impl FromRequestParts<AppState> for LikeIdentity {
    type Rejection = Error;

    async fn from_request_parts(
        req: &mut request::Parts,
        state: &AppState,
    ) -> Result<LikeIdentity, Error> {
        if !req.headers.contains_key(http::header::AUTHORIZATION) {
            return Ok(LikeIdentity(Liker::Anonymous));
        }
        let Auth(user) = Auth::from_request_parts(req, state).await?;
        Ok(LikeIdentity(Liker::User(user.id)))
    }
}

/// `Json` whose rejections are reported with the API's error bodies
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, B, T> FromRequest<S, B> for JsonBody<T>
where
    Json<T>: FromRequest<S, B>,
    <Json<T> as FromRequest<S, B>>::Rejection: std::fmt::Display,
    S: Send + Sync,
    B: Send + 'static,
{
    type Rejection = Error;

    async fn from_request(req: Request<B>, state: &S) -> Result<JsonBody<T>, Error> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::InvalidBody(rejection.to_string()).into()),
        }
    }
}
