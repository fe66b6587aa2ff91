use anyhow::Context;

use crate::api::{
    self, AuthResponse, AuthToken, Comment, CommentId, CommentNode, Health, NewComment, NewReply,
    NewSession, NewUser, User,
};

/// HTTP client for a threadline server
///
/// Error responses are turned into [`api::Error`] values, that can be
/// recovered from the returned `anyhow::Error` with `downcast_ref`.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    host: String,
    token: Option<AuthToken>,
}

impl Client {
    pub fn new(host: String) -> Client {
        Client {
            http: reqwest::Client::new(),
            host: String::from(host.trim_end_matches('/')),
            token: None,
        }
    }

    pub fn with_token(mut self, token: AuthToken) -> Client {
        self.token = Some(token);
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let req = self.http.request(method, format!("{}{}", self.host, path));
        match self.token {
            Some(token) => req.bearer_auth(token.0),
            None => req,
        }
    }

    async fn send<R>(&self, req: reqwest::RequestBuilder) -> anyhow::Result<R>
    where
        R: for<'de> serde::Deserialize<'de>,
    {
        let resp = req.send().await.context("sending request to server")?;
        let status = resp.status();
        let body = resp.bytes().await.context("reading server response")?;
        if status.is_success() {
            return api::json::from_slice(&body).context("parsing server response");
        }
        let err = api::Error::parse(&body)
            .with_context(|| format!("parsing error response with status {status}"))?;
        tracing::debug!(?err, %status, "server returned an error");
        Err(err.into())
    }

    pub async fn fetch_comments(&self) -> anyhow::Result<Vec<CommentNode>> {
        self.send(self.request(reqwest::Method::GET, "/comments"))
            .await
    }

    pub async fn create_comment(&self, new: &NewComment) -> anyhow::Result<Comment> {
        self.send(self.request(reqwest::Method::POST, "/comments").json(new))
            .await
    }

    pub async fn reply(&self, parent: &CommentId, reply: &NewReply) -> anyhow::Result<Comment> {
        self.send(
            self.request(reqwest::Method::POST, &format!("/comments/{parent}/reply"))
                .json(reply),
        )
        .await
    }

    pub async fn like(&self, id: &CommentId) -> anyhow::Result<Comment> {
        self.send(self.request(reqwest::Method::POST, &format!("/comments/{id}/like")))
            .await
    }

    pub async fn register(&self, new: &NewUser) -> anyhow::Result<AuthResponse> {
        self.send(self.request(reqwest::Method::POST, "/auth/register").json(new))
            .await
    }

    pub async fn login(&self, session: &NewSession) -> anyhow::Result<AuthResponse> {
        self.send(self.request(reqwest::Method::POST, "/auth/login").json(session))
            .await
    }

    pub async fn whoami(&self) -> anyhow::Result<User> {
        self.send(self.request(reqwest::Method::GET, "/auth/whoami"))
            .await
    }

    pub async fn health(&self) -> anyhow::Result<Health> {
        self.send(self.request(reqwest::Method::GET, "/health"))
            .await
    }
}
