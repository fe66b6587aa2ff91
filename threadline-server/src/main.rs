use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::{IpAddr, SocketAddr};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod accounts;
mod error;
mod extractors;
mod handlers;
mod store;

#[cfg(test)]
mod fuzz;

use accounts::{AccountStore, Accounts};
use error::Error;
use extractors::{AppState, PasswordHashing};
use store::{CommentStore, Comments};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Address to listen on
    #[structopt(long, env = "LISTEN_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[structopt(short, long, env = "PORT", default_value = "5001")]
    port: u16,

    /// Start without the demo comments and the demo user
    #[structopt(long)]
    no_seed: bool,

    /// bcrypt cost for password hashes
    #[structopt(long, default_value = "12")]
    bcrypt_cost: u32,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/comments",
            get(handlers::fetch_comments).post(handlers::create_comment),
        )
        .route("/comments/:id/like", post(handlers::like_comment))
        .route("/comments/:id/reply", post(handlers::reply_comment))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/whoami", get(handlers::whoami))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    let (comments, accounts) = match opt.no_seed {
        true => (CommentStore::new(), AccountStore::new()),
        false => (
            CommentStore::demo(),
            AccountStore::demo(opt.bcrypt_cost).context("seeding accounts")?,
        ),
    };
    tracing::debug!(num_comments = comments.len(), "initialized comment store");
    let state = AppState {
        comments: Comments::new(comments),
        accounts: Accounts::new(accounts),
        hashing: PasswordHashing(opt.bcrypt_cost),
    };

    let addr = SocketAddr::from((opt.host, opt.port));
    tracing::info!("listening on {}", addr);
    tracing::info!("health check: http://{}/health", addr);
    axum::Server::bind(&addr)
        .serve(app(state).into_make_service())
        .await
        .context("serving axum webserver")
}
