#![cfg(test)]

use axum::{
    extract::FromRequestParts,
    http::{self, request},
};
use bolero::generator::TypeGenerator;
use std::{cmp, fmt::Debug, ops::RangeTo, panic::AssertUnwindSafe};
use threadline_api::{
    AuthResponse, Comment, CommentId, CommentNode, Error as ApiError, Health, Liker, NewComment,
    NewReply, NewSession, NewUser, User, Uuid,
};
use threadline_mock_server::MockServer;
use tower::{Service, ServiceExt};

use crate::{extractors::*, *};

macro_rules! do_tokio_test {
    ( $name:ident, $typ:ty, $fn:expr ) => {
        #[test]
        fn $name() {
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_type::<$typ>()
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

macro_rules! do_app_test {
    ( $name:ident, $gen:expr, $fn:expr ) => {
        #[test]
        fn $name() {
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_generator($gen)
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

/// Minimal bcrypt cost, hashing is not what is tested here
const TEST_BCRYPT_COST: u32 = 4;

pub(crate) fn test_app(comments: CommentStore) -> Router {
    app(AppState {
        comments: Comments::new(comments),
        accounts: Accounts::new(AccountStore::new()),
        hashing: PasswordHashing(TEST_BCRYPT_COST),
    })
}

do_tokio_test!(fuzz_preauth_extractor, String, |token| async move {
    if let Ok(req) = http::Request::builder()
        .method(http::Method::GET)
        .uri("/")
        .header(http::header::AUTHORIZATION, token)
        .body(())
    {
        let mut req = req.into_parts().0;
        let res = PreAuth::from_request_parts(&mut req, &()).await;
        match res {
            Ok(_) => (),
            Err(Error::Api(ApiError::PermissionDenied)) => (),
            Err(e) => panic!("got unexpected error: {e}"),
        }
    }
});

pub(crate) async fn call<Req, Resp>(
    app: &mut Router,
    req: request::Request<axum::body::Body>,
    req_body: &Req,
) -> Result<Resp, ApiError>
where
    Req: Debug,
    Resp: 'static + for<'de> serde::Deserialize<'de>,
{
    app.ready().await.expect("waiting for app to be ready");
    let resp = app.call(req).await.expect("running request");
    let status = resp.status();
    let body = hyper::body::to_bytes(resp.into_body())
        .await
        .expect("recovering resp bytes");
    if status.is_success() {
        return Ok(threadline_api::json::from_slice(&body).unwrap_or_else(|err| {
            panic!(
                r#"
                    Failed parsing resp body!

                    The error is the following:
                    ---
                    {err}
                    ---

                    Response body is:
                    ---
                    {body:?}
                    ---

                    Request was:
                    ---
                    {req_body:?}
                    ---
                "#
            )
        }));
    }
    let err = ApiError::parse(&body)
        .unwrap_or_else(|err| panic!("parsing error response body {err}, body is {body:?}"));
    assert_eq!(status, err.status_code(), "status code mismatch for {err:?}");
    Err(err)
}

pub(crate) async fn run_on_app<Req, Resp>(
    app: &mut Router,
    method: &str,
    uri: &str,
    token: Option<Uuid>,
    body: Option<&Req>,
) -> Result<Resp, ApiError>
where
    Req: Debug + serde::Serialize,
    Resp: 'static + for<'de> serde::Deserialize<'de>,
{
    let req = request::Builder::new().method(method).uri(uri);
    let req = match token {
        Some(token) => req.header(http::header::AUTHORIZATION, format!("bearer {token}")),
        None => req,
    };
    let req = match body {
        Some(body) => req
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                serde_json::to_vec(body).expect("serializing request body to json"),
            )),
        None => req.body(axum::body::Body::empty()),
    }
    .expect("building request");
    call(app, req, &body).await
}

/// Request without a body
pub(crate) const NO_BODY: Option<&()> = None;

fn compare<T>(name: &str, app_res: Result<T, ApiError>, mock_res: Result<T, ApiError>)
where
    T: Debug + PartialEq,
{
    assert_eq!(
        app_res, mock_res,
        "app and mock did not return the same result for {name}"
    );
}

fn resize_int(fuzz_id: usize, RangeTo { end }: RangeTo<usize>) -> Option<usize> {
    if end == 0 {
        return None;
    }
    let bucket_size = cmp::max(1, usize::MAX / end); // in case we rounded to 0
    let id = fuzz_id / bucket_size;
    Some(cmp::min(id, end - 1)) // in case id was actually over end - 1 due to rounding
}

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum CommentRef {
    Existing(usize),
    Unknown(u16),
}

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum FuzzOp {
    CreateComment {
        text: Option<String>,
        author: Option<String>,
        parent: Option<CommentRef>,
        empty_parent: bool,
    },
    Reply {
        parent: CommentRef,
        reply: NewReply,
    },
    Like {
        target: CommentRef,
    },
    FetchComments,
}

struct ComparativeFuzzer {
    app: Router,
    mock: MockServer,
}

impl ComparativeFuzzer {
    fn new() -> ComparativeFuzzer {
        ComparativeFuzzer {
            app: test_app(CommentStore::new()),
            mock: MockServer::new(),
        }
    }

    fn resolve(&self, r: &CommentRef) -> CommentId {
        match r {
            CommentRef::Existing(idx) => {
                match resize_int(*idx, ..self.mock.test_num_comments()) {
                    Some(idx) => self.mock.test_get_comment_id(idx).clone(),
                    None => CommentId(String::from("unknown-none")),
                }
            }
            CommentRef::Unknown(n) => CommentId(format!("unknown-{n}")),
        }
    }

    async fn execute_fuzz_op(&mut self, op: FuzzOp) {
        match op {
            FuzzOp::CreateComment {
                text,
                author,
                parent,
                empty_parent,
            } => {
                let parent_id = match (empty_parent, &parent) {
                    (true, _) => Some(CommentId(String::new())),
                    (false, Some(p)) => Some(self.resolve(p)),
                    (false, None) => None,
                };
                let new = NewComment {
                    text,
                    author,
                    parent_id,
                };
                let app_res: Result<Comment, ApiError> =
                    run_on_app(&mut self.app, "POST", "/comments", None, Some(&new)).await;
                let (id, timestamp) = match &app_res {
                    Ok(c) => (c.id.clone(), c.timestamp),
                    Err(_) => (CommentId::generate(), chrono::Utc::now()),
                };
                let mock_res = self.mock.create_comment(new, id, timestamp);
                compare("CreateComment", app_res, mock_res);
            }
            FuzzOp::Reply { parent, reply } => {
                let parent = self.resolve(&parent);
                let app_res: Result<Comment, ApiError> = run_on_app(
                    &mut self.app,
                    "POST",
                    &format!("/comments/{parent}/reply"),
                    None,
                    Some(&reply),
                )
                .await;
                let (id, timestamp) = match &app_res {
                    Ok(c) => (c.id.clone(), c.timestamp),
                    Err(_) => (CommentId::generate(), chrono::Utc::now()),
                };
                let mock_res = self.mock.reply(parent, reply, id, timestamp);
                compare("Reply", app_res, mock_res);
            }
            FuzzOp::Like { target } => {
                let target = self.resolve(&target);
                compare(
                    "Like",
                    run_on_app(
                        &mut self.app,
                        "POST",
                        &format!("/comments/{target}/like"),
                        None,
                        NO_BODY,
                    )
                    .await,
                    self.mock.like(&target, Liker::Anonymous),
                );
            }
            FuzzOp::FetchComments => {
                let app_res: Result<Vec<CommentNode>, ApiError> =
                    run_on_app(&mut self.app, "GET", "/comments", None, NO_BODY).await;
                compare("FetchComments", app_res, Ok(self.mock.fetch_comments()));
            }
        }
    }
}

do_app_test!(
    compare_with_mock,
    bolero::generator::gen_with::<Vec<FuzzOp>>().len(1..100usize),
    |test: Vec<FuzzOp>| async move {
        let mut fuzzer = ComparativeFuzzer::new();
        for op in test {
            fuzzer.execute_fuzz_op(op).await;
        }
        // always end by checking the whole tree
        fuzzer.execute_fuzz_op(FuzzOp::FetchComments).await;
    }
);

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed initializing tokio runtime")
}

#[test]
fn example_scenario() {
    runtime().block_on(async {
        let mut store = CommentStore::new();
        store.append(Comment {
            id: CommentId::from("1"),
            parent_id: None,
            text: String::from("A"),
            author: String::from("Alice"),
            timestamp: chrono::Utc::now(),
            likes: 0,
        });
        let mut app = test_app(store);

        let liked: Comment = run_on_app(&mut app, "POST", "/comments/1/like", None, NO_BODY)
            .await
            .unwrap();
        assert_eq!(liked.likes, 1);
        let unliked: Comment = run_on_app(&mut app, "POST", "/comments/1/like", None, NO_BODY)
            .await
            .unwrap();
        assert_eq!(unliked.likes, 0);

        let reply: Comment = run_on_app(
            &mut app,
            "POST",
            "/comments/1/reply",
            None,
            Some(&NewReply::new(String::from("hi"), Some(String::from("Bob")))),
        )
        .await
        .unwrap();
        assert_eq!(reply.parent_id, Some(CommentId::from("1")));

        let tree: Vec<CommentNode> = run_on_app(&mut app, "GET", "/comments", None, NO_BODY)
            .await
            .unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].comment.text, "hi");

        let missing: Result<Comment, _> = run_on_app(
            &mut app,
            "POST",
            "/comments/999/reply",
            None,
            Some(&NewReply::new(String::from("x"), None)),
        )
        .await;
        assert_eq!(
            missing,
            Err(ApiError::ParentNotFound(CommentId::from("999")))
        );
        let tree: Vec<CommentNode> = run_on_app(&mut app, "GET", "/comments", None, NO_BODY)
            .await
            .unwrap();
        assert_eq!(tree.iter().map(|n| n.count()).sum::<usize>(), 2);
    })
}

#[test]
fn very_deep_reply_chain_is_served() {
    runtime().block_on(async {
        let len: usize = 20_000;
        let mut store = CommentStore::new();
        for i in 0..len {
            store.append(Comment {
                id: CommentId(i.to_string()),
                parent_id: i.checked_sub(1).map(|p: usize| CommentId(p.to_string())),
                text: String::from("deeper"),
                author: String::from("Alice"),
                timestamp: chrono::Utc::now(),
                likes: 0,
            });
        }
        let mut app = test_app(store);

        let req = request::Builder::new()
            .method("GET")
            .uri("/comments")
            .body(axum::body::Body::empty())
            .expect("building request");
        app.ready().await.expect("waiting for app to be ready");
        let resp = app.call(req).await.expect("running request");
        assert_eq!(resp.status(), http::StatusCode::OK);
        let body = hyper::body::to_bytes(resp.into_body())
            .await
            .expect("recovering resp bytes");
        let mut suffix = String::from(r#""children":[]}"#);
        suffix.push_str(&"]}".repeat(len - 1));
        suffix.push(']');
        assert!(body.starts_with(br#"[{"id":"0","#));
        assert!(body.ends_with(suffix.as_bytes()));
    })
}

#[test]
fn long_reply_chain_round_trips_over_http() {
    runtime().block_on(async {
        let mut store = CommentStore::new();
        store.append(Comment {
            id: CommentId::from("root"),
            parent_id: None,
            text: String::from("root"),
            author: String::from("Alice"),
            timestamp: chrono::Utc::now(),
            likes: 0,
        });
        let mut app = test_app(store);

        let mut ids = vec![CommentId::from("root")];
        for i in 0..300 {
            let parent = ids.last().expect("chain is never empty").clone();
            let reply: Comment = run_on_app(
                &mut app,
                "POST",
                &format!("/comments/{parent}/reply"),
                None,
                Some(&NewReply::new(format!("reply {i}"), None)),
            )
            .await
            .unwrap();
            assert_eq!(reply.parent_id, Some(parent));
            ids.push(reply.id);
        }

        let tree: Vec<CommentNode> = run_on_app(&mut app, "GET", "/comments", None, NO_BODY)
            .await
            .unwrap();
        assert_eq!(tree.len(), 1);
        let mut cur = &tree[0];
        let mut seen = vec![cur.comment.id.clone()];
        while let Some(next) = cur.children.first() {
            assert_eq!(cur.children.len(), 1);
            cur = next;
            seen.push(cur.comment.id.clone());
        }
        assert_eq!(seen, ids);
        assert_eq!(cur.comment.author, threadline_api::DEFAULT_AUTHOR);
    })
}

#[test]
fn malformed_bodies_are_bad_requests() {
    runtime().block_on(async {
        let mut app = test_app(CommentStore::new());
        let req = request::Builder::new()
            .method("POST")
            .uri("/comments")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{not json"))
            .expect("building request");
        let res: Result<Comment, _> = call(&mut app, req, &"{not json").await;
        assert!(matches!(res, Err(ApiError::InvalidBody(_))), "{res:?}");

        let res: Result<Comment, _> =
            run_on_app(&mut app, "POST", "/comments", None, Some(&serde_json::json!({})))
                .await;
        assert_eq!(res, Err(ApiError::TextRequired));
    })
}

#[test]
fn like_unknown_comment_is_not_found() {
    runtime().block_on(async {
        let mut app = test_app(CommentStore::demo());
        let res: Result<Comment, _> =
            run_on_app(&mut app, "POST", "/comments/999/like", None, NO_BODY).await;
        assert_eq!(res, Err(ApiError::CommentNotFound(CommentId::from("999"))));
    })
}

#[test]
fn health_reports_ok() {
    runtime().block_on(async {
        let mut app = test_app(CommentStore::new());
        let health: Health = run_on_app(&mut app, "GET", "/health", None, NO_BODY)
            .await
            .unwrap();
        assert_eq!(health.status, "OK");
    })
}

#[test]
fn accounts_flow() {
    runtime().block_on(async {
        let mut app = test_app(CommentStore::demo());
        let new_user = NewUser {
            username: String::from("carol"),
            password: String::from("hunter2"),
        };

        let registered: AuthResponse =
            run_on_app(&mut app, "POST", "/auth/register", None, Some(&new_user))
                .await
                .unwrap();
        assert_eq!(registered.user.username, "carol");

        let conflict: Result<AuthResponse, _> = run_on_app(
            &mut app,
            "POST",
            "/auth/register",
            None,
            Some(&NewUser {
                username: String::from("CAROL"),
                password: String::from("x"),
            }),
        )
        .await;
        assert_eq!(
            conflict,
            Err(ApiError::NameAlreadyUsed(String::from("CAROL")))
        );

        let missing: Result<AuthResponse, _> = run_on_app(
            &mut app,
            "POST",
            "/auth/login",
            None,
            Some(&NewSession {
                username: String::from("carol"),
                password: String::new(),
            }),
        )
        .await;
        assert_eq!(missing, Err(ApiError::CredentialsRequired));

        let wrong: Result<AuthResponse, _> = run_on_app(
            &mut app,
            "POST",
            "/auth/login",
            None,
            Some(&NewSession {
                username: String::from("carol"),
                password: String::from("hunter3"),
            }),
        )
        .await;
        assert_eq!(wrong, Err(ApiError::InvalidCredentials));

        let session: AuthResponse = run_on_app(
            &mut app,
            "POST",
            "/auth/login",
            None,
            Some(&NewSession {
                username: String::from("carol"),
                password: String::from("hunter2"),
            }),
        )
        .await
        .unwrap();
        assert_eq!(session.user, registered.user);

        let me: User = run_on_app(
            &mut app,
            "GET",
            "/auth/whoami",
            Some(session.token.0),
            NO_BODY,
        )
        .await
        .unwrap();
        assert_eq!(me, registered.user);

        let anon: Result<User, _> =
            run_on_app(&mut app, "GET", "/auth/whoami", None, NO_BODY).await;
        assert_eq!(anon, Err(ApiError::PermissionDenied));
        let bogus: Result<User, _> = run_on_app(
            &mut app,
            "GET",
            "/auth/whoami",
            Some(Uuid::new_v4()),
            NO_BODY,
        )
        .await;
        assert_eq!(bogus, Err(ApiError::PermissionDenied));
    })
}

#[test]
fn authenticated_likes_are_per_user() {
    runtime().block_on(async {
        let mut app = test_app(CommentStore::demo());
        let mut tokens = Vec::new();
        for name in ["dave", "erin"] {
            let res: AuthResponse = run_on_app(
                &mut app,
                "POST",
                "/auth/register",
                None,
                Some(&NewUser {
                    username: String::from(name),
                    password: String::from("pw"),
                }),
            )
            .await
            .unwrap();
            tokens.push(res.token.0);
        }

        // comment "2" starts with 8 likes
        let mut likes = Vec::new();
        for token in [Some(tokens[0]), Some(tokens[1]), None, None, Some(tokens[0])] {
            let c: Comment = run_on_app(&mut app, "POST", "/comments/2/like", token, NO_BODY)
                .await
                .unwrap();
            likes.push(c.likes);
        }
        assert_eq!(likes, vec![9, 10, 11, 10, 9]);

        let rejected: Result<Comment, _> = run_on_app(
            &mut app,
            "POST",
            "/comments/2/like",
            Some(Uuid::new_v4()),
            NO_BODY,
        )
        .await;
        assert_eq!(rejected, Err(ApiError::PermissionDenied));
    })
}
