use anyhow::Context;
use threadline_client::{
    api::{AuthResponse, AuthToken, CommentId, NewComment, NewReply, NewSession, NewUser, Uuid},
    Client, RevealState, ThreadView,
};

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long, env = "THREADLINE_HOST", default_value = "http://localhost:5001")]
    host: String,

    /// Session token, as printed by `login` or `register`
    #[structopt(long, env = "THREADLINE_TOKEN")]
    token: Option<Uuid>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Show the comment thread
    List {
        /// Also show the replies folded by default
        #[structopt(long)]
        all: bool,
    },

    /// Post a top-level comment
    Post {
        text: String,

        #[structopt(short, long)]
        author: Option<String>,
    },

    /// Reply to a comment
    Reply {
        /// Id of the comment to reply to
        id: String,

        text: String,

        #[structopt(short, long)]
        author: Option<String>,
    },

    /// Like a comment, or unlike it if it was already liked
    Like { id: String },

    /// Create a user and log in as it
    Register { username: String, password: String },

    /// Open a session
    Login { username: String, password: String },

    /// Show the user the session token belongs to
    Whoami,

    /// Check that the server is up
    Health,
}

fn print_session(res: AuthResponse) {
    println!("logged in as {} ({})", res.user.username, res.user.id.0);
    println!("export THREADLINE_TOKEN={}", res.token.0);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    let client = match opt.token {
        Some(token) => Client::new(opt.host).with_token(AuthToken(token)),
        None => Client::new(opt.host),
    };

    match opt.cmd {
        Command::List { all } => {
            let thread = client.fetch_comments().await.context("fetching comments")?;
            let reveal = match all {
                true => RevealState::all(&thread),
                false => RevealState::new(),
            };
            print!("{}", ThreadView::render(&thread, &reveal, chrono::Utc::now()));
        }
        Command::Post { text, author } => {
            let c = client
                .create_comment(&NewComment::new(text, author))
                .await
                .context("posting comment")?;
            println!("posted comment {}", c.id);
        }
        Command::Reply { id, text, author } => {
            let c = client
                .reply(&CommentId(id), &NewReply::new(text, author))
                .await
                .context("posting reply")?;
            println!("posted reply {}", c.id);
        }
        Command::Like { id } => {
            let c = client
                .like(&CommentId(id))
                .await
                .context("toggling like")?;
            println!("comment {} now has {} likes", c.id, c.likes);
        }
        Command::Register { username, password } => {
            print_session(
                client
                    .register(&NewUser { username, password })
                    .await
                    .context("registering")?,
            );
        }
        Command::Login { username, password } => {
            print_session(
                client
                    .login(&NewSession { username, password })
                    .await
                    .context("logging in")?,
            );
        }
        Command::Whoami => {
            let user = client.whoami().await.context("fetching session user")?;
            println!("{} ({})", user.username, user.id.0);
        }
        Command::Health => {
            let health = client.health().await.context("checking server health")?;
            println!("{} at {}", health.status, health.timestamp);
        }
    }

    Ok(())
}
