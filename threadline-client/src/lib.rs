mod avatar;
pub use avatar::Avatar;

mod client;
pub use client::Client;

mod time;
pub use time::format_time_ago;

mod view;
pub use view::{CommentView, RevealState, ThreadView, MAX_REPLY_DEPTH, VISIBLE_REPLIES};

pub mod api {
    pub use threadline_api::*;
}
