use crate::api::Time;

/// Human-friendly age of `timestamp` as seen at `now`
pub fn format_time_ago(timestamp: Time, now: Time) -> String {
    let seconds = (now - timestamp).num_seconds();
    if seconds < 60 {
        return String::from("just now");
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes} min ago");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hr ago");
    }

    let days = hours / 24;
    if days < 7 {
        return format!("{days} day{} ago", plural(days));
    }

    let weeks = days / 7;
    if weeks < 4 {
        return format!("{weeks} week{} ago", plural(weeks));
    }

    timestamp.format("%Y-%m-%d").to_string()
}

fn plural(n: i64) -> &'static str {
    match n {
        1 => "",
        _ => "s",
    }
}
