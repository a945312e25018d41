//! Inline HTML for the index, welcome and error pages.

use crate::feed::{index_location, FeedView};
use crate::reddit::Post;
use chrono::{DateTime, Utc};
use std::borrow::Cow;

const STYLE: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
           margin: 0; background: #1f2937; color: #e5e7eb; }
    nav { display: flex; justify-content: space-between; align-items: center;
          padding: 1.5rem; background: #111827; }
    nav .brand { font-weight: 600; font-size: 1.25rem; }
    a { color: #6ee7b7; }
    main { max-width: 72rem; margin: 0 auto; padding: 2rem 1rem; }
    .post { display: flex; gap: 1rem; background: #374151; border-radius: 8px;
            overflow: hidden; margin-bottom: 2rem; }
    .post img { width: 40%; max-height: 20rem; object-fit: cover; }
    .post .body { padding: 1rem; }
    .post .meta { color: #9ca3af; }
    .pager { text-align: center; margin: 2rem 0; }
    .welcome { text-align: center; padding: 4rem 1rem; }
    .error { text-align: center; padding: 4rem 1rem; }
"#;

fn document(title: &str, nav_right: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width,initial-scale=1">
    <meta name="description" content="A barebones reddit client">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
    <nav><span class="brand">Remixitt</span><span>{nav_right}</span></nav>
    <main>{content}</main>
</body>
</html>"#,
        title = escape(title),
        style = STYLE,
        nav_right = nav_right,
        content = content,
    )
}

/// Render the index page: the feed when logged in, the welcome view otherwise
pub fn render_index(view: &FeedView, login_url: &str, now: DateTime<Utc>) -> String {
    if !view.logged_in {
        let nav = format!(r#"<a href="{}">Login</a>"#, escape(login_url));
        return document("Remixitt", &nav, &render_welcome(login_url));
    }

    let nav = r#"<a href="/logout">Logout</a>"#;

    if view.posts.is_empty() {
        let content = r#"<p class="pager">You've reached the end of the feed. <a href="/">Back to the top</a></p>"#;
        return document("Remixitt", nav, content);
    }

    let posts: String = view.posts.iter().map(|p| render_post(p, now)).collect();
    let pager = render_pager(view.next_cursor.as_deref());

    document(
        "Remixitt",
        nav,
        &format!("{pager}<section>{posts}</section>{pager}"),
    )
}

fn render_welcome(login_url: &str) -> String {
    format!(
        r#"<div class="welcome">
    <h1>Welcome To Remixitt</h1>
    <h2>A Simpler way to use Reddit</h2>
    <p><a href="{login}">Full speed ahead</a> &middot; <a href="https://reddit.com/" target="_blank">Take me to Reddit instead</a></p>
</div>"#,
        login = escape(login_url)
    )
}

fn render_pager(next_cursor: Option<&str>) -> String {
    let next = next_cursor
        .map(|cursor| {
            format!(
                r#" <a href="{}">Next &rsaquo;</a>"#,
                escape(&index_location(Some(cursor)))
            )
        })
        .unwrap_or_default();

    format!(r#"<div class="pager"><a href="javascript:history.back()">&lsaquo; Back</a>{next}</div>"#)
}

fn render_post(post: &Post, now: DateTime<Utc>) -> String {
    let image = post
        .display_thumbnail()
        .map(|src| format!(r#"<img src="{}" alt="photo">"#, escape(src)))
        .unwrap_or_default();

    // selftext_html is Reddit's own rendering of the post body and is
    // inserted as-is once its entity encoding is undone.
    let body = match (&post.selftext_html, post.is_text_post()) {
        (Some(html), true) => format!(r#"<article>{}</article>"#, decode_entities(html)),
        _ => String::new(),
    };

    format!(
        r#"<div class="post">{image}<div class="body">
    <p><a href="{url}" target="_blank"><strong>{title}</strong></a></p>
    <p class="meta"><a href="https://reddit.com/r/{sub}">r/{sub_text}</a> &bull; Posted by <a href="https://reddit.com/u/{author}">u/{author_text}</a> &bull; {age}</p>
    {body}
</div></div>"#,
        image = image,
        url = escape(&post.url),
        title = escape(&decode_entities(&post.title)),
        sub = escape(&post.subreddit),
        sub_text = escape(&post.subreddit),
        author = escape(&post.author),
        author_text = escape(&post.author),
        age = escape(&post.age_label(now)),
        body = body,
    )
}

/// Error page body
pub fn render_error(title: &str, message: &str) -> String {
    let content = format!(
        r#"<div class="error"><h1>{}</h1><p>{}</p><p><a href="/">Back to Remixitt</a></p></div>"#,
        escape(title),
        escape(message)
    );
    document(title, r#"<a href="/login">Login</a>"#, &content)
}

/// Escape for both element text and quoted attribute values
fn escape(input: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(input)
}

/// Undo the entity encoding Reddit applies to titles and selftext_html,
/// one level only
fn decode_entities(input: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(input)
}
