use std::{fmt::Write, sync::Arc};

use axum::{
    extract::{rejection::QueryRejection, Path, Query},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Extension, Json,
};

use crate::{
    boards::BoardType,
    data_formats::{total_pages, ListQueryParams, PostResponse},
    errors::RequestError,
    handlers::{list_params, parse_post_id, resolve_board, wants_json},
    models::{format_datetime, Comment, Post, PostSummary},
    AppContext,
};

const LAYOUT_TEMPLATE: &str = include_str!("../templates/layout.html");
const BOARD_LIST_TEMPLATE: &str = include_str!("../templates/board_list.html");
const POST_VIEW_TEMPLATE: &str = include_str!("../templates/post_view.html");
const ERROR_TEMPLATE: &str = include_str!("../templates/error.html");

/// Fills `{{key}}` placeholders in a single pass, so values that happen to
/// contain placeholder syntax are left alone. Unknown keys render empty.
pub fn render_template(template: &str, data: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                if let Some((_, value)) = data.iter().find(|(k, _)| *k == key) {
                    result.push_str(value);
                }
                rest = &after[end + 2..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn escape_multiline(value: &str) -> String {
    escape_html(value).replace("\r\n", "\n").replace('\n', "<br>\n")
}

fn render_page(page_title: &str, body: &str) -> String {
    render_template(
        LAYOUT_TEMPLATE,
        &[("page_title", &escape_html(page_title)), ("body", body)],
    )
}

pub fn render_board_list(
    board: BoardType,
    params: ListQueryParams,
    posts: &[PostSummary],
    total_count: i64,
) -> String {
    let mut rows = String::new();
    for post in posts {
        let comment_badge = if post.comment_count > 0 {
            format!(
                r#" <span class="comment-count">[{}]</span>"#,
                post.comment_count
            )
        } else {
            String::new()
        };
        let _ = writeln!(
            rows,
            r#"        <tr>
            <td class="text-center">{id}</td>
            <td><a href="/{key}/{id}" class="title-link">{subject}</a>{comment_badge}</td>
            <td class="text-center">{author}</td>
            <td class="text-center">{date}</td>
            <td class="text-center">{hit}</td>
            <td class="text-center">{good}</td>
        </tr>"#,
            id = post.id,
            key = board.key(),
            subject = escape_html(&post.subject),
            author = escape_html(&post.author),
            date = format_datetime(&post.written_at),
            hit = post.hit,
            good = post.good,
        );
    }
    if posts.is_empty() {
        rows.push_str(r#"        <tr><td colspan="6" class="text-center">게시글이 없습니다.</td></tr>"#);
    }

    let body = render_template(
        BOARD_LIST_TEMPLATE,
        &[
            ("board_key", board.key()),
            ("board_title", board.title()),
            ("total_count", &total_count.to_string()),
            ("rows", &rows),
            (
                "pagination",
                &render_pagination(board, params, total_pages(total_count, params.limit)),
            ),
        ],
    );
    render_page(board.title(), &body)
}

/// Number of page links shown around the current page.
const PAGINATION_WINDOW: i64 = 10;

fn render_pagination(board: BoardType, params: ListQueryParams, pages: i64) -> String {
    let current = i64::from(params.page);
    let page_link = |links: &mut String, page: i64, label: &str| {
        let _ = write!(
            links,
            r#"<a href="/{}?page={page}&amp;limit={}">{label}</a>"#,
            board.key(),
            params.limit
        );
    };

    let mut links = String::new();
    if pages < 1 {
        return links;
    }
    let first = current.saturating_sub(PAGINATION_WINDOW / 2).max(1);
    let end = (first + PAGINATION_WINDOW - 1).min(pages);
    let start = (end - PAGINATION_WINDOW + 1).max(1);

    if current > 1 {
        page_link(&mut links, 1, "&laquo;");
        page_link(&mut links, (current - 1).min(pages), "&lsaquo;");
    }
    for page in start..=end {
        if page == current {
            let _ = write!(links, "<strong>{page}</strong>");
        } else {
            page_link(&mut links, page, &page.to_string());
        }
    }
    if current < pages {
        page_link(&mut links, current + 1, "&rsaquo;");
        page_link(&mut links, pages, "&raquo;");
    }
    links
}

pub fn render_post_view(board: BoardType, post: &Post, comments: &[Comment]) -> String {
    let mut comment_html = String::new();
    for comment in comments {
        let _ = writeln!(
            comment_html,
            r#"    <div class="comment" id="c_{id}">
        <p class="post-meta">{author} | {date}</p>
        <p>{content}</p>
    </div>"#,
            id = comment.id,
            author = escape_html(&comment.author),
            date = format_datetime(&comment.written_at),
            content = escape_multiline(&comment.content),
        );
    }

    let body = render_template(
        POST_VIEW_TEMPLATE,
        &[
            ("board_key", board.key()),
            ("board_title", board.title()),
            ("subject", &escape_html(&post.subject)),
            ("author", &escape_html(&post.author)),
            ("date", &format_datetime(&post.written_at)),
            ("hit", &post.hit.to_string()),
            ("good", &post.good.to_string()),
            ("content", &escape_multiline(&post.content)),
            ("comment_count", &comments.len().to_string()),
            ("comments", &comment_html),
        ],
    );
    render_page(&post.subject, &body)
}

pub fn render_error(status: StatusCode, message: &str) -> String {
    let body = render_template(
        ERROR_TEMPLATE,
        &[
            ("status", status.as_str()),
            ("message", &escape_html(message)),
        ],
    );
    render_page("오류가 발생했습니다", &body)
}

/// HTML counterpart of [`RequestError`] for the server-rendered routes.
pub struct PageError(pub RequestError);

impl From<RequestError> for PageError {
    fn from(value: RequestError) -> Self {
        PageError(value)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.0.report();
        let status = self.0.status_code();
        (status, Html(render_error(status, &self.0.to_string()))).into_response()
    }
}

// ----------------- Page Handlers -----------------

pub async fn board_list_page(
    Extension(ctx): Extension<Arc<AppContext>>,
    Path(board): Path<String>,
    query: Result<Query<ListQueryParams>, QueryRejection>,
) -> Result<Html<String>, PageError> {
    let board = resolve_board(&ctx, &board)?;
    let params = list_params(query)?;
    let (posts, total_count) = ctx
        .repository
        .list_posts(board, params.page, params.limit)
        .await?;
    Ok(Html(render_board_list(board, params, &posts, total_count)))
}

pub async fn post_view_page(
    Extension(ctx): Extension<Arc<AppContext>>,
    Path((board, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if wants_json(&headers) {
        return match load_post(&ctx, &board, &id).await {
            Ok((_, post)) => Json(PostResponse::from(post)).into_response(),
            Err(e) => e.into_response(),
        };
    }

    let result = async {
        let (board, post) = load_post(&ctx, &board, &id).await?;
        let comments = ctx.repository.list_comments(board, post.id).await?;
        Ok::<_, RequestError>(Html(render_post_view(board, &post, &comments)))
    }
    .await;

    match result {
        Ok(page) => page.into_response(),
        Err(e) => PageError(e).into_response(),
    }
}

async fn load_post(
    ctx: &AppContext,
    board: &str,
    id: &str,
) -> Result<(BoardType, Post), RequestError> {
    let board = resolve_board(ctx, board)?;
    let id = parse_post_id(id)?;
    let post = ctx.repository.get_post(board, id).await?;
    Ok((board, post))
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn sample_post() -> Post {
        Post {
            id: 7,
            subject: "<script>alert(1)</script>".into(),
            author: "kim & lee".into(),
            written_at: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
            hit: 10,
            good: 1,
            content: "first line\nsecond {{subject}} line".into(),
        }
    }

    #[test]
    fn test_render_template_single_pass() {
        let rendered = render_template(
            "<p>{{ a }}</p><p>{{b}}</p>{{missing}}{{",
            &[("a", "{{b}}"), ("b", "B")],
        );
        assert_eq!(rendered, "<p>{{b}}</p><p>B</p>{{");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_post_view_escapes_user_content() {
        let html = render_post_view(BoardType::Free, &sample_post(), &[]);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("kim &amp; lee"));
        assert!(html.contains("first line<br>\nsecond {{subject}} line"));
        assert!(html.contains("2024-01-02 03:04:05"));
        assert!(html.contains(r#"href="/free""#));
    }

    #[test]
    fn test_board_list_renders_rows_and_pagination() {
        let posts = vec![PostSummary {
            id: 3,
            subject: "hello".into(),
            author: "park".into(),
            written_at: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
            hit: 5,
            good: 0,
            comment_count: 2,
        }];
        let params = ListQueryParams { page: 2, limit: 1 };
        let html = render_board_list(BoardType::Notice, params, &posts, 3);
        assert!(html.contains("<title>공지사항</title>"));
        assert!(html.contains(r#"<a href="/notice/3" class="title-link">hello</a>"#));
        assert!(html.contains(r#"<span class="comment-count">[2]</span>"#));
        assert!(html.contains("<strong>2</strong>"));
        assert!(html.contains(r#"<a href="/notice?page=3&amp;limit=1">3</a>"#));
        assert!(html.contains(r#"<a href="/notice?page=1&amp;limit=1">&laquo;</a>"#));
        assert!(html.contains(r#"<a href="/notice?page=3&amp;limit=1">&raquo;</a>"#));
    }

    #[test]
    fn test_pagination_shows_a_window_of_pages() {
        let params = ListQueryParams { page: 1, limit: 1 };
        let html = render_board_list(BoardType::Free, params, &[], 2_000_000);
        assert!(html.len() < 10_000, "page is {} bytes", html.len());
        assert!(html.contains("<strong>1</strong>"));
        assert!(html.contains(r#"<a href="/free?page=10&amp;limit=1">10</a>"#));
        assert!(!html.contains(r#"<a href="/free?page=11&amp;limit=1">11</a>"#));
        assert!(html.contains(r#"<a href="/free?page=2&amp;limit=1">&rsaquo;</a>"#));
        assert!(html.contains(r#"<a href="/free?page=2000000&amp;limit=1">&raquo;</a>"#));
        assert!(!html.contains("&laquo;"));
    }

    #[test]
    fn test_pagination_window_follows_the_current_page() {
        let params = ListQueryParams { page: 50, limit: 20 };
        let pagination = render_pagination(BoardType::Free, params, 52);
        assert!(pagination.contains(r#"<a href="/free?page=43&amp;limit=20">43</a>"#));
        assert!(!pagination.contains(">42</a>"));
        assert!(pagination.contains("<strong>50</strong>"));
        assert!(pagination.contains(r#"<a href="/free?page=52&amp;limit=20">52</a>"#));
        assert!(pagination.contains(r#"<a href="/free?page=49&amp;limit=20">&lsaquo;</a>"#));
        assert!(pagination.contains(r#"<a href="/free?page=51&amp;limit=20">&rsaquo;</a>"#));
        assert_eq!(render_pagination(BoardType::Free, ListQueryParams::default(), 0), "");
    }

    #[test]
    fn test_empty_board_list() {
        let html = render_board_list(BoardType::Gallery, ListQueryParams::default(), &[], 0);
        assert!(html.contains("게시글이 없습니다."));
    }

    #[test]
    fn test_render_error() {
        let html = render_error(StatusCode::NOT_FOUND, "게시글을 찾을 수 없습니다");
        assert!(html.contains("<h1>404</h1>"));
        assert!(html.contains("게시글을 찾을 수 없습니다"));
    }
}
