use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{rejection::QueryRejection, Path, Query},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Extension, Json,
};

use crate::{
    boards::BoardType,
    data_formats::{
        total_pages, BoardListWrapper, CommentResponse, DatabaseInfoResponse, HealthWrapper,
        ListQueryParams, MultipleCommentsWrapper, PostResponse, PostSummaryResponse,
        ServerInfoResponse,
    },
    errors::{RequestError, RequestErrorJson},
    pages::render_error,
    AppContext,
};

type JsonResult<T> = Result<Json<T>, RequestError>;

const NOT_FOUND_MESSAGE: &str = "요청하신 페이지를 찾을 수 없습니다";

// ----------------- Helper Functions -----------------

pub fn resolve_board(ctx: &AppContext, key: &str) -> Result<BoardType, RequestError> {
    ctx.registry.resolve(key).ok_or(RequestError::InvalidBoard)
}

pub fn parse_post_id(id: &str) -> Result<i64, RequestError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(RequestError::InvalidPostId);
    }
    id.parse().map_err(|_| RequestError::InvalidPostId)
}

pub fn list_params(
    query: Result<Query<ListQueryParams>, QueryRejection>,
) -> Result<ListQueryParams, RequestError> {
    let Query(params) = query.map_err(|e| {
        tracing::debug!("Rejected list query: {e}");
        RequestError::InvalidQuery
    })?;
    params.validated().ok_or(RequestError::InvalidQuery)
}

fn accept_header(headers: &HeaderMap) -> &str {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// True when the client asks for JSON and not for HTML.
pub fn wants_json(headers: &HeaderMap) -> bool {
    let accept = accept_header(headers);
    accept.contains("application/json") && !accept.contains("text/html")
}

fn wants_html(headers: &HeaderMap) -> bool {
    accept_header(headers).contains("text/html")
}

// ----------------- Helper Handlers -----------------

pub async fn server_status(Extension(ctx): Extension<Arc<AppContext>>) -> Json<HealthWrapper> {
    let database_status = match ctx.repository.ping().await {
        Ok(()) => "연결 성공",
        Err(e) => {
            tracing::error!(error = %e, "Database ping failed");
            "연결 실패"
        }
    };

    let boards = ctx
        .registry
        .titles()
        .into_iter()
        .map(|(key, title)| (key.to_string(), title.to_string()))
        .collect();
    let endpoints = BTreeMap::from([
        ("boards".to_string(), "/api/:type".to_string()),
        ("post".to_string(), "/api/:type/:id".to_string()),
        ("comments".to_string(), "/api/:type/:id/comments".to_string()),
    ]);

    Json(HealthWrapper {
        message: "Board API Server".into(),
        server: ServerInfoResponse {
            status: "정상 작동 중".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            start_time: ctx.server_info.start_time.clone(),
            database: DatabaseInfoResponse {
                status: database_status.into(),
                host: ctx.server_info.db_host.clone(),
                name: ctx.server_info.db_name.clone(),
            },
            boards,
            endpoints,
        },
    })
}

pub async fn not_found(uri: Uri, headers: HeaderMap) -> Response {
    tracing::debug!("No route for {uri}");
    if wants_html(&headers) {
        return (
            StatusCode::NOT_FOUND,
            Html(render_error(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)),
        )
            .into_response();
    }
    (
        StatusCode::NOT_FOUND,
        Json(RequestErrorJson::new(NOT_FOUND_MESSAGE)),
    )
        .into_response()
}

// ----------------- Board Handlers -----------------

pub async fn list_posts(
    Extension(ctx): Extension<Arc<AppContext>>,
    Path(board): Path<String>,
    query: Result<Query<ListQueryParams>, QueryRejection>,
) -> JsonResult<BoardListWrapper> {
    let board = resolve_board(&ctx, &board)?;
    let params = list_params(query)?;
    let (posts, total_count) = ctx
        .repository
        .list_posts(board, params.page, params.limit)
        .await?;

    Ok(Json(BoardListWrapper {
        board_title: board.title().into(),
        page: params.page,
        total_count,
        total_pages: total_pages(total_count, params.limit),
        posts: posts.into_iter().map(PostSummaryResponse::from).collect(),
    }))
}

pub async fn get_post(
    Extension(ctx): Extension<Arc<AppContext>>,
    Path((board, id)): Path<(String, String)>,
) -> JsonResult<PostResponse> {
    let board = resolve_board(&ctx, &board)?;
    let id = parse_post_id(&id)?;
    let post = ctx.repository.get_post(board, id).await?;
    Ok(Json(PostResponse::from(post)))
}

// ----------------- Comment Handlers -----------------

pub async fn list_comments(
    Extension(ctx): Extension<Arc<AppContext>>,
    Path((board, id)): Path<(String, String)>,
) -> JsonResult<MultipleCommentsWrapper> {
    let board = resolve_board(&ctx, &board)?;
    let id = parse_post_id(&id)?;
    let comments: Vec<CommentResponse> = ctx
        .repository
        .list_comments(board, id)
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();

    Ok(Json(MultipleCommentsWrapper {
        count: comments.len(),
        comments,
    }))
}
