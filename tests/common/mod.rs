#![allow(dead_code)]

use std::net::TcpListener;

use board_api::{
    boards::{BoardRegistry, BoardType},
    make_router, run_app_with_shutdown, AppContext, BoardRepository, ServerInfo,
};
use sqlx::{any::AnyPoolOptions, AnyPool};

pub struct TestPost<'a> {
    pub id: i64,
    pub subject: &'a str,
    pub name: &'a str,
    pub datetime: &'a str,
    pub hit: i64,
    pub good: i64,
    pub content: &'a str,
}

impl Default for TestPost<'_> {
    fn default() -> Self {
        TestPost {
            id: 1,
            subject: "subject",
            name: "writer",
            datetime: "2024-01-01 00:00:00",
            hit: 0,
            good: 0,
            content: "content",
        }
    }
}

/// A single-connection pool, since every SQLite `:memory:` connection is its
/// own database.
pub async fn memory_pool() -> AnyPool {
    sqlx::any::install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    for board in BoardType::ALL {
        let create = format!(
            r#"
            CREATE TABLE {} (
                wr_id         INTEGER PRIMARY KEY,
                wr_parent     INTEGER NOT NULL DEFAULT 0,
                wr_is_comment INTEGER NOT NULL DEFAULT 0,
                wr_comment    INTEGER NOT NULL DEFAULT 0,
                wr_subject    TEXT,
                wr_content    TEXT,
                wr_name       TEXT,
                wr_datetime   TEXT,
                wr_hit        INTEGER NOT NULL DEFAULT 0,
                wr_good       INTEGER NOT NULL DEFAULT 0
            )
            "#,
            board.table_name()
        );
        sqlx::query(&create).execute(&pool).await.unwrap();
    }
    pool
}

pub async fn insert_post(pool: &AnyPool, board: BoardType, post: TestPost<'_>) {
    let insert = format!(
        r#"
        INSERT INTO {} (wr_id, wr_parent, wr_is_comment, wr_subject, wr_name, wr_datetime, wr_hit, wr_good, wr_content)
        VALUES (?, ?, 0, ?, ?, ?, ?, ?, ?)
        "#,
        board.table_name()
    );
    sqlx::query(&insert)
        .bind(post.id)
        .bind(post.id)
        .bind(post.subject)
        .bind(post.name)
        .bind(post.datetime)
        .bind(post.hit)
        .bind(post.good)
        .bind(post.content)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn insert_comment(
    pool: &AnyPool,
    board: BoardType,
    id: i64,
    parent_id: i64,
    name: &str,
    datetime: &str,
    content: &str,
) {
    let insert = format!(
        r#"
        INSERT INTO {} (wr_id, wr_parent, wr_is_comment, wr_subject, wr_name, wr_datetime, wr_content)
        VALUES (?, ?, 1, '', ?, ?, ?)
        "#,
        board.table_name()
    );
    sqlx::query(&insert)
        .bind(id)
        .bind(parent_id)
        .bind(name)
        .bind(datetime)
        .bind(content)
        .execute(pool)
        .await
        .unwrap();
    let bump = format!(
        "UPDATE {} SET wr_comment = wr_comment + 1 WHERE wr_id = ?",
        board.table_name()
    );
    sqlx::query(&bump)
        .bind(parent_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn stored_hit(pool: &AnyPool, board: BoardType, id: i64) -> i64 {
    let select = format!("SELECT wr_hit FROM {} WHERE wr_id = ?", board.table_name());
    sqlx::query_scalar::<_, i64>(&select)
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn context(pool: AnyPool, registry: BoardRegistry) -> AppContext {
    AppContext {
        repository: BoardRepository::new(pool),
        registry,
        server_info: ServerInfo::new("localhost", "board_test"),
    }
}

/// Serves the app on an ephemeral port and returns its base url.
pub fn spawn_app(context: AppContext) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(run_app_with_shutdown(
        make_router(),
        context,
        listener,
        std::future::pending(),
    ));
    format!("http://{addr}")
}

pub async fn spawn_with_pool(pool: AnyPool) -> String {
    spawn_app(context(pool, BoardRegistry::default()))
}

pub async fn execute(pool: &AnyPool, sql: &str) {
    sqlx::query(sql).execute(pool).await.unwrap();
}

/// SQLite storage class of a stored value, e.g. `null`, `text` or `blob`.
pub async fn storage_type(pool: &AnyPool, board: BoardType, column: &str, id: i64) -> String {
    let select = format!(
        "SELECT typeof({column}) FROM {} WHERE wr_id = ?",
        board.table_name()
    );
    sqlx::query_scalar::<_, String>(&select)
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}
