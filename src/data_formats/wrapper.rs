use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::response::{CommentResponse, PostSummaryResponse};

#[derive(Debug, Deserialize, Serialize)]
pub struct BoardListWrapper {
    #[serde(rename = "게시판")]
    pub board_title: String,
    #[serde(rename = "현재페이지")]
    pub page: u32,
    #[serde(rename = "전체개수")]
    pub total_count: i64,
    #[serde(rename = "전체페이지")]
    pub total_pages: i64,
    #[serde(rename = "게시글")]
    pub posts: Vec<PostSummaryResponse>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultipleCommentsWrapper {
    pub count: usize,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HealthWrapper {
    pub message: String,
    pub server: ServerInfoResponse,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerInfoResponse {
    pub status: String,
    pub version: String,
    #[serde(rename = "startTime")]
    pub start_time: String,
    pub database: DatabaseInfoResponse,
    pub boards: BTreeMap<String, String>,
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DatabaseInfoResponse {
    pub status: String,
    pub host: String,
    pub name: String,
}

pub fn total_pages(total_count: i64, page_size: u32) -> i64 {
    if total_count <= 0 || page_size == 0 {
        return 0;
    }
    let page_size = i64::from(page_size);
    (total_count + page_size - 1) / page_size
}
