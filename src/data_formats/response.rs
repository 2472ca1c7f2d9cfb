use serde::{Deserialize, Serialize};

use crate::models::{format_datetime, Comment, Post, PostSummary};

// Field names are what the existing board front-end reads.

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PostSummaryResponse {
    pub id: i64,
    #[serde(rename = "제목")]
    pub subject: String,
    #[serde(rename = "이름")]
    pub author: String,
    #[serde(rename = "날짜")]
    pub written_at: String,
    #[serde(rename = "조회")]
    pub hit: i64,
    #[serde(rename = "추천")]
    pub good: i64,
    #[serde(rename = "댓글수")]
    pub comment_count: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PostResponse {
    pub id: i64,
    #[serde(rename = "제목")]
    pub subject: String,
    #[serde(rename = "이름")]
    pub author: String,
    #[serde(rename = "날짜")]
    pub written_at: String,
    #[serde(rename = "조회")]
    pub hit: i64,
    #[serde(rename = "추천")]
    pub good: i64,
    #[serde(rename = "내용")]
    pub content: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CommentResponse {
    pub id: i64,
    #[serde(rename = "이름")]
    pub author: String,
    #[serde(rename = "내용")]
    pub content: String,
    #[serde(rename = "날짜")]
    pub written_at: String,
}

impl From<PostSummary> for PostSummaryResponse {
    fn from(
        PostSummary {
            id,
            subject,
            author,
            written_at,
            hit,
            good,
            comment_count,
        }: PostSummary,
    ) -> Self {
        PostSummaryResponse {
            id,
            subject,
            author,
            written_at: format_datetime(&written_at),
            hit,
            good,
            comment_count,
        }
    }
}

impl From<Post> for PostResponse {
    fn from(
        Post {
            id,
            subject,
            author,
            written_at,
            hit,
            good,
            content,
        }: Post,
    ) -> Self {
        PostResponse {
            id,
            subject,
            author,
            written_at: format_datetime(&written_at),
            hit,
            good,
            content,
        }
    }
}

impl From<Comment> for CommentResponse {
    fn from(
        Comment {
            id,
            author,
            content,
            written_at,
        }: Comment,
    ) -> Self {
        CommentResponse {
            id,
            author,
            content,
            written_at: format_datetime(&written_at),
        }
    }
}
