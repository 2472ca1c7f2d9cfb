use crate::{
    boards::BoardType,
    errors::RequestError,
    models::{Post, PostRow, PostSummary, PostSummaryRow},
};

use super::BoardRepository;

// Table names come from `BoardType::table_name`, which only returns literals.

fn count_posts_query(board: BoardType) -> String {
    format!(
        "SELECT COUNT(*) FROM {} WHERE wr_is_comment = 0",
        board.table_name()
    )
}

fn list_posts_query(board: BoardType) -> String {
    format!(
        r#"
        SELECT wr_id,
               wr_subject,
               wr_name,
               CAST(wr_datetime AS CHAR) AS wr_datetime,
               COALESCE(wr_hit, 0)       AS wr_hit,
               COALESCE(wr_good, 0)      AS wr_good,
               COALESCE(wr_comment, 0)   AS wr_comment
          FROM {}
         WHERE wr_is_comment = 0
         ORDER BY wr_datetime DESC, wr_id DESC
         LIMIT ? OFFSET ?
        "#,
        board.table_name()
    )
}

fn get_post_query(board: BoardType) -> String {
    format!(
        r#"
        SELECT wr_id,
               wr_subject,
               wr_name,
               CAST(wr_datetime AS CHAR) AS wr_datetime,
               COALESCE(wr_hit, 0)       AS wr_hit,
               COALESCE(wr_good, 0)      AS wr_good,
               wr_content
          FROM {}
         WHERE wr_id = ? AND wr_is_comment = 0
        "#,
        board.table_name()
    )
}

fn increment_hit_query(board: BoardType) -> String {
    format!(
        "UPDATE {} SET wr_hit = wr_hit + 1 WHERE wr_id = ?",
        board.table_name()
    )
}

pub fn page_offset(page: u32, page_size: u32) -> i64 {
    i64::from(page.saturating_sub(1)).saturating_mul(i64::from(page_size))
}

impl BoardRepository {
    /// One page of posts, newest first, plus the number of posts on the board.
    pub async fn list_posts(
        &self,
        board: BoardType,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<PostSummary>, i64), RequestError> {
        if page < 1 || page_size < 1 {
            return Err(RequestError::InvalidQuery);
        }
        let mut tx = self.pool.begin().await?;
        let total = sqlx::query_scalar::<_, i64>(&count_posts_query(board))
            .fetch_one(&mut *tx)
            .await?;
        let posts = sqlx::query_as::<_, PostSummaryRow>(&list_posts_query(board))
            .bind(i64::from(page_size))
            .bind(page_offset(page, page_size))
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(PostSummary::from)
            .collect();
        tx.commit().await?;
        Ok((posts, total))
    }

    /// Fetches a post and counts the view. The returned hit count includes this
    /// view even when the stored counter could not be updated.
    pub async fn get_post(&self, board: BoardType, id: i64) -> Result<Post, RequestError> {
        let row = sqlx::query_as::<_, PostRow>(&get_post_query(board))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let mut post = match row {
            Some(row) => Post::from(row),
            None => return Err(RequestError::NotFound),
        };

        if let Err(e) = self.increment_hit(board, post.id).await {
            tracing::warn!(board = %board, post_id = post.id, error = %e, "Failed to increment hit count");
        }
        post.hit += 1;
        Ok(post)
    }

    pub async fn increment_hit(&self, board: BoardType, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(&increment_hit_query(board))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(u32::MAX, u32::MAX), i64::MAX);
        assert_eq!(page_offset(0, 20), 0);
    }

    #[test]
    fn test_queries_target_the_board_table() {
        for board in BoardType::ALL {
            for query in [
                count_posts_query(board),
                list_posts_query(board),
                get_post_query(board),
                increment_hit_query(board),
            ] {
                assert!(query.contains(board.table_name()));
            }
        }
    }

    #[test]
    fn test_post_queries_skip_comment_rows() {
        let board = BoardType::Free;
        assert!(count_posts_query(board).contains("wr_is_comment = 0"));
        assert!(list_posts_query(board).contains("wr_is_comment = 0"));
        assert!(get_post_query(board).contains("wr_is_comment = 0"));
    }
}
