use crate::{
    boards::BoardType,
    errors::RequestError,
    models::{Comment, CommentRow},
};

use super::BoardRepository;

fn list_comments_query(board: BoardType) -> String {
    format!(
        r#"
        SELECT wr_id,
               wr_name,
               wr_content,
               CAST(wr_datetime AS CHAR) AS wr_datetime
          FROM {}
         WHERE wr_is_comment = 1 AND wr_parent = ?
         ORDER BY wr_datetime ASC, wr_id ASC
        "#,
        board.table_name()
    )
}

impl BoardRepository {
    /// Comments under a post in creation order. A post without comments, or
    /// an id that matches nothing, yields an empty list.
    pub async fn list_comments(
        &self,
        board: BoardType,
        parent_id: i64,
    ) -> Result<Vec<Comment>, RequestError> {
        let comments = sqlx::query_as::<_, CommentRow>(&list_comments_query(board))
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Comment::from)
            .collect();
        Ok(comments)
    }
}
