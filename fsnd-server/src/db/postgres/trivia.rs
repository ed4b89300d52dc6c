use async_trait::async_trait;
use sqlx::FromRow;

use super::{like_pattern, PgStore};
use crate::db::store::{StoreError, StoreResult, TriviaStore};
use crate::models::{Category, NewQuestion, Page, Paginated, Question};

const QUESTION_SELECT: &str = r#"
    SELECT
        q.id,
        q.question,
        q.answer,
        q.difficulty,
        q.category_id,
        c.type AS category_type
    FROM questions q
    JOIN categories c ON c.id = q.category_id
"#;

#[derive(FromRow)]
struct QuestionRow {
    id: i32,
    question: String,
    answer: String,
    difficulty: i32,
    category_id: i32,
    category_type: String,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Self {
            id: row.id,
            question: row.question,
            answer: row.answer,
            difficulty: row.difficulty,
            category: Category {
                id: row.category_id,
                kind: row.category_type,
            },
        }
    }
}

#[async_trait]
impl TriviaStore for PgStore {
    async fn categories(&self) -> StoreResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, type FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn category(&self, id: i32) -> StoreResult<Category> {
        sqlx::query_as::<_, Category>("SELECT id, type FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("category", id))
    }

    async fn create_category(&self, kind: String) -> StoreResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (type) VALUES ($1) RETURNING id, type",
        )
        .bind(&kind)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(category_id = category.id, "category created");
        Ok(category)
    }

    async fn delete_category(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("category", id));
        }
        Ok(())
    }

    async fn questions_page(&self, page: Page) -> StoreResult<Paginated<Question>> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await?;

        let sql = format!("{} ORDER BY q.id LIMIT $1 OFFSET $2", QUESTION_SELECT);
        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(i64::from(page.limit()))
            .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        Ok(Paginated {
            items: rows.into_iter().map(Question::from).collect(),
            total,
            page: page.number(),
        })
    }

    async fn questions_in_category(&self, id: i32) -> StoreResult<Vec<Question>> {
        let sql = format!("{} WHERE q.category_id = $1 ORDER BY q.id", QUESTION_SELECT);
        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Question::from).collect())
    }

    async fn search_questions(&self, term: &str) -> StoreResult<Vec<Question>> {
        let sql = format!("{} WHERE q.question ILIKE $1 ORDER BY q.id", QUESTION_SELECT);
        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(like_pattern(term))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Question::from).collect())
    }

    async fn create_question(&self, question: NewQuestion) -> StoreResult<Question> {
        let mut tx = self.pool.begin().await?;

        let category = sqlx::query_as::<_, Category>(
            "SELECT id, type FROM categories WHERE id = $1 FOR SHARE",
        )
        .bind(question.category_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::unknown_reference("category", question.category_id))?;

        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO questions (question, answer, difficulty, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.difficulty)
        .bind(question.category_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        let created = question.into_question(id, category);
        tracing::debug!(question_id = created.id, "question created");
        Ok(created)
    }

    async fn delete_question(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("question", id));
        }
        Ok(())
    }

    async fn quiz_candidates(
        &self,
        category: Option<i32>,
        exclude: &[i32],
    ) -> StoreResult<Vec<Question>> {
        let sql = format!(
            r#"
            {}
            WHERE ($1::INTEGER IS NULL OR q.category_id = $1)
              AND NOT (q.id = ANY($2))
            ORDER BY q.id
            "#,
            QUESTION_SELECT
        );
        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(category)
            .bind(exclude)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Question::from).collect())
    }
}
