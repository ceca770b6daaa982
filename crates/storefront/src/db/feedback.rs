//! Reviews and questions shown on the product page.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mercadillo_core::{ProductId, Question, QuestionId, Review, ReviewId};

use super::RepositoryError;

/// Most reviews or questions rendered on one product page.
pub const PAGE_LIMIT: i64 = 20;

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    name: String,
    rating: i16,
    comment: String,
    helpful: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct QuestionRow {
    id: QuestionId,
    product_id: ProductId,
    question: String,
    answer: Option<String>,
    answered_by_ia: bool,
    helpful: i32,
    created_at: DateTime<Utc>,
}

/// Repository for product reviews and questions.
pub struct FeedbackRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FeedbackRepository<'a> {
    /// Create a new feedback repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Approved reviews of a product, most helpful first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn approved_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT id, product_id, name, rating, comment, helpful, created_at
            FROM storefront.review
            WHERE product_id = $1 AND status = 'approved'
            ORDER BY helpful DESC, created_at DESC
            LIMIT $2
            ",
        )
        .bind(product_id)
        .bind(PAGE_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Review {
                id: r.id,
                product_id: r.product_id,
                name: r.name,
                rating: r.rating,
                comment: r.comment,
                helpful: r.helpful,
                created_at: r.created_at,
            })
            .collect())
    }

    /// Answered questions of a product, most helpful first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if an answered question has no answer.
    pub async fn answered_questions(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Question>, RepositoryError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r"
            SELECT id, product_id, question, answer, answered_by_ia, helpful, created_at
            FROM storefront.question
            WHERE product_id = $1 AND status = 'answered'
            ORDER BY helpful DESC, created_at DESC
            LIMIT $2
            ",
        )
        .bind(product_id)
        .bind(PAGE_LIMIT)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let answer = r.answer.ok_or_else(|| {
                    RepositoryError::DataCorruption(format!("question {} is answered without an answer", r.id))
                })?;
                Ok(Question {
                    id: r.id,
                    product_id: r.product_id,
                    question: r.question,
                    answer,
                    answered_by_ia: r.answered_by_ia,
                    helpful: r.helpful,
                    created_at: r.created_at,
                })
            })
            .collect()
    }
}
