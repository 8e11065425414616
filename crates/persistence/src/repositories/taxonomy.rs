//! Taxonomy term lookups.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TermEntity;
use crate::metrics::QueryTimer;

const TABLE: &str = "taxonomy_terms";

#[derive(Clone)]
pub struct TermRepository {
    pool: PgPool,
}

impl TermRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<TermEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "list_all");
        let result = sqlx::query_as::<_, TermEntity>(
            r#"
            SELECT id, taxonomy, slug, name_de, name_en
            FROM taxonomy_terms
            ORDER BY taxonomy, slug
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Ids of the terms with the given slugs in any taxonomy.
    pub async fn ids_by_slugs(&self, slugs: &[String]) -> Result<Vec<Uuid>, sqlx::Error> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new(TABLE, "ids_by_slugs");
        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM taxonomy_terms WHERE slug = ANY($1)")
            .bind(slugs)
            .fetch_all(&self.pool)
            .await?;
        timer.record();
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
