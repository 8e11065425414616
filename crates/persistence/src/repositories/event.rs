//! Event repository for database operations.

use std::collections::HashSet;

use domain::models::{EventData, PublishStatus};
use sqlx::PgPool;
use uuid::Uuid;

use super::location::next_free_slug;
use crate::entities::EventEntity;
use crate::metrics::QueryTimer;

const TABLE: &str = "events";

/// Repository for event database operations.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_hash(&self, import_hash: &str) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "find_by_hash");
        let result = sqlx::query_as::<_, EventEntity>("SELECT * FROM events WHERE import_hash = $1")
            .bind(import_hash)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Picks a slug not yet used by any event.
    pub async fn unique_slug(&self, base: &str) -> Result<String, sqlx::Error> {
        let base = if base.is_empty() { "item" } else { base };
        let timer = QueryTimer::new(TABLE, "slugs_like");
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT slug FROM events WHERE slug = $1 OR slug LIKE $1 || '-%'
            "#,
        )
        .bind(base)
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        let taken: HashSet<String> = rows.into_iter().map(|(slug,)| slug).collect();
        Ok(next_free_slug(base, &taken))
    }

    pub async fn insert(
        &self,
        slug: &str,
        import_hash: &str,
        status: PublishStatus,
        owner_id: Uuid,
        data: &EventData,
        geocoding_info: Option<&serde_json::Value>,
    ) -> Result<EventEntity, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "insert");
        let point = data.point;
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            INSERT INTO events (
                slug, import_hash, status, owner_id, event_id,
                title_de, title_en, description_de, description_en,
                street1, street2, house_number, post_code, city,
                phone, email, website, begins_at, ends_at, location_id,
                term_ids, lat, lng, geocoding_info
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24)
            RETURNING *
            "#,
        )
        .bind(slug)
        .bind(import_hash)
        .bind(status.as_str())
        .bind(owner_id)
        .bind(&data.event_id)
        .bind(&data.title.de)
        .bind(&data.title.en)
        .bind(&data.description.de)
        .bind(&data.description.en)
        .bind(&data.address.street1)
        .bind(&data.address.street2)
        .bind(&data.address.house_number)
        .bind(&data.address.post_code)
        .bind(&data.address.city)
        .bind(&data.contact.phone)
        .bind(&data.contact.email)
        .bind(&data.contact.website)
        .bind(data.begins_at)
        .bind(data.ends_at)
        .bind(data.location_id)
        .bind(&data.term_ids)
        .bind(point.map(|p| p.lat))
        .bind(point.map(|p| p.lng))
        .bind(geocoding_info)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Overwrites the imported content. `geocoding_info = None` keeps the stored one.
    pub async fn update(
        &self,
        id: Uuid,
        status: PublishStatus,
        data: &EventData,
        geocoding_info: Option<&serde_json::Value>,
    ) -> Result<EventEntity, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "update");
        let point = data.point;
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            UPDATE events
            SET status = $2, event_id = $3,
                title_de = $4, title_en = $5, description_de = $6, description_en = $7,
                street1 = $8, street2 = $9, house_number = $10, post_code = $11, city = $12,
                phone = $13, email = $14, website = $15,
                begins_at = $16, ends_at = $17, location_id = $18,
                term_ids = $19, lat = $20, lng = $21,
                geocoding_info = COALESCE($22, geocoding_info),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(&data.event_id)
        .bind(&data.title.de)
        .bind(&data.title.en)
        .bind(&data.description.de)
        .bind(&data.description.en)
        .bind(&data.address.street1)
        .bind(&data.address.street2)
        .bind(&data.address.house_number)
        .bind(&data.address.post_code)
        .bind(&data.address.city)
        .bind(&data.contact.phone)
        .bind(&data.contact.email)
        .bind(&data.contact.website)
        .bind(data.begins_at)
        .bind(data.ends_at)
        .bind(data.location_id)
        .bind(&data.term_ids)
        .bind(point.map(|p| p.lat))
        .bind(point.map(|p| p.lng))
        .bind(geocoding_info)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Events for an export, ordered by start. Empty `term_ids` does not filter by term.
    pub async fn list_for_export(
        &self,
        statuses: &[String],
        term_ids: &[Uuid],
    ) -> Result<Vec<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "list_for_export");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            SELECT * FROM events
            WHERE status = ANY($1)
              AND (cardinality($2::uuid[]) = 0 OR term_ids && $2)
            ORDER BY begins_at NULLS LAST, id
            "#,
        )
        .bind(statuses)
        .bind(term_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
