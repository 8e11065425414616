//! Location repository for database operations.

use std::collections::{HashMap, HashSet};

use domain::models::{LocationData, PublishStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::LocationEntity;
use crate::metrics::QueryTimer;

const TABLE: &str = "locations";

/// Returns `base` or the first `base-N` (N >= 2) not contained in `taken`.
pub fn next_free_slug(base: &str, taken: &HashSet<String>) -> String {
    let base = if base.is_empty() { "item" } else { base };
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Repository for location database operations.
#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_hash(&self, import_hash: &str) -> Result<Option<LocationEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "find_by_hash");
        let result = sqlx::query_as::<_, LocationEntity>(
            r#"
            SELECT * FROM locations WHERE import_hash = $1
            "#,
        )
        .bind(import_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Picks a slug not yet used by any location.
    pub async fn unique_slug(&self, base: &str) -> Result<String, sqlx::Error> {
        let base = if base.is_empty() { "item" } else { base };
        let timer = QueryTimer::new(TABLE, "slugs_like");
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT slug FROM locations WHERE slug = $1 OR slug LIKE $1 || '-%'
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
        data: &LocationData,
        geocoding_info: Option<&serde_json::Value>,
    ) -> Result<LocationEntity, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "insert");
        let point = data.point;
        let result = sqlx::query_as::<_, LocationEntity>(
            r#"
            INSERT INTO locations (
                slug, import_hash, status, owner_id,
                title_de, title_en, description_de, description_en,
                street1, street2, house_number, post_code, city,
                phone, email, website, facebook, instagram, twitter, youtube,
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
        .bind(&data.social.facebook)
        .bind(&data.social.instagram)
        .bind(&data.social.twitter)
        .bind(&data.social.youtube)
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
        data: &LocationData,
        geocoding_info: Option<&serde_json::Value>,
    ) -> Result<LocationEntity, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "update");
        let point = data.point;
        let result = sqlx::query_as::<_, LocationEntity>(
            r#"
            UPDATE locations
            SET status = $2,
                title_de = $3, title_en = $4, description_de = $5, description_en = $6,
                street1 = $7, street2 = $8, house_number = $9, post_code = $10, city = $11,
                phone = $12, email = $13, website = $14,
                facebook = $15, instagram = $16, twitter = $17, youtube = $18,
                term_ids = $19, lat = $20, lng = $21,
                geocoding_info = COALESCE($22, geocoding_info),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
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
        .bind(&data.social.facebook)
        .bind(&data.social.instagram)
        .bind(&data.social.twitter)
        .bind(&data.social.youtube)
        .bind(&data.term_ids)
        .bind(point.map(|p| p.lat))
        .bind(point.map(|p| p.lng))
        .bind(geocoding_info)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Coordinates of all located locations, used for the center of gravity.
    pub async fn located_points(&self) -> Result<Vec<(f64, f64)>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "located_points");
        let result = sqlx::query_as::<_, (f64, f64)>(
            r#"
            SELECT lat, lng FROM locations
            WHERE lat IS NOT NULL AND lng IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Location ids by slug, for resolving event venues.
    pub async fn venue_ids_by_slug(&self) -> Result<HashMap<String, Uuid>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "venue_ids_by_slug");
        let rows: Vec<(String, Uuid)> = sqlx::query_as("SELECT slug, id FROM locations")
            .fetch_all(&self.pool)
            .await?;
        timer.record();
        Ok(rows.into_iter().collect())
    }

    /// Location slugs by id, for writing the event venue column.
    pub async fn slugs_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "slugs_by_ids");
        let rows: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT id, slug FROM locations WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        timer.record();
        Ok(rows.into_iter().collect())
    }

    /// Locations for an export. Empty `term_ids` does not filter by term.
    pub async fn list_for_export(
        &self,
        statuses: &[String],
        term_ids: &[Uuid],
    ) -> Result<Vec<LocationEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "list_for_export");
        let result = sqlx::query_as::<_, LocationEntity>(
            r#"
            SELECT * FROM locations
            WHERE status = ANY($1)
              AND (cardinality($2::uuid[]) = 0 OR term_ids && $2)
            ORDER BY title_de NULLS LAST, id
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_free_slug_unused() {
        assert_eq!(next_free_slug("museum", &HashSet::new()), "museum");
    }

    #[test]
    fn test_next_free_slug_appends_counter() {
        let taken: HashSet<String> = ["museum", "museum-2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(next_free_slug("museum", &taken), "museum-3");
    }

    #[test]
    fn test_next_free_slug_empty_base() {
        assert_eq!(next_free_slug("", &HashSet::new()), "item");
    }
}
