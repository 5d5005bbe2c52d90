//! Business Repository

use super::RepoResult;
use shared::Business;
use sqlx::SqlitePool;

const BUSINESS_SELECT: &str = "SELECT id, slug, name, timezone, google_refresh_token, settings, created_at, updated_at FROM business";

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> RepoResult<Option<Business>> {
    let sql = format!("{} WHERE slug = ?", BUSINESS_SELECT);
    let row = sqlx::query_as::<_, Business>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Business>> {
    let sql = format!("{} WHERE id = ?", BUSINESS_SELECT);
    let row = sqlx::query_as::<_, Business>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Insert or fully replace a business row (id is the conflict key)
pub async fn upsert(pool: &SqlitePool, business: &Business) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO business (id, slug, name, timezone, google_refresh_token, settings, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
         ON CONFLICT (id) DO UPDATE SET \
             slug = excluded.slug, \
             name = excluded.name, \
             timezone = excluded.timezone, \
             google_refresh_token = excluded.google_refresh_token, \
             settings = excluded.settings, \
             updated_at = excluded.updated_at",
    )
    .bind(&business.id)
    .bind(&business.slug)
    .bind(&business.name)
    .bind(&business.timezone)
    .bind(&business.google_refresh_token)
    .bind(&business.settings)
    .bind(business.created_at)
    .bind(business.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}
