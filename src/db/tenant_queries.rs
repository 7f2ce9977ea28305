use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Raw provider configuration JSON for a tenant, if any. A missing tenant
/// and a tenant without configuration look the same to the pipeline: no
/// provider to talk to.
pub async fn get_provider_config(
    pool: &PgPool,
    tenant_id: Uuid,
) -> Result<Option<String>, sqlx::Error> {
    let row = sqlx::query("SELECT provider_config FROM tenants WHERE id = $1")
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;

    Ok(match row {
        Some(row) => row.try_get("provider_config")?,
        None => None,
    })
}

/// Create a tenant (admin/test tooling).
pub async fn create_tenant(
    pool: &PgPool,
    name: &str,
    provider_config: Option<&str>,
) -> Result<Uuid, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO tenants (name, provider_config)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(provider_config)
    .fetch_one(pool)
    .await?;

    row.try_get("id")
}
