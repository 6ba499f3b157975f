//! Demo data for local development
//!
//! Creates one tenant under the fallback key, so `http://localhost:8080`
//! works without DNS. Skipped when that tenant already exists.

use rust_decimal::Decimal;
use shared::models::{DiningTableCreate, MenuItem, Tenant, TenantId};
use shared::util::snowflake_id;

use crate::BoxError;
use crate::auth::{Role, create_token};
use crate::state::AppState;

const DEMO_MENU: &[(&str, i64)] = &[
    ("Pho bo", 50000),
    ("Bun cha", 45000),
    ("Com tam", 40000),
    ("Goi cuon", 30000),
    ("Iced tea", 20000),
    ("Ca phe sua da", 25000),
];

const DEMO_TABLES: &[(&str, i32)] = &[("Table 1", 2), ("Table 2", 4), ("Table 3", 6)];

pub async fn seed_demo(state: &AppState) -> Result<(), BoxError> {
    let subdomain = state.fallback_tenant.as_str();
    if let Some(existing) = state.store.find_tenant_by_subdomain(subdomain).await? {
        tracing::info!(tenant_id = %existing.id, subdomain, "Demo tenant already present");
        return Ok(());
    }

    let tenant_id = TenantId(snowflake_id());
    state
        .store
        .insert_tenant(&Tenant {
            id: tenant_id,
            subdomain: subdomain.to_string(),
            name: "Demo Restaurant".into(),
            bank_id: Some("970436".into()),
            account_no: Some("0123456789".into()),
            account_name: Some("DEMO RESTAURANT".into()),
            qr_template: Some("compact2".into()),
        })
        .await?;

    for &(name, price) in DEMO_MENU {
        state
            .store
            .upsert_menu_item(&MenuItem {
                id: snowflake_id(),
                tenant_id,
                category_id: 1,
                name: name.into(),
                price: Decimal::from(price),
                out_of_stock: false,
                is_deleted: false,
            })
            .await?;
    }

    for &(name, capacity) in DEMO_TABLES {
        let table = state
            .tables
            .create_table(
                tenant_id,
                DiningTableCreate {
                    name: name.into(),
                    capacity,
                },
            )
            .await
            .map_err(|e| shared::error::AppError::from(e).message)?;
        tracing::info!(table = %table.name, access_token = %table.access_token, "Demo table");
    }

    for role in [Role::Admin, Role::Staff, Role::Kitchen] {
        let token = create_token(
            &format!("demo-{}", role.to_string().to_lowercase()),
            tenant_id,
            role,
            chrono::Duration::hours(12),
            &state.jwt_secret,
        )?;
        tracing::info!(%role, %token, "Demo staff token (12h)");
    }

    tracing::info!(%tenant_id, subdomain, "Demo tenant seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let state = AppState::build(Arc::new(MemoryStore::new()), "secret", "default");
        seed_demo(&state).await.unwrap();
        seed_demo(&state).await.unwrap();

        let tenant = state
            .store
            .find_tenant_by_subdomain("default")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.store.list_tables(tenant.id).await.unwrap().len(), DEMO_TABLES.len());
    }
}
