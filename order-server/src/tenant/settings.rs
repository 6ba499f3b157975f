//! Payment display settings of the bound tenant
//!
//! Patrons see these next to the bill. Nothing here moves money.

use shared::error::{AppError, ErrorCode};
use shared::models::{PaymentSettings, TenantId};

use crate::db::DataStore;
use crate::error::ServiceResult;

const MAX_FIELD_LEN: usize = 255;

pub async fn payment_settings(
    store: &dyn DataStore,
    tenant: TenantId,
) -> ServiceResult<PaymentSettings> {
    store
        .find_tenant(tenant)
        .await?
        .map(|t| t.payment_settings())
        .ok_or_else(|| AppError::new(ErrorCode::TenantNotFound).into())
}

/// Replace all four fields. Blank values are stored as absent.
pub async fn update_payment_settings(
    store: &dyn DataStore,
    tenant: TenantId,
    settings: PaymentSettings,
) -> ServiceResult<PaymentSettings> {
    let settings = PaymentSettings {
        bank_id: clean(settings.bank_id, "bank_id")?,
        account_no: clean(settings.account_no, "account_no")?,
        account_name: clean(settings.account_name, "account_name")?,
        qr_template: clean(settings.qr_template, "qr_template")?,
    };

    if !store.update_payment_settings(tenant, &settings).await? {
        return Err(AppError::new(ErrorCode::TenantNotFound).into());
    }
    tracing::info!(tenant_id = %tenant, bank_id = ?settings.bank_id, "Payment settings updated");
    Ok(settings)
}

fn clean(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(
            AppError::validation(format!("{field} exceeds {MAX_FIELD_LEN} characters"))
                .with_detail("field", field),
        );
    }
    Ok((!value.is_empty()).then(|| value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use shared::models::Tenant;

    const A: TenantId = TenantId(1);

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_tenant(&Tenant {
                id: A,
                subdomain: "alpha".into(),
                name: "Alpha".into(),
                bank_id: Some("VCB".into()),
                account_no: Some("0123".into()),
                account_name: None,
                qr_template: None,
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn update_normalizes_and_persists() {
        let store = store().await;
        let saved = update_payment_settings(
            &store,
            A,
            PaymentSettings {
                bank_id: Some(" ACB ".into()),
                account_no: Some("   ".into()),
                account_name: Some("ALPHA CO".into()),
                qr_template: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(saved.bank_id.as_deref(), Some("ACB"));
        assert!(saved.account_no.is_none());

        assert_eq!(payment_settings(&store, A).await.unwrap(), saved);
        let info = store.find_tenant(A).await.unwrap().unwrap().store_info();
        assert_eq!(info.account_name.as_deref(), Some("ALPHA CO"));
    }

    #[tokio::test]
    async fn rejects_oversized_fields_and_unknown_tenants() {
        let store = store().await;
        let err = update_payment_settings(
            &store,
            A,
            PaymentSettings {
                qr_template: Some("x".repeat(MAX_FIELD_LEN + 1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(AppError::from(err).code, ErrorCode::ValidationFailed);
        assert_eq!(
            payment_settings(&store, A).await.unwrap().bank_id.as_deref(),
            Some("VCB")
        );

        let err = payment_settings(&store, TenantId(9)).await.unwrap_err();
        assert_eq!(AppError::from(err).code, ErrorCode::TenantNotFound);
    }
}
