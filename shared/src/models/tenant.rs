//! Tenant (store / branch) Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one isolated restaurant branch.
///
/// Every tenant-owned lookup takes one of these, so forgetting the tenant
/// filter is a type error rather than a data leak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
pub struct TenantId(pub i64);

impl TenantId {
    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TenantId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Tenant entity, keyed by the first label of the request host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Tenant {
    pub id: TenantId,
    /// Unique host label, e.g. `pho24` for `pho24.example.com`
    pub subdomain: String,
    pub name: String,
    /// Payment display settings (shown to patrons, never processed)
    pub bank_id: Option<String>,
    pub account_no: Option<String>,
    pub account_name: Option<String>,
    pub qr_template: Option<String>,
}

impl Tenant {
    pub fn payment_settings(&self) -> PaymentSettings {
        PaymentSettings {
            bank_id: self.bank_id.clone(),
            account_no: self.account_no.clone(),
            account_name: self.account_name.clone(),
            qr_template: self.qr_template.clone(),
        }
    }

    pub fn apply_payment_settings(&mut self, settings: PaymentSettings) {
        self.bank_id = settings.bank_id;
        self.account_no = settings.account_no;
        self.account_name = settings.account_name;
        self.qr_template = settings.qr_template;
    }

    /// Public store view, without internal ids
    pub fn store_info(&self) -> StoreInfo {
        StoreInfo {
            name: self.name.clone(),
            subdomain: self.subdomain.clone(),
            bank_id: self.bank_id.clone(),
            account_no: self.account_no.clone(),
            account_name: self.account_name.clone(),
            qr_template: self.qr_template.clone(),
        }
    }
}

/// Payment display settings, edited by admins as one unit.
///
/// A `PUT` replaces all four fields; an omitted field is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSettings {
    #[serde(default)]
    pub bank_id: Option<String>,
    #[serde(default)]
    pub account_no: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub qr_template: Option<String>,
}

/// Public store information (display name + payment display settings)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: String,
    pub subdomain: String,
    pub bank_id: Option<String>,
    pub account_no: Option<String>,
    pub account_name: Option<String>,
    pub qr_template: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&TenantId(42)).unwrap(), "42");
        let id: TenantId = serde_json::from_str("7").unwrap();
        assert_eq!(id, TenantId(7));
    }

    #[test]
    fn store_info_drops_tenant_id() {
        let tenant = Tenant {
            id: TenantId(1),
            subdomain: "pho24".into(),
            name: "Pho 24".into(),
            bank_id: Some("VCB".into()),
            account_no: Some("0123".into()),
            account_name: None,
            qr_template: None,
        };
        let json = serde_json::to_value(tenant.store_info()).unwrap();
        assert_eq!(json["name"], "Pho 24");
        assert_eq!(json["bank_id"], "VCB");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn payment_settings_replace_all_fields() {
        let mut tenant = Tenant {
            id: TenantId(1),
            subdomain: "pho24".into(),
            name: "Pho 24".into(),
            bank_id: Some("VCB".into()),
            account_no: Some("0123".into()),
            account_name: Some("PHO 24".into()),
            qr_template: None,
        };
        let update: PaymentSettings =
            serde_json::from_str(r#"{"bank_id":"ACB","qr_template":"compact"}"#).unwrap();
        tenant.apply_payment_settings(update.clone());
        assert_eq!(tenant.payment_settings(), update);
        assert!(tenant.account_no.is_none());
    }
}
