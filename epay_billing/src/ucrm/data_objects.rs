use rust_decimal::Decimal;
use serde::Deserialize;

const CLIENT_TYPE_COMPANY: i32 = 2;

/// A UCRM client record, trimmed to the fields the bridge uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UcrmCustomer {
    pub id: i64,
    #[serde(default)]
    pub client_type: Option<i32>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub user_ident: Option<String>,
}

impl UcrmCustomer {
    /// Company name for company clients, "first last" for everyone else.
    pub fn display_name(&self) -> String {
        let company = self.company_name.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match (self.client_type, company) {
            (Some(CLIENT_TYPE_COMPANY), Some(company)) => company.to_string(),
            _ => [self.first_name.as_deref(), self.last_name.as_deref()]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn belongs_to(&self, organization_id: &str) -> bool {
        organization_id.is_empty() || self.organization_id.map(|id| id.to_string()).as_deref() == Some(organization_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: i64,
    #[serde(default)]
    pub number: Option<String>,
    pub amount_to_pay: Decimal,
}
