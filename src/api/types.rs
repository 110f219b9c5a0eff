use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CompanyRecord {
    pub id: i64,
    pub name: String,
    pub api_key: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    Company,
    User,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WalletRecord {
    pub id: i64,
    pub owner_type: OwnerType,
    pub owner_id: i64,
    pub address: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TransferRecord {
    pub id: i64,
    #[serde(rename = "tx_hash")]
    pub tx_id: String,
    #[serde(rename = "from_wallet", default)]
    pub from_address: Option<String>,
    #[serde(rename = "to_wallet", default)]
    pub to_address: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub companies: Vec<CompanyRecord>,
    pub wallets: Vec<WalletRecord>,
    pub transfers: Vec<TransferRecord>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PurchaseReceipt {
    pub interaction_id: i64,
    pub user_id: i64,
    pub reward: f64,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub segment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CreatedWallet {
    pub address: String,
    #[serde(default)]
    pub balance: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CreatedUser {
    pub id: i64,
    pub company_id: i64,
    pub full_name: String,
    pub wallet: CreatedWallet,
}

// The backend emits naive UTC timestamps; accept both those and RFC 3339.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let trimmed = raw.trim();
        DateTime::parse_from_rfc3339(trimmed)
            .map(|value| value.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(trimmed, NAIVE_FORMAT)
                    .ok()
                    .map(|value| value.and_utc())
            })
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognized timestamp: {raw}")))
    }
}
