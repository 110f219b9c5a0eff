use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{
    CompanyRecord, CreatedUser, NewUser, PurchaseReceipt, TransferRecord, WalletRecord,
};
use super::{ApiError, NetworkApi};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct HttpApi {
    base_url: String,
    client: Client,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.header(CONTENT_TYPE, "application/json").send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl NetworkApi for HttpApi {
    fn list_companies(&self) -> Result<Vec<CompanyRecord>, ApiError> {
        self.send(self.client.get(self.url("/dev/companies")))
    }

    fn list_wallets(&self) -> Result<Vec<WalletRecord>, ApiError> {
        self.send(self.client.get(self.url("/dev/wallets")))
    }

    fn list_transfers(&self, limit: usize) -> Result<Vec<TransferRecord>, ApiError> {
        self.send(
            self.client
                .get(self.url("/dev/transfers"))
                .query(&[("limit", limit)]),
        )
    }

    fn demo_purchase(&self, company_id: i64, amount: f64) -> Result<PurchaseReceipt, ApiError> {
        debug!(company_id, amount, "posting demo purchase");
        self.send(
            self.client
                .post(self.url("/dev/demo/purchase"))
                .query(&[("company_id", company_id.to_string()), ("amount", amount.to_string())]),
        )
    }

    fn create_user(&self, credential: &str, user: &NewUser) -> Result<CreatedUser, ApiError> {
        debug!(email = %user.email, "creating demo user");
        self.send(
            self.client
                .post(self.url("/users"))
                .header("X-API-Key", credential)
                .body(serde_json::to_vec(user)?),
        )
    }
}
