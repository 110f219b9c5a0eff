mod client;
mod types;

use thiserror::Error;

pub use client::HttpApi;
#[cfg(test)]
pub use types::CreatedWallet;
pub use types::{
    CompanyRecord, CreatedUser, NewUser, OwnerType, PurchaseReceipt, Snapshot, TransferRecord,
    WalletRecord,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

pub trait NetworkApi: Send + Sync {
    fn list_companies(&self) -> Result<Vec<CompanyRecord>, ApiError>;

    fn list_wallets(&self) -> Result<Vec<WalletRecord>, ApiError>;

    fn list_transfers(&self, limit: usize) -> Result<Vec<TransferRecord>, ApiError>;

    fn demo_purchase(&self, company_id: i64, amount: f64) -> Result<PurchaseReceipt, ApiError>;

    fn create_user(&self, credential: &str, user: &NewUser) -> Result<CreatedUser, ApiError>;

    fn fetch_snapshot(&self, transfer_limit: usize) -> Result<Snapshot, ApiError> {
        Ok(Snapshot {
            companies: self.list_companies()?,
            wallets: self.list_wallets()?,
            transfers: self.list_transfers(transfer_limit)?,
        })
    }
}
