use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::api::{
    ApiError, CompanyRecord, CreatedUser, NetworkApi, NewUser, OwnerType, PurchaseReceipt,
    Snapshot, TransferRecord, WalletRecord,
};
use crate::engine::{ShownStore, StoreError};

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).unwrap()
}

pub fn company(id: i64, name: &str) -> CompanyRecord {
    CompanyRecord {
        id,
        name: name.to_owned(),
        api_key: format!("key-{id}"),
        created_at: epoch(),
    }
}

pub fn company_wallet(id: i64, company_id: i64, address: &str) -> WalletRecord {
    WalletRecord {
        id,
        owner_type: OwnerType::Company,
        owner_id: company_id,
        address: address.to_owned(),
        balance: 500_000.0,
        company_id: None,
    }
}

pub fn user_wallet(id: i64, user_id: i64, address: &str) -> WalletRecord {
    WalletRecord {
        id,
        owner_type: OwnerType::User,
        owner_id: user_id,
        address: address.to_owned(),
        balance: 0.0,
        company_id: None,
    }
}

pub fn transfer(
    id: i64,
    tx_id: &str,
    from: Option<&str>,
    to: Option<&str>,
    seconds_after_epoch: i64,
) -> TransferRecord {
    TransferRecord {
        id,
        tx_id: tx_id.to_owned(),
        from_address: from.map(str::to_owned),
        to_address: to.map(str::to_owned),
        amount: 40.0,
        memo: None,
        created_at: epoch() + Duration::seconds(seconds_after_epoch),
    }
}

pub fn snapshot(
    companies: Vec<CompanyRecord>,
    wallets: Vec<WalletRecord>,
    transfers: Vec<TransferRecord>,
) -> Snapshot {
    Snapshot {
        companies,
        wallets,
        transfers,
    }
}

// One company paying one user, plus `count` transfers between them.
pub fn paying_network(count: i64) -> Snapshot {
    snapshot(
        vec![company(1, "Acme")],
        vec![company_wallet(10, 1, "w_acme"), user_wallet(11, 5, "w_alice")],
        (1..=count)
            .map(|index| {
                transfer(index, &format!("tx{index}"), Some("w_acme"), Some("w_alice"), index)
            })
            .collect(),
    )
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub saved: HashSet<String>,
    pub saves: usize,
    pub fail_saves: bool,
    pub fail_loads: bool,
}

impl MemoryStore {
    pub fn with(ids: &[&str]) -> Self {
        Self {
            saved: ids.iter().map(|id| (*id).to_owned()).collect(),
            ..Self::default()
        }
    }
}

impl ShownStore for MemoryStore {
    fn load(&self) -> Result<HashSet<String>, StoreError> {
        if self.fail_loads {
            return Err(StoreError::Io(std::io::Error::other("load refused")));
        }
        Ok(self.saved.clone())
    }

    fn save(&mut self, shown: &HashSet<String>) -> Result<(), StoreError> {
        self.saves += 1;
        if self.fail_saves {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.saved = shown.clone();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeApi {
    snapshot: Mutex<Snapshot>,
    failing: AtomicBool,
    transfer_limits: Mutex<Vec<usize>>,
    purchases: Mutex<Vec<(i64, f64)>>,
    created_users: Mutex<Vec<(String, NewUser)>>,
}

impl FakeApi {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_snapshot(&self, snapshot: Snapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    pub fn transfer_limits(&self) -> Vec<usize> {
        self.transfer_limits.lock().unwrap().clone()
    }

    pub fn purchases(&self) -> Vec<(i64, f64)> {
        self.purchases.lock().unwrap().clone()
    }

    pub fn created_users(&self) -> Vec<(String, NewUser)> {
        self.created_users.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                body: "backend unavailable".to_owned(),
            });
        }
        Ok(())
    }
}

impl NetworkApi for FakeApi {
    fn list_companies(&self) -> Result<Vec<CompanyRecord>, ApiError> {
        self.check()?;
        Ok(self.snapshot.lock().unwrap().companies.clone())
    }

    fn list_wallets(&self) -> Result<Vec<WalletRecord>, ApiError> {
        self.check()?;
        Ok(self.snapshot.lock().unwrap().wallets.clone())
    }

    fn list_transfers(&self, limit: usize) -> Result<Vec<TransferRecord>, ApiError> {
        self.check()?;
        self.transfer_limits.lock().unwrap().push(limit);
        let snapshot = self.snapshot.lock().unwrap();
        Ok(snapshot.transfers.iter().take(limit).cloned().collect())
    }

    fn demo_purchase(&self, company_id: i64, amount: f64) -> Result<PurchaseReceipt, ApiError> {
        self.check()?;
        self.purchases.lock().unwrap().push((company_id, amount));
        Ok(PurchaseReceipt {
            interaction_id: 1,
            user_id: 5,
            reward: amount / 10_000.0 * 2.0,
            tx_hash: Some("0xdemo".to_owned()),
        })
    }

    fn create_user(&self, credential: &str, user: &NewUser) -> Result<CreatedUser, ApiError> {
        self.check()?;
        self.created_users
            .lock()
            .unwrap()
            .push((credential.to_owned(), user.clone()));
        Ok(CreatedUser {
            id: 42,
            company_id: 1,
            full_name: user.full_name.clone(),
            wallet: crate::api::CreatedWallet {
                address: "w_new".to_owned(),
                balance: 0.0,
            },
        })
    }
}
