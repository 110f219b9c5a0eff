use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use chrono::Utc;
use rand::Rng;
use tracing::{info, warn};

use crate::api::{ApiError, NetworkApi, NewUser};
use crate::util::format_amount;

const PURCHASE_BASE_AMOUNT: f64 = 200_000.0;
const PURCHASE_AMOUNT_SPREAD: u32 = 300_000;

/// Mutations that only exist to feed the network view with demo data.
#[derive(Clone, Debug, PartialEq)]
pub enum DemoAction {
    Purchase { org_id: i64, amount: f64 },
    CreateUser { org_id: i64, credential: String },
}

impl DemoAction {
    pub fn purchase(org_id: i64, rng: &mut impl Rng) -> Self {
        let amount = PURCHASE_BASE_AMOUNT + f64::from(rng.random_range(0..PURCHASE_AMOUNT_SPREAD));
        Self::Purchase { org_id, amount }
    }

    pub fn create_user(org_id: i64, credential: &str) -> Self {
        Self::CreateUser {
            org_id,
            credential: credential.to_owned(),
        }
    }

    pub fn org_id(&self) -> i64 {
        match self {
            Self::Purchase { org_id, .. } | Self::CreateUser { org_id, .. } => *org_id,
        }
    }

    fn run(&self, api: &dyn NetworkApi, rng: &mut impl Rng) -> Result<String, ApiError> {
        match self {
            Self::Purchase { org_id, amount } => {
                let receipt = api.demo_purchase(*org_id, *amount)?;
                Ok(format!(
                    "Purchase for org {org_id} rewarded user #{} with {} SOV",
                    receipt.user_id,
                    format_amount(receipt.reward)
                ))
            }
            Self::CreateUser { org_id, credential } => {
                let user = demo_user(*org_id, Utc::now().timestamp_millis(), rng);
                let created = api.create_user(credential, &user)?;
                Ok(format!(
                    "Created {} (#{}) with wallet {}",
                    created.full_name, created.id, created.wallet.address
                ))
            }
        }
    }
}

pub fn demo_user(org_id: i64, stamp_millis: i64, rng: &mut impl Rng) -> NewUser {
    NewUser {
        full_name: format!("Demo User {}", rng.random_range(0..1000)),
        email: format!("demo_{org_id}_{stamp_millis}@example.com"),
        phone: Some(format!("+84{}", rng.random_range(100_000_000..1_000_000_000u64))),
        segment: Some("demo".to_owned()),
    }
}

#[derive(Debug, PartialEq)]
pub struct DemoOutcome {
    pub action: DemoAction,
    pub result: Result<String, String>,
}

pub struct DemoRunner {
    api: Arc<dyn NetworkApi>,
    pending: Vec<(DemoAction, Receiver<Result<String, String>>)>,
    disposed: bool,
}

impl DemoRunner {
    pub fn new(api: Arc<dyn NetworkApi>) -> Self {
        Self {
            api,
            pending: Vec::new(),
            disposed: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn submit(&mut self, action: DemoAction) {
        if self.disposed {
            return;
        }

        let (tx, rx) = mpsc::channel();
        let api = Arc::clone(&self.api);
        let job = action.clone();

        thread::spawn(move || {
            let result = job
                .run(api.as_ref(), &mut rand::rng())
                .map_err(|error| error.to_string());
            let _ = tx.send(result);
        });

        self.pending.push((action, rx));
    }

    pub fn poll(&mut self) -> Vec<DemoOutcome> {
        let mut outcomes = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());

        for (action, rx) in self.pending.drain(..) {
            let result = match rx.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => {
                    still_pending.push((action, rx));
                    continue;
                }
                Err(TryRecvError::Disconnected) => {
                    Err("Demo action worker disconnected".to_owned())
                }
            };

            match &result {
                Ok(summary) => info!(org_id = action.org_id(), %summary, "demo action finished"),
                Err(error) => warn!(org_id = action.org_id(), %error, "demo action failed"),
            }
            outcomes.push(DemoOutcome { action, result });
        }

        self.pending = still_pending;
        outcomes
    }

    /// Drops in-flight results. Workers may still finish, but nothing they
    /// report is delivered.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.pending.clear();
    }
}
