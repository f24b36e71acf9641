use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::RecordClient;
use crate::errors::{ClientError, ClientResult};
use crate::purchase::{NewPurchase, PurchaseRecord, RecordId};

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<PurchaseRecord>,
    unavailable: bool,
    listing_unavailable: bool,
    requests: usize,
}

/// In-process collection with the endpoint's semantics: ids are assigned on
/// create, unknown ids answer 404, listing returns insertion order.
#[derive(Debug, Default)]
pub struct MemoryRecordClient {
    state: Mutex<MemoryState>,
}

impl MemoryRecordClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<PurchaseRecord>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                records,
                ..MemoryState::default()
            }),
        }
    }

    /// Simulates a dropped connection for every following request.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Fails only listing requests; mutations still succeed.
    pub fn set_listing_unavailable(&self, unavailable: bool) {
        self.lock().listing_unavailable = unavailable;
    }

    /// Number of requests received so far, including failed ones.
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> ClientResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        state.requests += 1;
        if state.unavailable {
            return Err(ClientError::Transport {
                url: "memory://racao".into(),
                message: "connection refused".into(),
            });
        }
        Ok(state)
    }
}

fn not_found(id: &RecordId) -> ClientError {
    ClientError::Status {
        status: 404,
        body: format!("record {id} not found"),
    }
}

#[async_trait]
impl RecordClient for MemoryRecordClient {
    async fn list_all(&self) -> ClientResult<Vec<PurchaseRecord>> {
        let state = self.begin()?;
        if state.listing_unavailable {
            return Err(ClientError::Status {
                status: 500,
                body: "listing offline".into(),
            });
        }
        Ok(state.records.clone())
    }

    async fn create(&self, purchase: &NewPurchase) -> ClientResult<()> {
        let mut state = self.begin()?;
        state.records.push(PurchaseRecord {
            id: RecordId::new(Uuid::new_v4().simple().to_string()),
            brand: purchase.brand.clone(),
            quantity: purchase.quantity,
            price: purchase.price,
            date: purchase.date,
        });
        Ok(())
    }

    async fn update(&self, id: &RecordId, purchase: &NewPurchase) -> ClientResult<()> {
        let mut state = self.begin()?;
        let record = state
            .records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| not_found(id))?;
        record.brand = purchase.brand.clone();
        record.quantity = purchase.quantity;
        record.price = purchase.price;
        record.date = purchase.date;
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> ClientResult<()> {
        let mut state = self.begin()?;
        let before = state.records.len();
        state.records.retain(|record| &record.id != id);
        if state.records.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}
