//! Access to the purchase collection endpoint.
//!
//! [`RecordClient`] is the seam between the service layer and the transport:
//! [`HttpRecordClient`] talks to the real server, [`MemoryRecordClient`]
//! keeps the collection in process with the same semantics.

mod http;
mod memory;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::ClientResult;
use crate::purchase::{NewPurchase, PurchaseRecord, RecordId};

pub use http::HttpRecordClient;
pub use memory::MemoryRecordClient;

/// Path of the single collection handling all four operations.
pub const COLLECTION_PATH: &str = "/racao";

/// Create/read/update/delete over the purchase collection.
///
/// Mutations acknowledge with `Ok(())`; callers refetch the collection to
/// observe their effect.
#[async_trait]
pub trait RecordClient: Send + Sync {
    async fn list_all(&self) -> ClientResult<Vec<PurchaseRecord>>;
    async fn create(&self, purchase: &NewPurchase) -> ClientResult<()>;
    async fn update(&self, id: &RecordId, purchase: &NewPurchase) -> ClientResult<()>;
    async fn delete(&self, id: &RecordId) -> ClientResult<()>;
}

/// `PATCH` body: the full field set addressed by `id`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateBody<'a> {
    pub id: &'a RecordId,
    #[serde(flatten)]
    pub fields: &'a NewPurchase,
}

/// `DELETE` body.
#[derive(Debug, Serialize)]
pub(crate) struct DeleteBody<'a> {
    pub id: &'a RecordId,
}
