//! Purchase workflows: validate, mutate on the server, refetch.

use tracing::{info, warn};

use crate::client::RecordClient;
use crate::errors::{ServiceError, ServiceResult};
use crate::purchase::{NewPurchase, PurchaseDraft, RecordId};
use crate::store::RecordStore;
use crate::validation::{validate_draft, PurchaseLimits};

/// Result of a successful mutation.
///
/// `refreshed` is `false` when the server accepted the change but the
/// follow-up fetch failed; the store then still shows the previous list.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub purchase: Option<NewPurchase>,
    pub refreshed: bool,
}

/// Owns the client and the record store. Nothing else writes to the store.
pub struct PurchaseService<C> {
    client: C,
    store: RecordStore,
    limits: PurchaseLimits,
}

impl<C: RecordClient> PurchaseService<C> {
    pub fn new(client: C, limits: PurchaseLimits) -> Self {
        Self {
            client,
            store: RecordStore::new(),
            limits,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn limits(&self) -> &PurchaseLimits {
        &self.limits
    }

    pub fn set_limits(&mut self, limits: PurchaseLimits) {
        self.limits = limits;
    }

    /// Swaps the transport while keeping the current snapshot.
    pub fn replace_client(&mut self, client: C) {
        self.client = client;
    }

    /// Reloads the whole collection. Returns whether the result was applied.
    pub async fn refresh(&mut self) -> ServiceResult<bool> {
        let ticket = self.store.begin_fetch();
        let records = self.client.list_all().await?;
        let count = records.len();
        let applied = self.store.apply_fetch(ticket, records);
        if applied {
            info!(count, generation = ticket.generation(), "purchase list refreshed");
        }
        Ok(applied)
    }

    pub async fn add(&mut self, draft: &PurchaseDraft) -> ServiceResult<MutationOutcome> {
        let purchase = validate_draft(draft, &self.limits).map_err(ServiceError::Validation)?;
        self.client.create(&purchase).await?;
        info!(brand = %purchase.brand, date = %purchase.date, "purchase created");
        let refreshed = self.refresh_after_mutation().await;
        Ok(MutationOutcome {
            purchase: Some(purchase),
            refreshed,
        })
    }

    pub async fn edit(
        &mut self,
        id: &RecordId,
        draft: &PurchaseDraft,
    ) -> ServiceResult<MutationOutcome> {
        let purchase = validate_draft(draft, &self.limits).map_err(ServiceError::Validation)?;
        self.ensure_known(id)?;
        self.client.update(id, &purchase).await?;
        info!(%id, "purchase updated");
        let refreshed = self.refresh_after_mutation().await;
        Ok(MutationOutcome {
            purchase: Some(purchase),
            refreshed,
        })
    }

    pub async fn remove(&mut self, id: &RecordId) -> ServiceResult<MutationOutcome> {
        self.ensure_known(id)?;
        self.client.delete(id).await?;
        info!(%id, "purchase deleted");
        let refreshed = self.refresh_after_mutation().await;
        Ok(MutationOutcome {
            purchase: None,
            refreshed,
        })
    }

    fn ensure_known(&self, id: &RecordId) -> ServiceResult<()> {
        if self.store.find(id).is_none() {
            return Err(ServiceError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn refresh_after_mutation(&mut self) -> bool {
        match self.refresh().await {
            Ok(applied) => applied,
            Err(err) => {
                warn!(error = %err, "change saved but the purchase list could not be reloaded");
                false
            }
        }
    }
}
