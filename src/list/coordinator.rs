// Re-runs the caller's exact list query after mutations, coalescing
// concurrent refreshes and stepping back from a page that deletions emptied.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use crate::api::errors::ApiError;
use crate::api::types::{ListQueryState, Page};
use crate::workflow::traits::ListGateway;
use crate::workflow::types::EntityKind;

/// Shared so every coalesced caller gets the same answer.
pub type RefreshResult = Result<Page, Arc<ApiError>>;

enum Role {
    Leader(watch::Sender<Option<RefreshResult>>),
    Follower(watch::Receiver<Option<RefreshResult>>),
}

/// Issues list fetches on behalf of table sessions. Reads the query state,
/// never writes its filter fields.
pub struct ListCoordinator<L> {
    gateway: Arc<L>,
    pending: Mutex<HashMap<String, watch::Receiver<Option<RefreshResult>>>>,
}

impl<L: ListGateway> ListCoordinator<L> {
    pub fn new(gateway: Arc<L>) -> Self {
        Self {
            gateway,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the page `query` describes. Concurrent calls with the same
    /// signature share one network round trip.
    pub async fn refresh(&self, kind: EntityKind, query: &ListQueryState) -> RefreshResult {
        let key = query.signature(kind);
        let role = {
            let mut pending = self.pending.lock().await;
            if let Some(rx) = pending.get(&key) {
                Role::Follower(rx.clone())
            } else {
                let (tx, rx) = watch::channel(None);
                pending.insert(key.clone(), rx);
                Role::Leader(tx)
            }
        };

        match role {
            Role::Follower(mut rx) => {
                debug!(signature = %key, "refresh already in flight; sharing its result");
                loop {
                    let published = rx.borrow().clone();
                    if let Some(result) = published {
                        return result;
                    }
                    if rx.changed().await.is_err() {
                        // leader vanished without publishing; fetch directly
                        return self.fetch_with_fallback(kind, query).await.map_err(Arc::new);
                    }
                }
            }
            Role::Leader(tx) => {
                let result = self.fetch_with_fallback(kind, query).await.map_err(Arc::new);
                self.pending.lock().await.remove(&key);
                let _ = tx.send(Some(result.clone()));
                result
            }
        }
    }

    /// An empty page with a non-zero total means deletions emptied it; show
    /// the previous page instead of a blank table. The caller's query is not
    /// touched; the returned meta reports the page actually served.
    async fn fetch_with_fallback(
        &self,
        kind: EntityKind,
        query: &ListQueryState,
    ) -> Result<Page, ApiError> {
        let page = self.gateway.fetch_page(kind, query).await?;
        if page.items.is_empty() && page.meta.total > 0 && query.page > 1 {
            let mut stepped_back = query.clone();
            stepped_back.page = query.page - 1;
            info!(
                kind = %kind,
                from_page = query.page,
                "page emptied; falling back to the previous page"
            );
            return self.gateway.fetch_page(kind, &stepped_back).await;
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::mocks::{duty, page_of, MockListGateway};
    use std::time::Duration;

    fn query(page: u32) -> ListQueryState {
        ListQueryState {
            page,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn concurrent_refreshes_share_one_fetch() {
        let gateway = Arc::new(MockListGateway::with_latency(Duration::from_millis(50)));
        gateway.set_page(1, page_of(vec![duty(1, "pending")], 1, 1, 1, 10));
        let coordinator = Arc::new(ListCoordinator::new(gateway.clone()));

        let q = query(1);
        let (a, b) = tokio::join!(
            coordinator.refresh(EntityKind::Duty, &q),
            coordinator.refresh(EntityKind::Duty, &q)
        );

        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(gateway.fetch_count(), 1);
    }

    #[tokio::test]
    async fn a_burst_of_identical_refreshes_still_issues_one_fetch() {
        let gateway = Arc::new(MockListGateway::with_latency(Duration::from_millis(40)));
        gateway.set_page(1, page_of(vec![duty(1, "pending")], 1, 1, 1, 10));
        let coordinator = Arc::new(ListCoordinator::new(gateway.clone()));

        let q = query(1);
        let results = futures::future::join_all(
            (0..4).map(|_| coordinator.refresh(EntityKind::Duty, &q)),
        )
        .await;

        assert!(results.iter().all(|result| result.is_ok()));
        assert_eq!(gateway.fetch_count(), 1);
    }

    #[tokio::test]
    async fn different_queries_do_not_coalesce() {
        let gateway = Arc::new(MockListGateway::with_latency(Duration::from_millis(20)));
        gateway.set_page(1, page_of(vec![duty(1, "pending")], 1, 2, 12, 10));
        gateway.set_page(2, page_of(vec![duty(2, "pending")], 2, 2, 12, 10));
        let coordinator = Arc::new(ListCoordinator::new(gateway.clone()));

        let q1 = query(1);
        let q2 = query(2);
        let (a, b) = tokio::join!(
            coordinator.refresh(EntityKind::Duty, &q1),
            coordinator.refresh(EntityKind::Duty, &q2)
        );

        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(gateway.fetch_count(), 2);
    }

    #[tokio::test]
    async fn emptied_page_falls_back_one_page() {
        let gateway = Arc::new(MockListGateway::new());
        gateway.set_page(3, page_of(vec![], 3, 2, 12, 10));
        gateway.set_page(
            2,
            page_of(vec![duty(5, "pending"), duty(6, "approved")], 2, 2, 12, 10),
        );
        let coordinator = ListCoordinator::new(gateway.clone());

        let caller_query = query(3);
        let page = coordinator
            .refresh(EntityKind::Duty, &caller_query)
            .await
            .expect("fallback page");

        assert_eq!(page.meta.current_page, 2);
        assert_eq!(page.items.len(), 2);
        // the caller's own state was not rewritten
        assert_eq!(caller_query.page, 3);
        assert_eq!(gateway.fetch_count(), 2);
    }

    #[tokio::test]
    async fn empty_collection_does_not_fall_back() {
        let gateway = Arc::new(MockListGateway::new());
        gateway.set_page(1, page_of(vec![], 1, 1, 0, 10));
        let coordinator = ListCoordinator::new(gateway.clone());

        let page = coordinator
            .refresh(EntityKind::Duty, &query(1))
            .await
            .expect("empty page");
        assert!(page.items.is_empty());
        assert_eq!(gateway.fetch_count(), 1);
    }

    #[tokio::test]
    async fn fetch_errors_are_shared_with_followers() {
        // nothing scripted: every fetch fails
        let gateway = Arc::new(MockListGateway::with_latency(Duration::from_millis(30)));
        let coordinator = Arc::new(ListCoordinator::new(gateway.clone()));

        let q = query(1);
        let (a, b) = tokio::join!(
            coordinator.refresh(EntityKind::Expense, &q),
            coordinator.refresh(EntityKind::Expense, &q)
        );

        assert!(a.is_err());
        assert!(b.is_err());
        assert_eq!(gateway.fetch_count(), 1);
    }
}
