//! The object a UI holds: API handle, cache and toasts, wired together.
//!
//! Operations live in [`crate::commands`], one module per area, as
//! `impl BillSession` blocks.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use billsplit_shared::constants::EDIT_DEBOUNCE_MS;
use billsplit_shared::{Bill, BillId, LineItemId};

use crate::debounce::{Debouncer, EditSequence};
use crate::error::ClientError;
use crate::resource::{resolve, Fetched, Resource};
use crate::rpc::{BillApi, HttpBillApi};
use crate::state::{BillsAction, BillsState, Cached};
use crate::toasts::{Toast, Toaster};

pub(crate) type EditKey = (BillId, LineItemId);

#[derive(Clone)]
pub struct BillSession {
    pub(crate) api: Arc<dyn BillApi>,
    state: Arc<Mutex<BillsState>>,
    toaster: Toaster,
    pub(crate) debouncer: Arc<Debouncer<EditKey>>,
    pub(crate) edits: Arc<EditSequence<EditKey>>,
    revision: Arc<watch::Sender<u64>>,
}

impl BillSession {
    pub fn new(api: Arc<dyn BillApi>) -> Self {
        Self::with_debounce(api, Duration::from_millis(EDIT_DEBOUNCE_MS))
    }

    /// Session talking to the server at `base_url`.
    pub fn connect(base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(HttpBillApi::new(base_url)))
    }

    pub fn with_debounce(api: Arc<dyn BillApi>, delay: Duration) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            api,
            state: Arc::new(Mutex::new(BillsState::new())),
            toaster: Toaster::new(),
            debouncer: Arc::new(Debouncer::new(delay)),
            edits: Arc::new(EditSequence::new()),
            revision: Arc::new(revision),
        }
    }

    pub fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    /// Read the cache.
    pub fn with_state<T>(&self, f: impl FnOnce(&BillsState) -> T) -> T {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Receiver that observes a new value after every cache change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub(crate) fn dispatch(&self, action: BillsAction) {
        tracing::trace!(?action, "dispatch");
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reduce(action);
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Cache a bill sent by the server. Line items with an edit whose answer
    /// is still outstanding keep their cached version.
    pub(crate) fn store_bill(&self, mut bill: Bill) {
        let bill_id = bill.id;
        {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            for item in bill
                .line_items
                .iter_mut()
                .filter(|i| self.edits.is_unsettled(&(bill_id, i.id)))
            {
                if let Fetched::Success(Resource::Loaded(local)) = state.line_item(bill_id, item.id) {
                    *item = local;
                }
            }
        }
        self.dispatch(BillsAction::BillStored(bill));
    }

    pub(crate) fn toast(&self, toast: Toast) {
        self.toaster.show(toast);
    }

    /// Await an RPC answer that may be "not found", reporting unexpected
    /// failures as an error toast carrying `user_error`.
    pub(crate) async fn request<T>(
        &self,
        user_error: &str,
        call: impl Future<Output = Result<Option<T>, ClientError>>,
    ) -> Cached<T> {
        let result = resolve(call).await.map(Resource::from_option);
        if let Fetched::Errored(e) = &result {
            self.toast(Toast::error(user_error, e.to_string()));
        }
        result
    }
}
