use crate::domain::stock::StockRecord;
use crate::fetch::{FetchError, StockFetcher};
use crate::presentation::messages::user_message;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Loading,
    Ready,
    Failed,
}

/// Outcome of the load task, published once when the fetch resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStatus {
    pub phase: ViewPhase,
    pub last_error: Option<String>,
}

impl LoadStatus {
    pub fn is_loading(&self) -> bool {
        self.phase == ViewPhase::Loading
    }
}

/// Everything a display layer reads on each render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub phase: ViewPhase,
    pub stocks: Vec<StockRecord>,
    pub last_error: Option<String>,
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        self.phase == ViewPhase::Loading
    }
}

/// Bridges one portfolio fetch to a display layer.
///
/// Construction schedules a single fetch on the tokio runtime and returns
/// immediately. Readers see `Loading` until that fetch resolves, then `Ready`
/// or `Failed`; both are final for the instance. `stocks` is read from the
/// fetcher on every call, so a fetcher shared with other callers shows
/// through.
#[derive(Clone)]
pub struct PortfolioViewModel {
    fetcher: Arc<dyn StockFetcher>,
    status: watch::Receiver<LoadStatus>,
}

impl fmt::Debug for PortfolioViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortfolioViewModel")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl PortfolioViewModel {
    /// Must be called from within a tokio runtime.
    pub fn new(fetcher: Arc<dyn StockFetcher>) -> Self {
        let (tx, rx) = watch::channel(LoadStatus {
            phase: ViewPhase::Loading,
            last_error: None,
        });
        tokio::spawn(load(fetcher.clone(), tx));
        Self {
            fetcher,
            status: rx,
        }
    }

    pub fn state(&self) -> ViewState {
        let status = self.status.borrow().clone();
        self.view(status)
    }

    pub fn phase(&self) -> ViewPhase {
        self.status.borrow().phase
    }

    pub fn stocks(&self) -> Vec<StockRecord> {
        self.fetcher.stocks().unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.status.borrow().is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.status.borrow().last_error.clone()
    }

    pub fn show_error_alert(&self) -> bool {
        self.status.borrow().last_error.is_some()
    }

    /// Receiver that is notified when the fetch resolves.
    pub fn subscribe(&self) -> watch::Receiver<LoadStatus> {
        self.status.clone()
    }

    /// Waits until loading has finished and returns the state at that point.
    pub async fn settled(&self) -> ViewState {
        let mut rx = self.status.clone();
        let settled = rx
            .wait_for(|status| !status.is_loading())
            .await
            .map(|status| LoadStatus::clone(&status));
        let status = match settled {
            Ok(status) => status,
            // Load task died without publishing.
            Err(_) => rx.borrow().clone(),
        };
        self.view(status)
    }

    fn view(&self, status: LoadStatus) -> ViewState {
        ViewState {
            phase: status.phase,
            stocks: self.stocks(),
            last_error: status.last_error,
        }
    }
}

async fn load(fetcher: Arc<dyn StockFetcher>, tx: watch::Sender<LoadStatus>) {
    let (phase, last_error) = match fetcher.fetch_stocks().await {
        Ok(()) => (ViewPhase::Ready, None),
        Err(err) => match err.downcast_ref::<FetchError>() {
            Some(fetch_err) => {
                tracing::warn!(error = %fetch_err, "portfolio fetch failed");
                (ViewPhase::Failed, Some(user_message(fetch_err)))
            }
            None => {
                tracing::error!(error = %format!("{err:#}"), "unexpected error while fetching portfolio");
                (ViewPhase::Failed, None)
            }
        },
    };

    tx.send_replace(LoadStatus { phase, last_error });
}
