// ── Breweries screen view-model ──
//
// Owns the list state for one screen session and folds fetch results into
// it. Every write replaces a `watch` value in one `send_modify`, so
// observers always see a consistent snapshot.
//
// Fetches run as tokio tasks scoped by child tokens of the view-model's
// root `CancellationToken`. The initial load and load-more are separate
// logical streams: starting a fetch on a stream cancels the one still
// running there, and a generation check under the slot lock stops a
// superseded fetch from folding anything.

pub mod state;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use self::state::{BreweriesScreenState, BreweryDetailsUiData, BreweryUiData};
use self::state::{fold_rows, purge_placeholders, with_placeholders};
use crate::config::PagingConfig;
use crate::model::{ApiResult, Brewery};
use crate::usecase::GetAllBreweriesUseCase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Initial,
    LoadMore,
}

#[derive(Default)]
struct FetchSlot {
    generation: u64,
    cancel: Option<CancellationToken>,
    /// Set once the current initial fetch has replaced the list.
    replaced: bool,
}

struct Inner {
    get_all_breweries: GetAllBreweriesUseCase,
    paging: PagingConfig,

    state: watch::Sender<BreweriesScreenState>,
    loading: watch::Sender<bool>,
    infinite_scroll: watch::Sender<bool>,
    error_message: watch::Sender<Option<String>>,
    selected: watch::Sender<Option<BreweryDetailsUiData>>,

    /// Domain entities behind the visible rows, keyed like the rows.
    catalog: DashMap<String, Brewery>,
    /// Last page folded into the rows; 0 before the first one. Reset only
    /// together with the rows.
    committed_page: AtomicU32,

    initial: Mutex<FetchSlot>,
    load_more: Mutex<FetchSlot>,
    cancel: CancellationToken,
}

/// State holder for the breweries list and its details selection.
///
/// Commands must be issued from within a tokio runtime. Dropping the
/// view-model cancels every fetch it started.
pub struct BreweriesViewModel {
    inner: Arc<Inner>,
}

impl BreweriesViewModel {
    pub fn new(get_all_breweries: GetAllBreweriesUseCase, paging: PagingConfig) -> Self {
        let (state, _) = watch::channel(BreweriesScreenState::default());
        let (loading, _) = watch::channel(false);
        let (infinite_scroll, _) = watch::channel(false);
        let (error_message, _) = watch::channel(None);
        let (selected, _) = watch::channel(None);

        Self {
            inner: Arc::new(Inner {
                get_all_breweries,
                paging,
                state,
                loading,
                infinite_scroll,
                error_message,
                selected,
                catalog: DashMap::new(),
                committed_page: AtomicU32::new(0),
                initial: Mutex::new(FetchSlot::default()),
                load_more: Mutex::new(FetchSlot::default()),
                cancel: CancellationToken::new(),
            }),
        }
    }

    // ── Observables ──────────────────────────────────────────────────

    pub fn state(&self) -> watch::Receiver<BreweriesScreenState> {
        self.inner.state.subscribe()
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.inner.loading.subscribe()
    }

    pub fn infinite_scroll_in_progress(&self) -> watch::Receiver<bool> {
        self.inner.infinite_scroll.subscribe()
    }

    pub fn error_message(&self) -> watch::Receiver<Option<String>> {
        self.inner.error_message.subscribe()
    }

    pub fn selected_brewery(&self) -> watch::Receiver<Option<BreweryDetailsUiData>> {
        self.inner.selected.subscribe()
    }

    /// Last page folded successfully; 0 until the first page arrives.
    pub fn current_page(&self) -> u32 {
        self.inner.committed_page.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load the first page. The rows on screen are replaced once the fetch
    /// reports `Loading` or `Success`; a bare failure leaves them and the
    /// page counter as they were. A load-more still in flight is abandoned.
    pub fn on_collecting_started(&self) {
        if self.is_closed() {
            warn!("ignoring initial load on a closed view-model");
            return;
        }

        self.inner.supersede(FetchKind::LoadMore);
        self.inner.infinite_scroll.send_replace(false);

        self.inner.loading.send_replace(true);
        info!("loading first page of breweries");
        self.spawn_fetch(FetchKind::Initial, 1);
    }

    /// Load the page after the last one that succeeded. Dropped while a
    /// load-more is already running.
    pub fn on_load_more_triggered(&self) {
        if self.is_closed() {
            return;
        }

        let started = self.inner.infinite_scroll.send_if_modified(|in_progress| {
            if *in_progress {
                false
            } else {
                *in_progress = true;
                true
            }
        });
        if !started {
            debug!("load more already in progress");
            return;
        }

        let page = self.current_page() + 1;
        debug!(page, "loading more breweries");
        self.spawn_fetch(FetchKind::LoadMore, page);
    }

    /// Dismiss the current error. Never refetches.
    pub fn clear_error(&self) {
        self.inner.error_message.send_if_modified(|message| message.take().is_some());
    }

    /// Show details for the row with `key`. Returns `false` (and leaves the
    /// selection alone) when no loaded brewery has that key.
    pub fn select_brewery(&self, key: &str) -> bool {
        let Some(details) = self
            .inner
            .catalog
            .get(key)
            .map(|entry| BreweryDetailsUiData::from(entry.value()))
        else {
            debug!(key, "no brewery to select");
            return false;
        };
        self.inner.selected.send_replace(Some(details));
        true
    }

    pub fn clear_selection(&self) {
        self.inner.selected.send_if_modified(|selected| selected.take().is_some());
    }

    /// Cancel every fetch. Results that arrive afterwards are discarded.
    pub fn close(&self) {
        if self.is_closed() {
            return;
        }
        self.inner.supersede(FetchKind::Initial);
        self.inner.supersede(FetchKind::LoadMore);
        self.inner.cancel.cancel();
        debug!("breweries view-model closed");
    }

    fn spawn_fetch(&self, kind: FetchKind, page: u32) {
        let stream = self
            .inner
            .get_all_breweries
            .invoke(page, self.inner.paging.page_size);
        let (generation, cancel) = self.inner.begin(kind);
        tokio::spawn(run_fetch(Arc::clone(&self.inner), kind, generation, page, stream, cancel));
    }
}

impl Drop for BreweriesViewModel {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_fetch(
    inner: Arc<Inner>,
    kind: FetchKind,
    generation: u64,
    page: u32,
    mut stream: BoxStream<'static, ApiResult>,
    cancel: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(?kind, page, "fetch cancelled");
                break;
            }
            next = stream.next() => next,
        };

        let Some(result) = next else { break };
        if !inner.fold(kind, generation, page, result) {
            break;
        }
    }
}

impl Inner {
    fn slot(&self, kind: FetchKind) -> MutexGuard<'_, FetchSlot> {
        let slot = match kind {
            FetchKind::Initial => &self.initial,
            FetchKind::LoadMore => &self.load_more,
        };
        slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flag(&self, kind: FetchKind) -> &watch::Sender<bool> {
        match kind {
            FetchKind::Initial => &self.loading,
            FetchKind::LoadMore => &self.infinite_scroll,
        }
    }

    /// Claim `kind`'s slot for a new fetch, cancelling the previous one.
    fn begin(&self, kind: FetchKind) -> (u64, CancellationToken) {
        let mut slot = self.slot(kind);
        slot.generation += 1;
        slot.replaced = false;
        if let Some(previous) = slot.cancel.take() {
            previous.cancel();
        }
        let token = self.cancel.child_token();
        slot.cancel = Some(token.clone());
        (slot.generation, token)
    }

    /// Invalidate whatever is running in `kind`'s slot.
    fn supersede(&self, kind: FetchKind) {
        let mut slot = self.slot(kind);
        slot.generation += 1;
        if let Some(previous) = slot.cancel.take() {
            previous.cancel();
        }
    }

    /// Fold one emission. Returns `false` once the fetch is finished or
    /// no longer current.
    ///
    /// A terminal result clears only the flag of the stream that produced
    /// it; the other stream may still be running and owns its own flag.
    fn fold(&self, kind: FetchKind, generation: u64, page: u32, result: ApiResult) -> bool {
        let mut slot = self.slot(kind);
        if slot.generation != generation {
            debug!(?kind, page, "discarding stale result");
            return false;
        }

        match result {
            ApiResult::Loading => {
                if kind == FetchKind::Initial && !slot.replaced {
                    slot.replaced = true;
                    self.reset_rows(with_placeholders(self.paging.placeholder_rows));
                }
                true
            }
            ApiResult::Success(breweries) => {
                if kind == FetchKind::Initial && !slot.replaced {
                    slot.replaced = true;
                    self.reset_rows(Vec::new());
                }
                self.append(&breweries);
                self.committed_page.store(page, Ordering::SeqCst);
                self.flag(kind).send_replace(false);
                false
            }
            ApiResult::Error(error) => {
                warn!(?kind, page, %error, "brewery page failed");
                self.state.send_modify(|s| purge_placeholders(&mut s.breweries));
                self.error_message.send_replace(Some(error.to_string()));
                self.flag(kind).send_replace(false);
                false
            }
            ApiResult::Offline { error, cached } => {
                warn!(?kind, page, %error, cached = cached.len(), "showing cached breweries");
                self.append(&cached);
                self.error_message.send_replace(Some(error.to_string()));
                self.flag(kind).send_replace(false);
                false
            }
        }
    }

    /// Start the list over: rows, catalog and page counter move together.
    /// A load-more begun against the old rows is superseded.
    fn reset_rows(&self, rows: Vec<BreweryUiData>) {
        self.supersede(FetchKind::LoadMore);
        self.infinite_scroll.send_replace(false);
        self.catalog.clear();
        self.committed_page.store(0, Ordering::SeqCst);
        self.state.send_modify(|s| s.breweries = rows);
    }

    fn append(&self, breweries: &[Brewery]) {
        let mut appended = Vec::new();
        self.state.send_modify(|s| appended = fold_rows(&mut s.breweries, breweries));

        for i in appended {
            let brewery = &breweries[i];
            self.catalog.insert(brewery.id.clone(), brewery.clone());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use async_stream::stream;
    use tokio::sync::mpsc;

    use super::*;
    use crate::error::CoreError;
    use crate::repository::BreweriesRepository;

    type Call = (u32, mpsc::UnboundedSender<ApiResult>);

    /// Repository whose every call hands the test a sender to drive the
    /// returned stream.
    struct ChannelRepository {
        calls: mpsc::UnboundedSender<Call>,
    }

    impl BreweriesRepository for ChannelRepository {
        fn get_breweries(&self, page: u32, _page_size: u32) -> BoxStream<'static, ApiResult> {
            let (tx, mut rx) = mpsc::unbounded_channel();
            self.calls.send((page, tx)).unwrap();
            Box::pin(stream! {
                while let Some(result) = rx.recv().await {
                    let terminal = result.is_terminal();
                    yield result;
                    if terminal {
                        break;
                    }
                }
            })
        }
    }

    fn view_model() -> (BreweriesViewModel, mpsc::UnboundedReceiver<Call>) {
        let (calls, rx) = mpsc::unbounded_channel();
        let use_case = GetAllBreweriesUseCase::new(Arc::new(ChannelRepository { calls }));
        (BreweriesViewModel::new(use_case, PagingConfig::default()), rx)
    }

    fn brewery(id: &str, name: &str) -> Brewery {
        Brewery {
            id: id.into(),
            name: name.into(),
            ..Brewery::default()
        }
    }

    fn keys(vm: &BreweriesViewModel) -> Vec<String> {
        vm.state()
            .borrow()
            .breweries
            .iter()
            .map(|r| r.key.clone())
            .collect()
    }

    async fn settle(mut flag: watch::Receiver<bool>) {
        tokio::time::timeout(Duration::from_secs(2), flag.wait_for(|v| !*v))
            .await
            .unwrap()
            .unwrap();
    }

    async fn load_first_page(
        vm: &BreweriesViewModel,
        calls: &mut mpsc::UnboundedReceiver<Call>,
        rows: Vec<Brewery>,
    ) {
        vm.on_collecting_started();
        let (page, tx) = calls.recv().await.unwrap();
        assert_eq!(page, 1);
        tx.send(ApiResult::Loading).unwrap();
        tx.send(ApiResult::Success(rows)).unwrap();
        settle(vm.loading()).await;
    }

    // ── Initial load ────────────────────────────────────────────────

    #[tokio::test]
    async fn loading_shows_placeholders() {
        let (vm, mut calls) = view_model();
        vm.on_collecting_started();
        assert!(*vm.loading().borrow());

        let (_, tx) = calls.recv().await.unwrap();
        tx.send(ApiResult::Loading).unwrap();

        let mut state = vm.state();
        let snapshot = state
            .wait_for(|s| !s.breweries.is_empty())
            .await
            .unwrap()
            .clone();
        assert_eq!(snapshot.breweries.len(), 20);
        assert!(snapshot.breweries.iter().all(BreweryUiData::is_placeholder));
        assert!(*vm.loading().borrow());
    }

    #[tokio::test]
    async fn first_page_replaces_placeholders() {
        let (vm, mut calls) = view_model();
        load_first_page(&vm, &mut calls, vec![brewery("a", "A"), brewery("b", "B")]).await;

        assert_eq!(keys(&vm), ["a", "b"]);
        assert_eq!(vm.current_page(), 1);
        assert!(vm.error_message().borrow().is_none());
    }

    // ── Load more ───────────────────────────────────────────────────

    #[tokio::test]
    async fn load_more_appends_next_page() {
        let (vm, mut calls) = view_model();
        load_first_page(&vm, &mut calls, vec![brewery("a", "A"), brewery("b", "B")]).await;

        vm.on_load_more_triggered();
        assert!(*vm.infinite_scroll_in_progress().borrow());
        let (page, tx) = calls.recv().await.unwrap();
        assert_eq!(page, 2);
        tx.send(ApiResult::Loading).unwrap();
        tx.send(ApiResult::Success(vec![brewery("c", "C")])).unwrap();
        settle(vm.infinite_scroll_in_progress()).await;

        assert_eq!(keys(&vm), ["a", "b", "c"]);
        assert!(!*vm.loading().borrow());
        assert!(!*vm.infinite_scroll_in_progress().borrow());
        assert_eq!(vm.current_page(), 2);
    }

    #[tokio::test]
    async fn failed_load_more_keeps_rows_and_retries_same_page() {
        let (vm, mut calls) = view_model();
        load_first_page(&vm, &mut calls, vec![brewery("a", "A")]).await;

        vm.on_load_more_triggered();
        let (page, tx) = calls.recv().await.unwrap();
        assert_eq!(page, 2);
        tx.send(ApiResult::Loading).unwrap();
        tx.send(ApiResult::error(CoreError::Internal("boom".into())))
            .unwrap();
        settle(vm.infinite_scroll_in_progress()).await;

        assert_eq!(keys(&vm), ["a"]);
        assert_eq!(
            vm.error_message().borrow().as_deref(),
            Some("Internal error: boom")
        );
        assert_eq!(vm.current_page(), 1);

        vm.on_load_more_triggered();
        let (page, _tx) = calls.recv().await.unwrap();
        assert_eq!(page, 2);
    }

    #[tokio::test]
    async fn load_more_is_dropped_while_in_progress() {
        let (vm, mut calls) = view_model();
        load_first_page(&vm, &mut calls, vec![brewery("a", "A")]).await;

        vm.on_load_more_triggered();
        vm.on_load_more_triggered();

        let (page, _tx) = calls.recv().await.unwrap();
        assert_eq!(page, 2);
        assert!(calls.try_recv().is_err());
    }

    #[tokio::test]
    async fn duplicate_keys_across_pages_are_skipped() {
        let (vm, mut calls) = view_model();
        load_first_page(&vm, &mut calls, vec![brewery("a", "A"), brewery("b", "B")]).await;

        vm.on_load_more_triggered();
        let (_, tx) = calls.recv().await.unwrap();
        tx.send(ApiResult::Success(vec![brewery("b", "B"), brewery("c", "C")]))
            .unwrap();
        settle(vm.infinite_scroll_in_progress()).await;

        assert_eq!(keys(&vm), ["a", "b", "c"]);
    }

    // ── Errors ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn initial_error_purges_placeholders() {
        let (vm, mut calls) = view_model();
        vm.on_collecting_started();
        let (_, tx) = calls.recv().await.unwrap();
        tx.send(ApiResult::Loading).unwrap();
        tx.send(ApiResult::error(CoreError::NoConnectivity)).unwrap();
        settle(vm.loading()).await;

        assert!(keys(&vm).is_empty());
        assert_eq!(
            vm.error_message().borrow().as_deref(),
            Some("No internet connection")
        );
    }

    #[tokio::test]
    async fn offline_folds_cached_rows_and_sets_error() {
        let (vm, mut calls) = view_model();
        vm.on_collecting_started();
        let (_, tx) = calls.recv().await.unwrap();
        tx.send(ApiResult::Loading).unwrap();
        tx.send(ApiResult::Offline {
            error: Arc::new(CoreError::NoConnectivity),
            cached: vec![brewery("a", "A"), brewery("z", "")],
        })
        .unwrap();
        settle(vm.loading()).await;

        assert_eq!(keys(&vm), ["a"]);
        assert!(vm.error_message().borrow().is_some());
    }

    #[tokio::test]
    async fn clear_error_is_idempotent() {
        let (vm, _calls) = view_model();
        let mut errors = vm.error_message();
        vm.clear_error();
        assert!(!errors.has_changed().unwrap());

        vm.inner
            .error_message
            .send_replace(Some("No internet connection".into()));
        errors.mark_unchanged();
        vm.clear_error();
        assert!(errors.has_changed().unwrap());
        assert!(errors.borrow_and_update().is_none());

        vm.clear_error();
        assert!(!errors.has_changed().unwrap());
    }

    #[tokio::test]
    async fn terminal_folds_never_leave_blank_rows() {
        let (vm, mut calls) = view_model();
        load_first_page(
            &vm,
            &mut calls,
            vec![brewery("a", "A"), brewery("b", " "), brewery("c", "")],
        )
        .await;

        let state = vm.state();
        assert!(state.borrow().breweries.iter().all(|r| !r.is_placeholder()));
        assert_eq!(keys(&vm), ["a"]);
    }

    // ── Supersession and lifecycle ──────────────────────────────────

    #[tokio::test]
    async fn restarting_initial_load_discards_stale_fetch() {
        let (vm, mut calls) = view_model();
        vm.on_collecting_started();
        let (_, stale) = calls.recv().await.unwrap();

        vm.on_collecting_started();
        let (_, fresh) = calls.recv().await.unwrap();

        // The superseded stream was dropped along with its task.
        tokio::time::timeout(Duration::from_secs(2), stale.closed())
            .await
            .unwrap();
        let _ = stale.send(ApiResult::Success(vec![brewery("old", "Old")]));

        fresh.send(ApiResult::Success(vec![brewery("new", "New")])).unwrap();
        settle(vm.loading()).await;

        assert_eq!(keys(&vm), ["new"]);
    }

    #[tokio::test]
    async fn reload_discards_superseded_load_more() {
        let (vm, mut calls) = view_model();
        load_first_page(&vm, &mut calls, vec![brewery("a", "A")]).await;

        vm.on_load_more_triggered();
        let (page, stale) = calls.recv().await.unwrap();
        assert_eq!(page, 2);

        vm.on_collecting_started();
        assert!(!*vm.infinite_scroll_in_progress().borrow());
        let (page, fresh) = calls.recv().await.unwrap();
        assert_eq!(page, 1);

        tokio::time::timeout(Duration::from_secs(2), stale.closed())
            .await
            .unwrap();
        let _ = stale.send(ApiResult::Success(vec![brewery("old", "Old")]));

        fresh.send(ApiResult::Loading).unwrap();
        fresh.send(ApiResult::Success(vec![brewery("new", "New")])).unwrap();
        settle(vm.loading()).await;

        assert_eq!(keys(&vm), ["new"]);
        assert!(!*vm.infinite_scroll_in_progress().borrow());
        assert_eq!(vm.current_page(), 1);
    }

    #[tokio::test]
    async fn failed_reload_keeps_rows_and_page_in_step() {
        let (vm, mut calls) = view_model();
        load_first_page(&vm, &mut calls, vec![brewery("a", "A")]).await;

        vm.on_load_more_triggered();
        let (_, tx) = calls.recv().await.unwrap();
        tx.send(ApiResult::Success(vec![brewery("b", "B")])).unwrap();
        settle(vm.infinite_scroll_in_progress()).await;
        assert_eq!(vm.current_page(), 2);

        // Offline reload: the repository fails without ever reporting Loading.
        vm.on_collecting_started();
        let (_, tx) = calls.recv().await.unwrap();
        tx.send(ApiResult::error(CoreError::NoConnectivity)).unwrap();
        settle(vm.loading()).await;

        assert_eq!(keys(&vm), ["a", "b"]);
        assert_eq!(vm.current_page(), 2);
        assert!(vm.select_brewery("b"));

        vm.on_load_more_triggered();
        let (page, tx) = calls.recv().await.unwrap();
        assert_eq!(page, 3);
        tx.send(ApiResult::Success(vec![brewery("c", "C")])).unwrap();
        settle(vm.infinite_scroll_in_progress()).await;
        assert_eq!(keys(&vm), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn reload_success_without_loading_replaces_rows() {
        let (vm, mut calls) = view_model();
        load_first_page(&vm, &mut calls, vec![brewery("a", "A"), brewery("b", "B")]).await;

        vm.on_collecting_started();
        let (_, tx) = calls.recv().await.unwrap();
        tx.send(ApiResult::Success(vec![brewery("c", "C")])).unwrap();
        settle(vm.loading()).await;

        assert_eq!(keys(&vm), ["c"]);
        assert_eq!(vm.current_page(), 1);
        assert!(!vm.select_brewery("a"));
    }

    #[tokio::test]
    async fn close_cancels_in_flight_fetches() {
        let (vm, mut calls) = view_model();
        vm.on_collecting_started();
        let (_, tx) = calls.recv().await.unwrap();

        vm.close();
        assert!(vm.is_closed());
        tokio::time::timeout(Duration::from_secs(2), tx.closed())
            .await
            .unwrap();
        assert!(tx.send(ApiResult::Success(vec![brewery("a", "A")])).is_err());
        assert!(keys(&vm).is_empty());

        vm.on_collecting_started();
        assert!(calls.try_recv().is_err());
    }

    // ── Selection ───────────────────────────────────────────────────

    #[tokio::test]
    async fn select_and_clear_brewery() {
        let (vm, mut calls) = view_model();
        let mut a = brewery("a", "Alpha");
        a.phone = Some("555-0100".into());
        load_first_page(&vm, &mut calls, vec![a]).await;

        assert!(vm.select_brewery("a"));
        let selected = vm.selected_brewery().borrow().clone().unwrap();
        assert_eq!(selected.name, "Alpha");
        assert_eq!(selected.phone.as_deref(), Some("555-0100"));

        assert!(!vm.select_brewery("placeholder:0"));
        assert_eq!(vm.selected_brewery().borrow().as_ref().map(|d| d.key.as_str()), Some("a"));

        vm.clear_selection();
        assert!(vm.selected_brewery().borrow().is_none());
    }
}
