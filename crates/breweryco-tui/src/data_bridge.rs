//! Data bridge: forwards view-model and connectivity changes as actions.
//!
//! Runs as a background task. Sends a snapshot of every source first so
//! screens render immediately, then one action per change until cancelled.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use breweryco_core::{
    BreweriesScreenState, BreweriesViewModel, BreweryDetailsUiData, ConnectivityStream,
};

use crate::action::Action;

/// Subscriptions the bridge listens to.
pub struct BridgeSources {
    state: watch::Receiver<BreweriesScreenState>,
    loading: watch::Receiver<bool>,
    loading_more: watch::Receiver<bool>,
    error: watch::Receiver<Option<String>>,
    selected: watch::Receiver<Option<BreweryDetailsUiData>>,
    connectivity: ConnectivityStream,
}

impl BridgeSources {
    pub fn new(view_model: &BreweriesViewModel, connectivity: ConnectivityStream) -> Self {
        Self {
            state: view_model.state(),
            loading: view_model.loading(),
            loading_more: view_model.infinite_scroll_in_progress(),
            error: view_model.error_message(),
            selected: view_model.selected_brewery(),
            connectivity,
        }
    }
}

fn state_action(rx: &mut watch::Receiver<BreweriesScreenState>) -> Action {
    Action::BreweriesUpdated(Arc::new(rx.borrow_and_update().clone()))
}

fn selection_action(rx: &mut watch::Receiver<Option<BreweryDetailsUiData>>) -> Action {
    Action::SelectionChanged(rx.borrow_and_update().clone().map(Arc::new))
}

pub async fn run_data_bridge(
    mut sources: BridgeSources,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let snapshot = [
        state_action(&mut sources.state),
        Action::LoadingChanged(*sources.loading.borrow_and_update()),
        Action::LoadingMoreChanged(*sources.loading_more.borrow_and_update()),
        Action::ErrorChanged(sources.error.borrow_and_update().clone()),
        selection_action(&mut sources.selected),
        Action::ConnectivityChanged(sources.connectivity.current()),
    ];
    for action in snapshot {
        let _ = action_tx.send(action);
    }

    loop {
        let action = tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = sources.state.changed() => state_action(&mut sources.state),
            Ok(()) = sources.loading.changed() => {
                Action::LoadingChanged(*sources.loading.borrow_and_update())
            }
            Ok(()) = sources.loading_more.changed() => {
                Action::LoadingMoreChanged(*sources.loading_more.borrow_and_update())
            }
            Ok(()) = sources.error.changed() => {
                Action::ErrorChanged(sources.error.borrow_and_update().clone())
            }
            Ok(()) = sources.selected.changed() => selection_action(&mut sources.selected),
            Some(connection) = sources.connectivity.changed() => {
                debug!(connection = connection.label(), "connectivity changed");
                Action::ConnectivityChanged(connection)
            }
        };

        if action_tx.send(action).is_err() {
            break;
        }
    }

    debug!("data bridge shut down");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use breweryco_core::{
        ApiResult, BreweriesRepository, Brewery, ConnectionType, ConnectivityObserver,
        GetAllBreweriesUseCase, NetworkConnectivityMonitor, PagingConfig,
    };
    use futures::StreamExt;
    use futures::stream::BoxStream;
    use pretty_assertions::assert_eq;

    use super::*;

    struct OnePage;

    impl BreweriesRepository for OnePage {
        fn get_breweries(&self, _page: u32, _size: u32) -> BoxStream<'static, ApiResult> {
            let rows = vec![Brewery {
                id: "b1".into(),
                name: "Barrel Works".into(),
                ..Brewery::default()
            }];
            futures::stream::iter([ApiResult::Loading, ApiResult::Success(rows)]).boxed()
        }
    }

    async fn next_matching(
        rx: &mut mpsc::UnboundedReceiver<Action>,
        pred: impl Fn(&Action) -> bool,
    ) -> Action {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let action = rx.recv().await.unwrap();
                if pred(&action) {
                    return action;
                }
            }
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn forwards_snapshot_then_changes() {
        let monitor = NetworkConnectivityMonitor::new();
        let view_model = BreweriesViewModel::new(
            GetAllBreweriesUseCase::new(Arc::new(OnePage)),
            PagingConfig::default(),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let bridge = tokio::spawn(run_data_bridge(
            BridgeSources::new(&view_model, monitor.observe()),
            tx,
            cancel.clone(),
        ));

        let first = next_matching(&mut rx, |a| matches!(a, Action::ConnectivityChanged(_))).await;
        assert!(matches!(first, Action::ConnectivityChanged(ConnectionType::Online)));

        view_model.on_collecting_started();
        let Action::BreweriesUpdated(state) = next_matching(&mut rx, |a| {
            matches!(a, Action::BreweriesUpdated(s) if s.real_rows() == 1)
        })
        .await
        else {
            unreachable!()
        };
        assert_eq!(state.last_key(), Some("b1"));

        assert!(view_model.select_brewery("b1"));
        let selected =
            next_matching(&mut rx, |a| matches!(a, Action::SelectionChanged(Some(_)))).await;
        assert!(matches!(selected, Action::SelectionChanged(Some(d)) if d.name == "Barrel Works"));

        monitor.set_connection_type(ConnectionType::NoInternet);
        let offline = next_matching(&mut rx, |a| {
            matches!(a, Action::ConnectivityChanged(ConnectionType::NoInternet))
        })
        .await;
        assert!(matches!(offline, Action::ConnectivityChanged(_)));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), bridge)
            .await
            .unwrap()
            .unwrap();
    }
}
