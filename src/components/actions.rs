use crate::api::{MpdClient, MpdCommand};
use crate::controller::{self, InFlight, RefreshScope};
use crate::state::{PanelState, PanelUpdate, Toggle};
use dioxus::prelude::*;

/// Handle given to components for talking to the proxy.
///
/// Every method spawns onto the current scope and feeds the outcome into the
/// shared [`PanelState`] signal.
#[derive(Clone)]
pub struct PanelActions {
    client: MpdClient,
    state: Signal<PanelState>,
    in_flight: InFlight,
}

impl PanelActions {
    pub fn new(client: MpdClient, state: Signal<PanelState>) -> Self {
        Self {
            client,
            state,
            in_flight: InFlight::default(),
        }
    }

    pub fn client(&self) -> &MpdClient {
        &self.client
    }

    pub fn send(&self, command: MpdCommand) {
        let this = self.clone();
        spawn(async move {
            match controller::send_command(&this.client, command).await {
                Ok(update) => this.finish(update).await,
                Err(err) => tracing::warn!(error = %err, "command failed"),
            }
        });
    }

    pub fn toggle(&self, toggle: Toggle) {
        if self.in_flight.is_pending(toggle) {
            tracing::debug!(?toggle, "ignoring click while toggle is pending");
            return;
        }
        let this = self.clone();
        spawn(async move {
            match controller::toggle(&this.client, &this.in_flight, toggle).await {
                Ok(Some(update)) => this.finish(update).await,
                Ok(None) => {}
                Err(err) => tracing::warn!(?toggle, error = %err, "toggle failed"),
            }
        });
    }

    pub fn refresh(&self, scope: RefreshScope) {
        let this = self.clone();
        spawn(async move { this.refresh_now(scope).await });
    }

    /// Refresh inline; used by tasks that already run on the scope.
    pub async fn refresh_now(&self, scope: RefreshScope) {
        let updates = controller::refresh(&self.client, scope).await;
        let mut state = self.state;
        for update in updates {
            state.write().apply(update);
        }
    }

    async fn finish(&self, update: PanelUpdate) {
        let follow_up = match &update {
            PanelUpdate::Sent(command) => controller::follow_up(command),
            _ => None,
        };
        let mut state = self.state;
        state.write().apply(update);
        if let Some(scope) = follow_up {
            self.refresh_now(scope).await;
        }
    }
}
