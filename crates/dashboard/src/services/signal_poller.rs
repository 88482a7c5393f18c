use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use common::actors::{Actor, ActorType, ControlMessage, HeartbeatGuard};
use common::models::TokenSignal;
use strategy::SignalService;

/// Latest state of the signals card. A failed poll keeps the previous
/// signals and records the message to show next to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalBoard {
    pub signals: Vec<TokenSignal>,
    pub error: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
}

pub struct SignalPoller {
    id: Uuid,
    service: SignalService,
    interval: Duration,
    board_tx: watch::Sender<SignalBoard>,
}

impl SignalPoller {
    pub fn new(
        service: SignalService,
        interval: Duration,
        board_tx: watch::Sender<SignalBoard>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            service,
            interval,
            board_tx,
        }
    }

    async fn poll_once(&self) {
        match self.service.refresh().await {
            Ok(signals) => {
                self.board_tx.send_replace(SignalBoard {
                    signals,
                    error: None,
                    last_update: Some(Utc::now()),
                });
            }
            Err(e) => {
                self.board_tx.send_modify(|board| {
                    board.error = Some(e.user_message());
                });
            }
        }
    }
}

#[async_trait]
impl Actor for SignalPoller {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> ActorType {
        ActorType::SignalPoller
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let _heartbeat = HeartbeatGuard::new(self.spawn_heartbeat(supervisor_tx.clone()));
        info!("Starting signal poller every {:?}", self.interval);

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if self.board_tx.is_closed() {
                warn!("No one is watching signals anymore. Stopping poller.");
                supervisor_tx.send(ControlMessage::Shutdown(self.id)).await?;
                return Ok(());
            }
            self.poll_once().await;
        }
    }
}
