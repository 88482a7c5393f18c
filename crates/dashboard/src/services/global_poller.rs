use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};
use uuid::Uuid;

use common::actors::{Actor, ActorType, ControlMessage, HeartbeatGuard};
use market_data::MarketDataService;
use market_data::remote::GlobalData;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalBoard {
    pub stats: Option<GlobalData>,
    pub error: Option<String>,
}

/// Keeps the global market header fresh.
pub struct GlobalStatsPoller {
    id: Uuid,
    market: MarketDataService,
    interval: Duration,
    board_tx: watch::Sender<GlobalBoard>,
}

impl GlobalStatsPoller {
    pub fn new(
        market: MarketDataService,
        interval: Duration,
        board_tx: watch::Sender<GlobalBoard>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            market,
            interval,
            board_tx,
        }
    }

    async fn poll_once(&self) {
        match self.market.global().await {
            Ok(stats) => {
                self.board_tx.send_replace(GlobalBoard {
                    stats: Some(stats),
                    error: None,
                });
            }
            Err(e) => {
                error!("Error fetching global stats: {}", e);
                self.board_tx.send_modify(|board| board.error = Some(e.to_string()));
            }
        }
    }
}

#[async_trait]
impl Actor for GlobalStatsPoller {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> ActorType {
        ActorType::GlobalStatsPoller
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let _heartbeat = HeartbeatGuard::new(self.spawn_heartbeat(supervisor_tx.clone()));
        info!("Starting global stats poller every {:?}", self.interval);

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if self.board_tx.is_closed() {
                warn!("Global stats channel closed. Stopping poller.");
                supervisor_tx.send(ControlMessage::Shutdown(self.id)).await?;
                return Ok(());
            }
            self.poll_once().await;
        }
    }
}
