use std::{collections::HashMap, future::Future, time::Duration};

use anyhow::anyhow;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};

use common::actors::{Actor, ActorType, ControlMessage};

pub const CHECK_INTERVAL: Duration = Duration::from_secs(1);
pub const UNRESPONSIVE_AFTER: Duration = Duration::from_secs(3);

pub type ActorFactory = Box<dyn Fn() -> Box<dyn Actor> + Send + Sync>;

/// Spawns registered actors and respawns any whose heartbeat goes quiet.
///
/// Heartbeats carry the id of the actor instance that sent them. Ids of
/// replaced instances are forgotten, so a late pulse from a restarted
/// actor cannot keep its successor's slot alive.
pub struct Supervisor {
    actor_factories: HashMap<ActorType, ActorFactory>,
    instances: HashMap<Uuid, ActorType>,
    pulses: HashMap<ActorType, Instant>,
    handles: HashMap<ActorType, JoinHandle<()>>,
    tx: mpsc::Sender<ControlMessage>,
    rx: Option<mpsc::Receiver<ControlMessage>>,
}

impl Supervisor {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<ControlMessage>(512);
        Self {
            actor_factories: HashMap::new(),
            instances: HashMap::new(),
            pulses: HashMap::new(),
            handles: HashMap::new(),
            tx,
            rx: Some(rx),
        }
    }

    pub fn register_actor(&mut self, actor_type: ActorType, factory: ActorFactory) {
        self.actor_factories.insert(actor_type, factory);
    }

    /// Runs until `shutdown` resolves, then aborts every actor.
    pub async fn start<F>(&mut self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut supervisor_rx = self
            .rx
            .take()
            .ok_or_else(|| anyhow!("supervisor already started"))?;
        let mut check_interval = time::interval(CHECK_INTERVAL);
        tokio::pin!(shutdown);

        let actors: Vec<ActorType> = self.actor_factories.keys().copied().collect();
        for actor in actors {
            self.spawn_actor(actor);
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down {} actors", self.handles.len());
                    for (_, handle) in self.handles.drain() {
                        handle.abort();
                    }
                    self.pulses.clear();
                    self.instances.clear();
                    return Ok(());
                }

                Some(msg) = supervisor_rx.recv() => {
                    self.handle_message(msg);
                }

                _ = check_interval.tick() => {
                    let dead_timeout = Instant::now() - UNRESPONSIVE_AFTER;

                    let mut dead_actors = Vec::new();
                    for (actor_type, &last_pulse) in self.pulses.iter() {
                        if last_pulse < dead_timeout {
                            warn!("{:?} is unresponsive!", actor_type);
                            dead_actors.push(*actor_type);
                            if let Some(handle) = self.handles.get(actor_type) {
                                handle.abort();
                            }
                        }
                    }

                    for actor_type in dead_actors {
                        self.spawn_actor(actor_type);
                    }
                }
            }
        }
    }

    fn handle_message(&mut self, msg: ControlMessage) {
        match msg {
            ControlMessage::Heartbeat(id) => match self.instances.get(&id) {
                Some(actor_type) => {
                    self.pulses.insert(*actor_type, Instant::now());
                }
                None => debug!("Ignoring heartbeat from retired actor {}", id),
            },
            ControlMessage::Shutdown(id) => {
                if let Some(actor_type) = self.instances.remove(&id) {
                    warn!("{:?} is shutting down gracefully.", actor_type);
                    self.pulses.remove(&actor_type);
                    if let Some(handle) = self.handles.remove(&actor_type) {
                        handle.abort();
                    }
                }
            }
            ControlMessage::Error(id, error_msg) => {
                if let Some(actor_type) = self.instances.get(&id) {
                    error!("Actor {:?} reported error: {}", actor_type, error_msg);
                    self.pulses.insert(*actor_type, Instant::now());
                }
            }
        }
    }

    fn spawn_actor(&mut self, actor_type: ActorType) {
        let Some(factory) = self.actor_factories.get(&actor_type) else {
            return;
        };
        let mut new_actor = factory();
        let id = new_actor.id();
        let tx = self.tx.clone();

        let new_actor_handle = tokio::spawn(async move {
            if let Err(e) = new_actor.run(tx).await {
                error!("Actor {:?} crashed: {}", actor_type, e);
            }
        });

        self.instances.retain(|_, kind| *kind != actor_type);
        self.instances.insert(id, actor_type);
        if let Some(old) = self.handles.insert(actor_type, new_actor_handle) {
            old.abort();
        }
        self.pulses.insert(actor_type, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use common::actors::HeartbeatGuard;

    use super::*;

    struct Crashing {
        id: Uuid,
    }

    #[async_trait]
    impl Actor for Crashing {
        fn name(&self) -> ActorType {
            ActorType::SignalPoller
        }

        fn id(&self) -> Uuid {
            self.id
        }

        async fn run(&mut self, _supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
            Err(anyhow!("boom"))
        }
    }

    struct Healthy {
        id: Uuid,
    }

    #[async_trait]
    impl Actor for Healthy {
        fn name(&self) -> ActorType {
            ActorType::GlobalStatsPoller
        }

        fn id(&self) -> Uuid {
            self.id
        }

        async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
            let _heartbeat = HeartbeatGuard::new(self.spawn_heartbeat(supervisor_tx));
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    fn counting<A, F>(spawns: &Arc<AtomicUsize>, make: F) -> ActorFactory
    where
        A: Actor + 'static,
        F: Fn(Uuid) -> A + Send + Sync + 'static,
    {
        let spawns = spawns.clone();
        Box::new(move || -> Box<dyn Actor> {
            spawns.fetch_add(1, Ordering::SeqCst);
            Box::new(make(Uuid::new_v4()))
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_crashed_actor_is_respawned() {
        let spawns = Arc::new(AtomicUsize::new(0));
        let mut supervisor = Supervisor::new();
        supervisor.register_actor(
            ActorType::SignalPoller,
            counting(&spawns, |id| Crashing { id }),
        );

        supervisor
            .start(time::sleep(Duration::from_secs(10)))
            .await
            .unwrap();

        assert!(spawns.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeating_actor_is_left_alone() {
        let spawns = Arc::new(AtomicUsize::new(0));
        let mut supervisor = Supervisor::new();
        supervisor.register_actor(
            ActorType::GlobalStatsPoller,
            counting(&spawns, |id| Healthy { id }),
        );

        supervisor
            .start(time::sleep(Duration::from_secs(10)))
            .await
            .unwrap();

        assert_eq!(spawns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_heartbeat_from_unknown_instance_is_ignored() {
        let mut supervisor = Supervisor::new();
        supervisor.handle_message(ControlMessage::Heartbeat(Uuid::new_v4()));
        assert!(supervisor.pulses.is_empty());
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let mut supervisor = Supervisor::new();
        supervisor.start(async {}).await.unwrap();
        assert!(supervisor.start(async {}).await.is_err());
    }
}
