//! The polling service proper.

use std::sync::Arc;

use tracing::{debug, warn};

use vecdeck_client::VectorClient;
use vecdeck_conn::ConnectionManager;
use vecdeck_events::{Event, EventBridge};
use vecdeck_scheduler::{JobKey, JobState, JobTask, ScheduleRegistry};

/// Logical job names the poller supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobName {
    /// Collection-metadata polling.
    Collections,
}

impl JobName {
    /// Parse the wire name. `None` for anything unsupported.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "COLLECTION" => Some(JobName::Collections),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobName::Collections => "COLLECTION",
        }
    }
}

/// What a toggle request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Start,
    Stop,
}

/// Drives collection-metadata polling per connection scope.
pub struct PollingService {
    manager: Arc<ConnectionManager>,
    registry: Arc<ScheduleRegistry>,
    bridge: EventBridge,
}

impl PollingService {
    pub fn new(
        manager: Arc<ConnectionManager>,
        registry: Arc<ScheduleRegistry>,
        bridge: EventBridge,
    ) -> Self {
        Self {
            manager,
            registry,
            bridge,
        }
    }

    /// Register the collection poll job for `scope` (replacing any prior
    /// registration under the same key).
    ///
    /// The first fetch lands one cadence after registration — the
    /// registry does not fire eagerly.
    pub async fn start_polling(&self, scope: &str) {
        let key = JobKey::new(scope, JobName::Collections.as_str());
        let task = self.poll_task(key.clone());
        self.registry.set_collection_job(key, task).await;
    }

    /// Toggle a job for `scope`.
    ///
    /// `Start` resumes a stopped job or creates a missing one; `Stop`
    /// pauses a present job and fails for a scope that never registered
    /// one. The asymmetry is deliberate and preserved.
    pub async fn toggle(
        &self,
        scope: &str,
        name: &str,
        action: ToggleAction,
    ) -> crate::PollResult<()> {
        let Some(job) = JobName::parse(name) else {
            warn!(name, "toggle for unsupported job name");
            return Err(crate::PollError::UnsupportedJob);
        };
        let key = JobKey::new(scope, job.as_str());

        match action {
            ToggleAction::Start => match self.registry.job_state(&key).await {
                None => {
                    self.start_polling(scope).await;
                    Ok(())
                }
                Some(JobState::Stopped) => {
                    self.registry.start_job(&key).await;
                    Ok(())
                }
                Some(JobState::Running) => {
                    debug!(job = %key, "start for already-running job");
                    Ok(())
                }
            },
            ToggleAction::Stop => match self.registry.job_state(&key).await {
                None => {
                    warn!(job = %key, "stop for never-registered job");
                    Err(crate::PollError::JobNotFound)
                }
                Some(_) => {
                    self.registry.stop_job(&key).await;
                    Ok(())
                }
            },
        }
    }

    /// Build the per-tick task body for `key`.
    ///
    /// On failure the task stops its own job before returning the error;
    /// the registry logs it. A disconnect racing an in-flight tick lands
    /// here as `NotConnected` — same self-stop path, no locking.
    fn poll_task(&self, key: JobKey) -> JobTask {
        let manager = self.manager.clone();
        let registry = self.registry.clone();
        let bridge = self.bridge.clone();

        Arc::new(move || {
            let manager = manager.clone();
            let registry = registry.clone();
            let bridge = bridge.clone();
            let key = key.clone();

            Box::pin(async move {
                let result = async {
                    let client = manager.client_for_scope(&key.scope).await?;
                    let collections = client
                        .list_collections()
                        .await
                        .map_err(anyhow::Error::from)?;
                    Ok::<_, anyhow::Error>(collections)
                }
                .await;

                match result {
                    Ok(collections) => {
                        bridge.emit(Event::CollectionsChanged(collections));
                        Ok(())
                    }
                    Err(e) => {
                        debug!(job = %key, "poll failed, stopping own job");
                        registry.stop_job(&key).await;
                        Err(e)
                    }
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use vecdeck_client::Credentials;
    use vecdeck_client::testing::{MockClient, MockConnector};
    use vecdeck_scheduler::COLLECTION_POLL_CADENCE;

    const SCOPE: &str = "127.0.0.1:19530";

    struct Fixture {
        connector: Arc<MockConnector>,
        manager: Arc<ConnectionManager>,
        registry: Arc<ScheduleRegistry>,
        bridge: EventBridge,
        service: PollingService,
    }

    async fn connected_fixture() -> Fixture {
        let connector = MockConnector::healthy();
        let manager = Arc::new(ConnectionManager::new(
            connector.clone(),
            Duration::from_secs(3600),
        ));
        manager
            .connect(SCOPE, &Credentials::default())
            .await
            .unwrap();
        let registry = Arc::new(ScheduleRegistry::new());
        let bridge = EventBridge::new();
        let service =
            PollingService::new(manager.clone(), registry.clone(), bridge.clone());
        Fixture {
            connector,
            manager,
            registry,
            bridge,
            service,
        }
    }

    async fn client(fixture: &Fixture) -> Arc<MockClient> {
        fixture.connector.created().await[0].clone()
    }

    fn collection_key() -> JobKey {
        JobKey::new(SCOPE, "COLLECTION")
    }

    #[tokio::test(start_paused = true)]
    async fn first_emission_within_one_cadence() {
        let fixture = connected_fixture().await;
        let mut rx = fixture.bridge.subscribe();

        fixture.service.start_polling(SCOPE).await;
        // Nothing fires eagerly on registration.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(COLLECTION_POLL_CADENCE).await;
        let Event::CollectionsChanged(collections) = rx.recv().await.unwrap();
        assert_eq!(collections[0].name, "embeddings");
        assert_eq!(client(&fixture).await.list_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_list_stops_the_job() {
        let fixture = connected_fixture().await;
        fixture.service.start_polling(SCOPE).await;

        client(&fixture).await.fail_lists();
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(
            fixture.registry.job_state(&collection_key()).await,
            Some(JobState::Stopped)
        );
        let calls = client(&fixture).await.list_calls();
        assert_eq!(calls, 1);

        // Stopped means stopped — no further hammering.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(client(&fixture).await.list_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_start_resumes_after_self_stop() {
        let fixture = connected_fixture().await;
        let mut rx = fixture.bridge.subscribe();
        fixture.service.start_polling(SCOPE).await;

        client(&fixture).await.fail_lists();
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(
            fixture.registry.job_state(&collection_key()).await,
            Some(JobState::Stopped)
        );

        client(&fixture).await.restore_lists();
        fixture
            .service
            .toggle(SCOPE, "COLLECTION", ToggleAction::Start)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(
            fixture.registry.job_state(&collection_key()).await,
            Some(JobState::Running)
        );
        assert!(matches!(rx.recv().await, Ok(Event::CollectionsChanged(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_start_creates_missing_job() {
        let fixture = connected_fixture().await;
        assert_eq!(fixture.registry.job_state(&collection_key()).await, None);

        fixture
            .service
            .toggle(SCOPE, "COLLECTION", ToggleAction::Start)
            .await
            .unwrap();
        assert_eq!(
            fixture.registry.job_state(&collection_key()).await,
            Some(JobState::Running)
        );

        // Idempotent while running.
        fixture
            .service
            .toggle(SCOPE, "COLLECTION", ToggleAction::Start)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(client(&fixture).await.list_calls(), 1);
    }

    #[tokio::test]
    async fn toggle_stop_without_job_is_an_error() {
        let fixture = connected_fixture().await;
        let err = fixture
            .service
            .toggle(SCOPE, "COLLECTION", ToggleAction::Stop)
            .await
            .unwrap_err();
        assert_eq!(err, crate::PollError::JobNotFound);
        assert_eq!(err.to_string(), "No existed job entity");
    }

    #[tokio::test]
    async fn toggle_rejects_unsupported_names() {
        let fixture = connected_fixture().await;
        let err = fixture
            .service
            .toggle(SCOPE, "PARTITION", ToggleAction::Start)
            .await
            .unwrap_err();
        assert_eq!(err, crate::PollError::UnsupportedJob);
        assert_eq!(err.to_string(), "Unsupported event type");
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_stop_pauses_a_running_job() {
        let fixture = connected_fixture().await;
        fixture.service.start_polling(SCOPE).await;
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(client(&fixture).await.list_calls(), 1);

        fixture
            .service
            .toggle(SCOPE, "COLLECTION", ToggleAction::Stop)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(client(&fixture).await.list_calls(), 1);

        // Stop again: the job exists (stopped), still tolerated.
        fixture
            .service
            .toggle(SCOPE, "COLLECTION", ToggleAction::Stop)
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_race_resolves_to_self_stop() {
        let fixture = connected_fixture().await;
        fixture.service.start_polling(SCOPE).await;
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(client(&fixture).await.list_calls(), 1);

        fixture.manager.disconnect().await;
        tokio::time::sleep(Duration::from_secs(6)).await;

        // The next tick saw NotConnected and stopped the job.
        assert_eq!(
            fixture.registry.job_state(&collection_key()).await,
            Some(JobState::Stopped)
        );
        assert_eq!(client(&fixture).await.list_calls(), 1);
    }
}
