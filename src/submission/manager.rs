//! Open submission workflows, keyed by workflow id

use crate::submission::service::{EventService, IdentityProvider};
use crate::submission::workflow::{SubmissionWorkflow, WorkflowState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Default time an untouched draft stays open
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Registry of workflow instances sharing one creation service
pub struct WorkflowManager {
    service: Arc<dyn EventService>,
    confirmation_delay: Duration,
    idle_timeout: Duration,
    workflows: RwLock<HashMap<String, Arc<SubmissionWorkflow>>>,
}

impl WorkflowManager {
    pub fn new(service: Arc<dyn EventService>, confirmation_delay: Duration) -> Self {
        Self {
            service,
            confirmation_delay,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            workflows: RwLock::new(HashMap::new()),
        }
    }

    /// Close drafts left untouched for longer than `idle_timeout`
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Open a workflow on behalf of the actor behind `identity`
    pub async fn open(&self, identity: Arc<dyn IdentityProvider>) -> Arc<SubmissionWorkflow> {
        self.prune().await;

        let workflow = Arc::new(SubmissionWorkflow::new(
            self.service.clone(),
            identity,
            self.confirmation_delay,
        ));
        self.workflows
            .write()
            .await
            .insert(workflow.id().to_string(), workflow.clone());

        tracing::info!(workflow = %workflow.id(), "Opened submission workflow");
        workflow
    }

    pub async fn get(&self, id: &str) -> Option<Arc<SubmissionWorkflow>> {
        self.workflows.read().await.get(id).cloned()
    }

    /// Close and forget a workflow
    pub async fn remove(&self, id: &str) -> Option<Arc<SubmissionWorkflow>> {
        let workflow = self.workflows.write().await.remove(id)?;
        workflow.close().await;
        Some(workflow)
    }

    /// Number of tracked workflows
    pub async fn len(&self) -> usize {
        self.workflows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Forget closed workflows and close drafts abandoned while editing
    async fn prune(&self) {
        let snapshot: Vec<(String, Arc<SubmissionWorkflow>)> = self
            .workflows
            .read()
            .await
            .iter()
            .map(|(id, wf)| (id.clone(), wf.clone()))
            .collect();

        let mut stale = Vec::new();
        let mut idle = 0usize;
        for (id, workflow) in snapshot {
            match workflow.state().await {
                WorkflowState::Closed => stale.push(id),
                WorkflowState::Editing => {
                    if workflow.idle_for().await >= self.idle_timeout {
                        workflow.close().await;
                        idle += 1;
                        stale.push(id);
                    }
                }
                WorkflowState::Submitting | WorkflowState::Confirmed => {}
            }
        }

        if !stale.is_empty() {
            let mut workflows = self.workflows.write().await;
            for id in &stale {
                workflows.remove(id);
            }
            tracing::debug!(count = stale.len(), idle, "Pruned workflows");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::events::types::{Event, NewEvent};
    use crate::submission::draft::{DraftField, FieldUpdate};
    use crate::submission::service::{ActorProfile, StaticIdentity};

    struct UnusedService;

    #[async_trait::async_trait]
    impl EventService for UnusedService {
        async fn create_event(&self, _candidate: NewEvent) -> Result<Event> {
            Err(crate::Error::Service("not expected".to_string()))
        }
    }

    fn manager() -> WorkflowManager {
        WorkflowManager::new(Arc::new(UnusedService), Duration::from_secs(2))
    }

    fn identity() -> Arc<StaticIdentity> {
        Arc::new(StaticIdentity::new(ActorProfile::new("fac-1", "Dr. Rao")))
    }

    #[tokio::test]
    async fn test_open_and_get() {
        let manager = manager();
        let workflow = manager.open(identity()).await;
        assert!(workflow.id().starts_with("sub-"));

        let fetched = manager.get(workflow.id()).await.unwrap();
        assert!(Arc::ptr_eq(&workflow, &fetched));
        assert!(manager.get("sub-missing").await.is_none());
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_closes_workflow() {
        let manager = manager();
        let workflow = manager.open(identity()).await;

        let removed = manager.remove(workflow.id()).await.unwrap();
        assert_eq!(removed.state().await, WorkflowState::Closed);
        assert!(manager.is_empty().await);
        assert!(manager.remove(workflow.id()).await.is_none());
    }

    #[tokio::test]
    async fn test_open_prunes_closed_workflows() {
        let manager = manager();
        let cancelled = manager.open(identity()).await;
        let active = manager.open(identity()).await;
        cancelled.cancel().await.unwrap();

        manager.open(identity()).await;
        assert_eq!(manager.len().await, 2);
        assert!(manager.get(cancelled.id()).await.is_none());
        assert!(manager.get(active.id()).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_prunes_idle_drafts() {
        let manager = manager().with_idle_timeout(Duration::from_secs(600));
        let abandoned: Vec<_> = open_many(&manager, 100).await;
        let touched = manager.open(identity()).await;

        tokio::time::advance(Duration::from_secs(300)).await;
        touched
            .update_field(FieldUpdate::new(DraftField::Title, "Robotics Expo"))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(301)).await;
        let fresh = manager.open(identity()).await;

        assert_eq!(manager.len().await, 2);
        assert!(manager.get(touched.id()).await.is_some());
        assert!(manager.get(fresh.id()).await.is_some());
        for workflow in &abandoned {
            assert!(manager.get(workflow.id()).await.is_none());
            assert_eq!(workflow.state().await, WorkflowState::Closed);
        }
    }

    async fn open_many(manager: &WorkflowManager, count: usize) -> Vec<Arc<SubmissionWorkflow>> {
        let mut opened = Vec::with_capacity(count);
        for _ in 0..count {
            opened.push(manager.open(Arc::new(StaticIdentity::anonymous())).await);
        }
        opened
    }
}
