use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    features::wizard::{
        controller::{PropertyWizard, SubmissionState, SubmissionStatus, WizardContext},
        validation::FieldErrors,
    },
    utilities::errors::AppError,
};

pub struct WizardSession {
    pub owner_id: Uuid,
    pub wizard: PropertyWizard,
    pub last_touched: Instant,
}

pub type SharedWizard = Arc<Mutex<WizardSession>>;

/// In-memory wizards keyed by session id. Each wizard has its own lock, so
/// owners never wait on each other.
#[derive(Clone, Default)]
pub struct WizardSessions {
    inner: Arc<RwLock<HashMap<Uuid, SharedWizard>>>,
}

impl WizardSessions {
    pub async fn create(&self, owner_id: Uuid) -> (Uuid, SharedWizard) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(WizardSession {
            owner_id,
            wizard: PropertyWizard::default(),
            last_touched: Instant::now(),
        }));
        self.inner.write().await.insert(id, session.clone());
        debug!("wizard {} opened by {}", id, owner_id);
        (id, session)
    }

    /// Returns the wizard when it exists and belongs to `owner_id`, and marks
    /// it as active.
    pub async fn get(&self, id: Uuid, owner_id: Uuid) -> Result<SharedWizard, AppError> {
        let session = self
            .inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::WizardNotFoundError(id))?;

        {
            let mut guard = session.lock().await;
            if guard.owner_id != owner_id {
                warn!("user {} tried to open wizard {} of another owner", owner_id, id);
                return Err(AppError::WizardNotFoundError(id));
            }
            guard.last_touched = Instant::now();
        }
        Ok(session)
    }

    pub async fn discard(&self, id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        self.get(id, owner_id).await?;
        self.inner.write().await.remove(&id);
        debug!("wizard {} discarded", id);
        Ok(())
    }

    /// Submits the wizard. A wizard that produced a listing is closed; a
    /// failed one stays open so the owner can correct it and retry.
    pub async fn submit(
        &self,
        id: Uuid,
        owner_id: Uuid,
        ctx: &WizardContext,
    ) -> Result<(SubmissionState, FieldErrors), AppError> {
        let shared = self.get(id, owner_id).await?;

        let (submission, errors) = {
            let mut guard = shared.lock().await;
            let submission = guard.wizard.submit(ctx).await.clone();
            (submission, guard.wizard.errors().clone())
        };

        if submission.status == SubmissionStatus::Success {
            self.inner.write().await.remove(&id);
            debug!("wizard {} closed after submission", id);
        }
        Ok((submission, errors))
    }

    /// Drops wizards idle for at least `max_idle`. Wizards locked by an
    /// in-flight request are in use and are skipped.
    pub async fn sweep(&self, max_idle: Duration) -> usize {
        let mut wizards = self.inner.write().await;
        let before = wizards.len();
        wizards.retain(|_, session| match session.try_lock() {
            Ok(guard) => guard.last_touched.elapsed() < max_idle,
            Err(_) => true,
        });
        before - wizards.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub fn spawn_sweeper(&self, max_idle: Duration) -> JoinHandle<()> {
        let sessions = self.clone();
        let period = (max_idle / 4).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let evicted = sessions.sweep(max_idle).await;
                if evicted > 0 {
                    info!(
                        "evicted {} idle wizards, {} still open",
                        evicted,
                        sessions.len().await
                    );
                }
            }
        })
    }
}
