use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::{Capabilities, Endpoint, RemoteDriver};
use crate::errors::{GridError, Result};

/// Lifecycle phase of the one remote session a run owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active,
    Terminated,
}

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub browser_name: String,
}

struct Inner<D> {
    driver: D,
    phase: SessionPhase,
    info: Option<SessionInfo>,
}

/// Owns the single remote browser session of a run.
///
/// Only this type creates or destroys the session; steps reach the live
/// session through the interaction methods, which refuse to run outside the
/// `Active` phase. `Terminated` is absorbing: once torn down, the session is
/// never reprovisioned.
pub struct SessionManager<D: RemoteDriver> {
    inner: Mutex<Inner<D>>,
}

impl<D: RemoteDriver> SessionManager<D> {
    pub fn new(driver: D) -> Self {
        Self {
            inner: Mutex::new(Inner {
                driver,
                phase: SessionPhase::Idle,
                info: None,
            }),
        }
    }

    /// Provision the remote session. Callable once per run; a rejected or
    /// unreachable endpoint is fatal and is not retried.
    pub async fn setup(
        &self,
        endpoint: &Endpoint,
        capabilities: &Capabilities,
    ) -> Result<SessionInfo> {
        let mut inner = self.inner.lock().await;
        match inner.phase {
            SessionPhase::Active => return Err(GridError::SessionAlreadyActive),
            SessionPhase::Terminated => return Err(GridError::SessionTerminated),
            SessionPhase::Idle => {}
        }

        inner.driver.open(endpoint, capabilities).await?;
        inner.phase = SessionPhase::Active;

        let info = SessionInfo {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            browser_name: capabilities.browser_name.clone(),
        };
        inner.info = Some(info.clone());
        info!(session = %info.session_id, browser = %info.browser_name, "remote session active");
        Ok(info)
    }

    /// Terminate the session. Idempotent; never surfaces an error to the
    /// caller. A failed quit is logged and the session still counts as
    /// terminated.
    pub async fn teardown(&self) {
        let mut inner = self.inner.lock().await;
        if inner.phase != SessionPhase::Active {
            return;
        }
        inner.phase = SessionPhase::Terminated;
        match inner.driver.quit().await {
            Ok(()) => info!("remote session terminated"),
            Err(err) => warn!(error = %err, "teardown error ignored"),
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        self.inner.lock().await.phase
    }

    pub async fn info(&self) -> Option<SessionInfo> {
        self.inner.lock().await.info.clone()
    }

    pub async fn title(&self) -> Result<String> {
        let inner = self.inner.lock().await;
        check(inner.phase)?;
        inner.driver.title().await
    }

    /// Locate the element with the given `name` attribute and type into it.
    pub async fn fill_by_name(&self, name: &str, value: &str) -> Result<()> {
        let inner = self.inner.lock().await;
        check(inner.phase)?;
        let element = inner.driver.find_by_name(name).await?;
        inner.driver.send_keys(&element, value).await
    }

    /// Locate the link with the given visible text and click it.
    pub async fn click_link(&self, text: &str) -> Result<()> {
        let inner = self.inner.lock().await;
        check(inner.phase)?;
        let element = inner.driver.find_by_link_text(text).await?;
        inner.driver.click(&element).await
    }
}

fn check(phase: SessionPhase) -> Result<()> {
    match phase {
        SessionPhase::Active => Ok(()),
        SessionPhase::Idle => Err(GridError::SessionNotProvisioned),
        SessionPhase::Terminated => Err(GridError::SessionTerminated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHelper;

    #[tokio::test]
    async fn setup_moves_idle_to_active() {
        let (driver, _state) = TestHelper::mock_page();
        let manager = SessionManager::new(driver);
        assert_eq!(manager.phase().await, SessionPhase::Idle);

        let info = manager
            .setup(&Endpoint::default(), &Capabilities::default())
            .await
            .unwrap();
        assert_eq!(info.browser_name, "Firefox");
        assert_eq!(manager.phase().await, SessionPhase::Active);
    }

    #[tokio::test]
    async fn setup_twice_is_refused() {
        let (driver, state) = TestHelper::mock_page();
        let manager = SessionManager::new(driver);
        manager
            .setup(&Endpoint::default(), &Capabilities::default())
            .await
            .unwrap();

        let second = manager
            .setup(&Endpoint::default(), &Capabilities::default())
            .await;
        assert!(matches!(second, Err(GridError::SessionAlreadyActive)));
        assert_eq!(state.lock().unwrap().open_count, 1);
    }

    #[tokio::test]
    async fn refused_endpoint_is_a_provisioning_error() {
        let (driver, _state) = TestHelper::refusing_endpoint();
        let manager = SessionManager::new(driver);
        let result = manager
            .setup(&Endpoint::default(), &Capabilities::default())
            .await;
        assert!(matches!(result, Err(GridError::Provisioning(_))));
        assert_eq!(manager.phase().await, SessionPhase::Idle);
    }

    #[tokio::test]
    async fn teardown_is_idempotent() {
        let (driver, state) = TestHelper::mock_page();
        let manager = SessionManager::new(driver);
        manager
            .setup(&Endpoint::default(), &Capabilities::default())
            .await
            .unwrap();

        manager.teardown().await;
        manager.teardown().await;
        manager.teardown().await;

        assert_eq!(manager.phase().await, SessionPhase::Terminated);
        assert_eq!(state.lock().unwrap().quit_count, 1);
    }

    #[tokio::test]
    async fn interactions_require_an_active_session() {
        let (driver, _state) = TestHelper::mock_page();
        let manager = SessionManager::new(driver);

        assert!(matches!(
            manager.title().await,
            Err(GridError::SessionNotProvisioned)
        ));

        manager
            .setup(&Endpoint::default(), &Capabilities::default())
            .await
            .unwrap();
        manager.teardown().await;

        assert!(matches!(
            manager.title().await,
            Err(GridError::SessionTerminated)
        ));
        assert!(matches!(
            manager.fill_by_name("email", "a@b.com").await,
            Err(GridError::SessionTerminated)
        ));
        assert!(matches!(
            manager.click_link("Next").await,
            Err(GridError::SessionTerminated)
        ));
    }

    #[tokio::test]
    async fn terminated_session_cannot_be_reprovisioned() {
        let (driver, _state) = TestHelper::mock_page();
        let manager = SessionManager::new(driver);
        manager
            .setup(&Endpoint::default(), &Capabilities::default())
            .await
            .unwrap();
        manager.teardown().await;

        let again = manager
            .setup(&Endpoint::default(), &Capabilities::default())
            .await;
        assert!(matches!(again, Err(GridError::SessionTerminated)));
    }

    #[tokio::test]
    async fn fill_and_click_reach_the_driver() {
        let (driver, state) = TestHelper::mock_page();
        let manager = SessionManager::new(driver);
        manager
            .setup(&Endpoint::default(), &Capabilities::default())
            .await
            .unwrap();

        manager.fill_by_name("email", "a@b.com").await.unwrap();
        manager.click_link("Next").await.unwrap();

        let state = state.lock().unwrap();
        assert_eq!(state.typed, vec![("name=email".to_string(), "a@b.com".to_string())]);
        assert_eq!(state.clicked, vec!["link=Next".to_string()]);
    }
}
