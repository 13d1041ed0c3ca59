use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::browser::SessionManager;
use crate::core::{Capabilities, Config, Endpoint, RemoteDriver};
use crate::errors::{GridError, Result};
use crate::runner::ScenarioRunner;
use crate::steps::{StepContext, StepRegistry};

/// Observable state of a [`MockDriver`], shared with the test through an
/// inspection handle.
#[derive(Debug, Default)]
pub struct MockState {
    pub title: String,
    pub field_names: Vec<String>,
    pub link_texts: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub clicked: Vec<String>,
    pub open_count: u32,
    pub quit_count: u32,
    pub refuse_connect: bool,
    pub last_session_name: Option<String>,
}

/// In-memory [`RemoteDriver`] for exercising the library without a hub.
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
    open: bool,
}

impl MockDriver {
    pub fn new(state: MockState) -> (Self, Arc<Mutex<MockState>>) {
        let state = Arc::new(Mutex::new(state));
        (
            Self {
                state: Arc::clone(&state),
                open: false,
            },
            state,
        )
    }
}

#[async_trait]
impl RemoteDriver for MockDriver {
    type Element = String;

    async fn open(&mut self, _endpoint: &Endpoint, capabilities: &Capabilities) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_connect {
            return Err(GridError::Provisioning(
                "mock endpoint refused the capability descriptor".to_string(),
            ));
        }
        state.open_count += 1;
        state.last_session_name = Some(capabilities.name.clone());
        self.open = true;
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        if !self.open {
            return Err(GridError::SessionNotProvisioned);
        }
        Ok(self.state.lock().unwrap().title.clone())
    }

    async fn find_by_name(&self, name: &str) -> Result<String> {
        if !self.open {
            return Err(GridError::SessionNotProvisioned);
        }
        let state = self.state.lock().unwrap();
        if state.field_names.iter().any(|n| n == name) {
            Ok(format!("name={name}"))
        } else {
            Err(GridError::ElementNotFound(format!("element named {name:?}")))
        }
    }

    async fn find_by_link_text(&self, text: &str) -> Result<String> {
        if !self.open {
            return Err(GridError::SessionNotProvisioned);
        }
        let state = self.state.lock().unwrap();
        if state.link_texts.iter().any(|t| t == text) {
            Ok(format!("link={text}"))
        } else {
            Err(GridError::ElementNotFound(format!("link with text {text:?}")))
        }
    }

    async fn send_keys(&self, element: &String, text: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .typed
            .push((element.clone(), text.to_string()));
        Ok(())
    }

    async fn click(&self, element: &String) -> Result<()> {
        self.state.lock().unwrap().clicked.push(element.clone());
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            self.state.lock().unwrap().quit_count += 1;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

pub struct TestHelper;

impl TestHelper {
    /// A driver for a page titled "Welcome" with an `email` and a `q` field
    /// and "Next" / "Search" links.
    pub fn mock_page() -> (MockDriver, Arc<Mutex<MockState>>) {
        MockDriver::new(MockState {
            title: "Welcome".to_string(),
            field_names: vec!["email".to_string(), "q".to_string()],
            link_texts: vec!["Next".to_string(), "Search".to_string()],
            ..Default::default()
        })
    }

    /// A driver whose endpoint refuses every session request.
    pub fn refusing_endpoint() -> (MockDriver, Arc<Mutex<MockState>>) {
        MockDriver::new(MockState {
            refuse_connect: true,
            ..Default::default()
        })
    }

    /// An already-provisioned step context over [`TestHelper::mock_page`].
    pub async fn active_context() -> (StepContext<MockDriver>, Arc<Mutex<MockState>>) {
        let (driver, state) = Self::mock_page();
        let session = Arc::new(SessionManager::new(driver));
        session
            .setup(&Endpoint::default(), &Capabilities::default())
            .await
            .expect("mock session should provision");
        (StepContext::new(session, "test scenario"), state)
    }

    /// A full runner over [`TestHelper::mock_page`] with the built-in steps.
    pub fn runner() -> (ScenarioRunner<MockDriver>, Arc<Mutex<MockState>>) {
        Self::runner_with(Capabilities::default())
    }

    pub fn runner_with(
        capabilities: Capabilities,
    ) -> (ScenarioRunner<MockDriver>, Arc<Mutex<MockState>>) {
        let (driver, state) = Self::mock_page();
        let session = Arc::new(SessionManager::new(driver));
        let registry = StepRegistry::builtin().expect("builtin patterns compile");
        let config = Config::new(Endpoint::default(), capabilities);
        (ScenarioRunner::new(config, registry, session), state)
    }

    pub fn refusing_runner() -> (ScenarioRunner<MockDriver>, Arc<Mutex<MockState>>) {
        let (driver, state) = Self::refusing_endpoint();
        let session = Arc::new(SessionManager::new(driver));
        let registry = StepRegistry::builtin().expect("builtin patterns compile");
        (
            ScenarioRunner::new(Config::default(), registry, session),
            state,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_driver_round_trip() {
        let (mut driver, state) = TestHelper::mock_page();
        driver
            .open(&Endpoint::default(), &Capabilities::default())
            .await
            .unwrap();
        assert!(driver.is_open());
        assert_eq!(driver.title().await.unwrap(), "Welcome");

        let element = driver.find_by_name("email").await.unwrap();
        driver.send_keys(&element, "a@b.com").await.unwrap();

        driver.quit().await.unwrap();
        driver.quit().await.unwrap();
        assert!(!driver.is_open());

        let state = state.lock().unwrap();
        assert_eq!(state.open_count, 1);
        assert_eq!(state.quit_count, 1);
        assert_eq!(state.typed.len(), 1);
    }

    #[tokio::test]
    async fn mock_driver_reports_missing_elements() {
        let (mut driver, _state) = TestHelper::mock_page();
        driver
            .open(&Endpoint::default(), &Capabilities::default())
            .await
            .unwrap();
        assert!(matches!(
            driver.find_by_name("nope").await,
            Err(GridError::ElementNotFound(_))
        ));
        assert!(matches!(
            driver.find_by_link_text("nope").await,
            Err(GridError::ElementNotFound(_))
        ));
    }
}
