use crate::errors::Result;
use async_trait::async_trait;

use super::{Capabilities, Endpoint};

/// Narrow interface over the remote browser protocol client.
///
/// One implementor drives a real WebDriver hub; the mock in `testing`
/// satisfies it in memory. All calls block the caller until the remote
/// protocol call returns; timeout behavior belongs to the client.
#[async_trait]
pub trait RemoteDriver: Send + Sync {
    type Element: Send + Sync;

    /// Open a remote session on the endpoint with the given descriptor.
    async fn open(&mut self, endpoint: &Endpoint, capabilities: &Capabilities) -> Result<()>;

    /// Current page title.
    async fn title(&self) -> Result<String>;

    /// Locate one element by its `name` attribute.
    async fn find_by_name(&self, name: &str) -> Result<Self::Element>;

    /// Locate one element by its visible link text.
    async fn find_by_link_text(&self, text: &str) -> Result<Self::Element>;

    /// Inject text into an element as keystrokes.
    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<()>;

    /// Dispatch a click to an element.
    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Terminate the remote session. Must be safe to call twice.
    async fn quit(&mut self) -> Result<()>;

    /// Whether a session is currently open.
    fn is_open(&self) -> bool;
}
