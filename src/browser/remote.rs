use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use tracing::debug;

use crate::core::{Capabilities, Endpoint, RemoteDriver};
use crate::errors::{GridError, Result};

/// WebDriver hub implementation of [`RemoteDriver`], backed by fantoccini.
pub struct RemoteBrowser {
    client: Option<Client>,
}

impl RemoteBrowser {
    pub fn new() -> Self {
        Self { client: None }
    }

    fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or(GridError::SessionNotProvisioned)
    }
}

impl Default for RemoteBrowser {
    fn default() -> Self {
        Self::new()
    }
}

fn cmd_err(context: &str, err: CmdError) -> GridError {
    if err.is_no_such_element() {
        GridError::ElementNotFound(context.to_string())
    } else {
        GridError::Protocol(format!("{context}: {err}"))
    }
}

/// Quote a value for use inside a CSS attribute selector.
fn css_quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[async_trait]
impl RemoteDriver for RemoteBrowser {
    type Element = Element;

    async fn open(&mut self, endpoint: &Endpoint, capabilities: &Capabilities) -> Result<()> {
        if self.client.is_some() {
            return Err(GridError::SessionAlreadyActive);
        }

        let url = endpoint.url()?;
        debug!(host = %endpoint.host, browser = %capabilities.browser_name, "opening remote session");

        let client = ClientBuilder::native()
            .capabilities(capabilities.to_map())
            .connect(url.as_str())
            .await
            .map_err(|e| GridError::Provisioning(e.to_string()))?;

        self.client = Some(client);
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        self.client()?
            .title()
            .await
            .map_err(|e| cmd_err("read page title", e))
    }

    async fn find_by_name(&self, name: &str) -> Result<Element> {
        let selector = format!("[name={}]", css_quote(name));
        self.client()?
            .find(Locator::Css(&selector))
            .await
            .map_err(|e| cmd_err(&format!("element named {name:?}"), e))
    }

    async fn find_by_link_text(&self, text: &str) -> Result<Element> {
        self.client()?
            .find(Locator::LinkText(text))
            .await
            .map_err(|e| cmd_err(&format!("link with text {text:?}"), e))
    }

    async fn send_keys(&self, element: &Element, text: &str) -> Result<()> {
        element
            .send_keys(text)
            .await
            .map_err(|e| cmd_err("send keys", e))
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await.map_err(|e| cmd_err("click", e))
    }

    async fn quit(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            debug!("terminating remote session");
            client
                .close()
                .await
                .map_err(|e| GridError::Protocol(format!("quit: {e}")))?;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.client.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_quoting_escapes_metacharacters() {
        assert_eq!(css_quote("email"), "'email'");
        assert_eq!(css_quote("a'b"), "'a\\'b'");
        assert_eq!(css_quote("a\\b"), "'a\\\\b'");
    }
}
