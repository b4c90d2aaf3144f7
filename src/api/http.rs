use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;

pub fn build_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(4))
        .timeout(Duration::from_secs(20))
        .build()
}

pub(super) fn get_json<T: DeserializeOwned>(agent: &ureq::Agent, url: &str) -> Result<T> {
    let response = agent.get(url).call().map_err(|error| match error {
        ureq::Error::Status(code, _) => anyhow!("{url} returned HTTP {code}"),
        ureq::Error::Transport(transport) => anyhow!("request to {url} failed: {transport}"),
    })?;

    response
        .into_json::<T>()
        .with_context(|| format!("invalid JSON from {url}"))
}
