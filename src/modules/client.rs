use std::time::Duration;

use reqwest::blocking::Client;

use crate::modules::view::StateSnapshot;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Blocking client for a running simulation server.
#[derive(Debug, Clone)]
pub struct SimClient {
    base_url: String,
    http: Client,
}

impl SimClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn state(&self) -> Result<StateSnapshot, reqwest::Error> {
        self.http
            .get(self.url("/state"))
            .send()?
            .error_for_status()?
            .json()
    }

    pub fn step(&self) -> Result<StateSnapshot, reqwest::Error> {
        self.http
            .get(self.url("/step"))
            .send()?
            .error_for_status()?
            .json()
    }

    pub fn restart(&self) -> Result<StateSnapshot, reqwest::Error> {
        self.http
            .post(self.url("/restart"))
            .send()?
            .error_for_status()?
            .json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::config::SimConfig;
    use crate::modules::server::SimServer;
    use crate::modules::session::Session;

    #[test]
    fn talks_to_a_live_server() {
        let session = Session::new(SimConfig::default().with_seed(8))
            .unwrap()
            .into_shared();
        let server = SimServer::bind("127.0.0.1:0", session)
            .unwrap()
            .spawn()
            .unwrap();
        let client =
            SimClient::new(format!("http://{}/", server.addr()), Duration::from_secs(5)).unwrap();
        assert!(!client.base_url().ends_with('/'));

        let initial = client.state().unwrap();
        assert_eq!(initial.steps, 0);

        let stepped = client.step().unwrap();
        assert_eq!(stepped.steps, 1);
        assert!(stepped.agent_position().is_adjacent(initial.agent_position()));

        let fresh = client.restart().unwrap();
        assert_eq!(fresh.steps, 0);
        assert_eq!(fresh.mutations_left, 8);

        server.stop().unwrap();
    }
}
