use serde_json::Value;

use crate::{error::Result, model::Election};

use super::ApiClient;

const ELECTIONS_PATH: &str = "/election/elections";
const CREATE_ELECTION_PATH: &str = "/election/";

/// Election operations on an [`ApiClient`].
#[derive(Debug, Clone, Copy)]
pub struct Elections<'a> {
    client: &'a ApiClient,
}

impl<'a> Elections<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /election/elections`: every election, exactly as the backend
    /// lists them.
    pub async fn list(&self) -> Result<Vec<Election>> {
        self.client.get("list elections", ELECTIONS_PATH).await
    }

    /// `POST /election/`: create an election, returning the backend's
    /// confirmation body untouched.
    ///
    /// Not idempotent; calling twice creates two elections.
    pub async fn create(&self, election: &Election) -> Result<Value> {
        self.client
            .post("create election", CREATE_ELECTION_PATH, election)
            .await
    }
}
