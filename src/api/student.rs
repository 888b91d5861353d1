use crate::{
    error::Result,
    model::{student::DataEnvelope, Student},
};

use super::ApiClient;

const STUDENTS_PATH: &str = "/details/allStudents";

/// Student operations on an [`ApiClient`].
#[derive(Debug, Clone, Copy)]
pub struct Students<'a> {
    client: &'a ApiClient,
}

impl<'a> Students<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /details/allStudents`: every student. Unlike the election
    /// endpoints, the backend wraps this list in `{"data": [...]}`.
    pub async fn list(&self) -> Result<Vec<Student>> {
        let envelope: DataEnvelope<Vec<Student>> =
            self.client.get("list students", STUDENTS_PATH).await?;
        Ok(envelope.data)
    }
}
