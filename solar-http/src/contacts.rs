use async_trait::async_trait;
use serde::Deserialize;
use solar_core::{
    AdminSession, ContactService, ContactSubmission, NewContactSubmission, ServiceError,
};
use tracing::debug;

use crate::backend::{Backend, map_status_error, map_transport_error, with_session};

const LIST_PATH: &str = "contact/get-contacts";
const SUBMIT_PATH: &str = "contact/submit";

/// [`ContactService`] over the backend's `/contact` routes.
pub struct HttpContactService {
    backend: Backend,
}

impl HttpContactService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

/// The list endpoint has answered with both shapes over time.
#[derive(Deserialize)]
#[serde(untagged)]
enum ContactListDto {
    Bare(Vec<ContactSubmission>),
    Wrapped { data: Vec<ContactSubmission> },
}

fn parse_submissions(body: &[u8]) -> Result<Vec<ContactSubmission>, ServiceError> {
    let decoded: ContactListDto = serde_json::from_slice(body)
        .map_err(|e| ServiceError::Decode(format!("invalid contact list: {e}")))?;
    Ok(match decoded {
        ContactListDto::Bare(items) | ContactListDto::Wrapped { data: items } => items,
    })
}

#[async_trait]
impl ContactService for HttpContactService {
    async fn list_submissions(
        &self,
        session: &AdminSession,
    ) -> Result<Vec<ContactSubmission>, ServiceError> {
        let response = with_session(self.backend.get(LIST_PATH), session)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }

        let submissions = parse_submissions(&body)?;
        debug!(count = submissions.len(), "fetched contact submissions");
        Ok(submissions)
    }

    async fn submit(&self, submission: &NewContactSubmission) -> Result<(), ServiceError> {
        let response = self
            .backend
            .post(SUBMIT_PATH)
            .json(submission)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.map_err(map_transport_error)?;
            return Err(map_status_error(status, &body));
        }
        Ok(())
    }
}
