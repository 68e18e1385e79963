//! Public contact form: field validation and the single-flight submitter.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::NewContactSubmission;
use crate::services::{ContactService, ServiceError};

pub const SUBMIT_SUCCESS_MESSAGE: &str =
    "Message sent successfully! Our solar expert will contact you within 24 hours.";
pub const SUBMIT_FAILURE_MESSAGE: &str =
    "Failed to send message. Please try again or call us directly.";

const EMAIL_REGEX: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

// Constant pattern; `email_pattern_compiles` covers it.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_REGEX).expect("EMAIL_REGEX is a valid pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Message,
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Message => "message",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: ContactField,
    pub problem: FieldProblem,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            FieldProblem::Missing => write!(f, "{} is required", self.field),
            FieldProblem::Malformed => write!(f, "{} is not valid", self.field),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid contact form: {}", join_issues(.issues))]
pub struct ContactFormError {
    pub issues: Vec<FieldIssue>,
}

impl ContactFormError {
    pub fn has_issue(&self, field: ContactField) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw form input, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: Option<String>,
    pub message: String,
}

impl ContactForm {
    /// Trims every field and checks the required ones.
    ///
    /// All problems are reported at once, in form order. A blank subject is
    /// dropped rather than sent as an empty string.
    pub fn validate(&self) -> Result<NewContactSubmission, ContactFormError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();
        let message = self.message.trim();

        let mut issues = Vec::new();
        for (field, value) in [
            (ContactField::Name, name),
            (ContactField::Email, email),
            (ContactField::Phone, phone),
            (ContactField::Message, message),
        ] {
            let problem = if value.is_empty() {
                Some(FieldProblem::Missing)
            } else if field == ContactField::Email && !is_plausible_email(value) {
                Some(FieldProblem::Malformed)
            } else {
                None
            };
            if let Some(problem) = problem {
                issues.push(FieldIssue { field, problem });
            }
        }

        if !issues.is_empty() {
            return Err(ContactFormError { issues });
        }

        Ok(NewContactSubmission {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            subject: self
                .subject
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            message: message.to_string(),
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ContactFormError),

    #[error("A message is already being sent")]
    InFlight,

    #[error("Submission failed: {0}")]
    Failed(#[from] ServiceError),
}

impl SubmitError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(error) => error.to_string(),
            Self::InFlight => "Please wait, your message is being sent.".to_string(),
            Self::Failed(_) => SUBMIT_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Sends contact-form messages, at most one at a time.
pub struct ContactSubmitter {
    service: Arc<dyn ContactService>,
    in_flight: AtomicBool,
}

struct ClearOnDrop<'a>(&'a AtomicBool);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ContactSubmitter {
    pub fn new(service: Arc<dyn ContactService>) -> Self {
        Self {
            service,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validates `form` and sends it.
    ///
    /// # Errors
    /// * [`SubmitError::Invalid`]: nothing is sent.
    /// * [`SubmitError::InFlight`]: a previous submit has not finished.
    /// * [`SubmitError::Failed`]: the backend call failed.
    pub async fn submit(&self, form: &ContactForm) -> Result<(), SubmitError> {
        let submission = form.validate()?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitError::InFlight);
        }
        let _guard = ClearOnDrop(&self.in_flight);

        match self.service.submit(&submission).await {
            Ok(()) => {
                info!(email = %submission.email, "contact message sent");
                Ok(())
            }
            Err(error) => {
                warn!(%error, "contact message failed");
                Err(error.into())
            }
        }
    }
}
