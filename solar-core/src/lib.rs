//! Core logic for the solar savings site: the savings estimator, reference
//! models, the admin session gate and route guard, and the ports that
//! transport crates implement.

pub mod calculations;
pub mod contact_form;
pub mod dashboard;
pub mod models;
pub mod services;
pub mod session;

pub use calculations::{
    EstimateError, EstimateSummary, EstimatorConfig, EstimatorConfigError, SavingsEstimator,
    SubsidyPolicy,
};
pub use contact_form::{ContactForm, ContactFormError, ContactSubmitter, SubmitError};
pub use dashboard::{DashboardView, SubmissionStats};
pub use models::*;
pub use services::{AuthService, ContactService, ServiceError};
pub use session::{
    GateError, GuardDecision, Guarded, LogoutOutcome, RouteGuard, SessionGate, SessionState,
    SessionStore, StoreError, Verification,
};
