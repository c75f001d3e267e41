use crate::{
    dom::{Element, Notifier},
    logging::{LogLevel, Logger},
    outcome::{BestEffort, Ignored},
};
use futures_util::future::LocalBoxFuture;
use serde::Deserialize;
use serde_json::json;
use std::rc::Rc;
use thiserror::Error;
use url::Url;

pub const SUCCESS_MESSAGE: &str = "Thank you for your message! I will get back to you soon.";
pub const FAILURE_MESSAGE: &str = "Oops! There was an issue submitting your form. Please try again.";
pub const NETWORK_MESSAGE: &str = "A network error occurred. Please check your connection.";
const STATUS_CLASS: &str = "form-status";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("network request failed: {0}")]
    Network(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("form has no action")]
    MissingAction,
    #[error("form action {0:?} is not a valid URL")]
    InvalidAction(String),
    #[error("form action scheme {0:?} is not http or https")]
    UnsupportedScheme(String),
}

/// The form element being submitted.
pub trait FormHandle {
    fn action(&self) -> Option<String>;
    fn fields(&self) -> Vec<(String, String)>;
    fn reset(&self);
}

/// Sends the field set as a POST asking for a JSON reply.
pub trait FormTransport {
    fn post(
        &self,
        url: Url,
        fields: Vec<(String, String)>,
    ) -> LocalBoxFuture<'_, Result<TransportResponse, TransportError>>;
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Option<Vec<FieldError>>,
}

#[derive(Deserialize)]
struct FieldError {
    #[serde(default)]
    message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted,
    Rejected { status: u16, message: String },
    Misconfigured(FormError),
    NetworkFailure(TransportError),
}

impl SubmissionOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Accepted => SUCCESS_MESSAGE,
            Self::Rejected { message, .. } => message,
            Self::Misconfigured(_) => FAILURE_MESSAGE,
            Self::NetworkFailure(_) => NETWORK_MESSAGE,
        }
    }

    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Accepted => StatusKind::Success,
            _ => StatusKind::Error,
        }
    }
}

/// Resolves the form's `action` against the page URL.
pub fn resolve_action(raw: Option<&str>, base: Option<&Url>) -> Result<Url, FormError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(FormError::MissingAction)?;

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .and_then(|base| base.join(raw).ok())
            .ok_or_else(|| FormError::InvalidAction(raw.to_string()))?,
        Err(_) => return Err(FormError::InvalidAction(raw.to_string())),
    };

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(FormError::UnsupportedScheme(scheme.to_string())),
    }
}

/// Joins the `errors[].message` list of a rejection body.
///
/// `Applied(None)` means the body was JSON without usable errors.
pub fn rejection_detail(body: &str) -> BestEffort<Option<String>> {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => BestEffort::Applied(
            parsed
                .errors
                .filter(|errors| !errors.is_empty())
                .map(|errors| {
                    errors
                        .iter()
                        .map(|error| error.message.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                }),
        ),
        Err(error) => BestEffort::Ignored(Ignored::MalformedJson(error.to_string())),
    }
}

fn host_for_logging(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => "unknown".to_string(),
    }
}

pub struct ContactForm<F: FormHandle, T: FormTransport, E: Element> {
    form: F,
    transport: T,
    status: Option<E>,
    notifier: Rc<dyn Notifier>,
    base_url: Option<Url>,
    logger: Logger,
}

impl<F: FormHandle, T: FormTransport, E: Element> ContactForm<F, T, E> {
    pub fn new(
        form: F,
        transport: T,
        status: Option<E>,
        notifier: Rc<dyn Notifier>,
        base_url: Option<Url>,
        logger: Logger,
    ) -> Self {
        Self {
            form,
            transport,
            status,
            notifier,
            base_url,
            logger,
        }
    }

    /// Posts the form and shows the result. Default navigation must already
    /// be suppressed by the caller.
    pub async fn submit(&self) -> SubmissionOutcome {
        let outcome = self.send().await;
        self.present(&outcome);
        outcome
    }

    async fn send(&self) -> SubmissionOutcome {
        let url = match resolve_action(self.form.action().as_deref(), self.base_url.as_ref()) {
            Ok(url) => url,
            Err(error) => {
                self.logger.event(
                    LogLevel::Error,
                    "form.failed",
                    json!({ "reason": "action", "error": error.to_string() }),
                );
                return SubmissionOutcome::Misconfigured(error);
            }
        };

        let fields = self.form.fields();
        self.logger.event(
            LogLevel::Info,
            "form.submitted",
            json!({ "host": host_for_logging(&url), "fields": fields.len() }),
        );

        let response = match self.transport.post(url, fields).await {
            Ok(response) => response,
            Err(error) => {
                self.logger.event(
                    LogLevel::Error,
                    "form.failed",
                    json!({ "reason": "network", "error": error.to_string() }),
                );
                return SubmissionOutcome::NetworkFailure(error);
            }
        };

        let detail = rejection_detail(&response.body);
        if let Some(reason) = detail.ignored() {
            self.logger.event(
                LogLevel::Debug,
                "form.response_json_ignored",
                json!({ "status": response.status, "reason": reason.to_string() }),
            );
        }
        self.logger.event(
            LogLevel::Info,
            "form.response",
            json!({ "status": response.status, "ok": response.is_success() }),
        );

        if response.is_success() {
            self.form.reset();
            return SubmissionOutcome::Accepted;
        }

        let message = detail
            .applied()
            .flatten()
            .unwrap_or_else(|| FAILURE_MESSAGE.to_string());
        SubmissionOutcome::Rejected {
            status: response.status,
            message,
        }
    }

    fn present(&self, outcome: &SubmissionOutcome) {
        let message = outcome.message();
        if let Some(status) = &self.status {
            status.set_text(message);
            status.set_class_name(&format!("{STATUS_CLASS} {}", outcome.kind().as_str()));
        }
        self.notifier.alert(message);
    }
}
