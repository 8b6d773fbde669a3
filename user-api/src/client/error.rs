use std::fmt;
use std::time::Duration;
use tonic::Code;
use tonic_health::pb::health_check_response::ServingStatus;

/// Errors that can occur when setting up the connection to the user service.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("No address provided")]
    EmptyAddress,
    #[error("Invalid address '{0}': {1}")]
    InvalidAddress(String, #[source] tonic::transport::Error),
    #[error("Failed to connect to '{0}': {1}")]
    ConnectionFailed(String, #[source] tonic::transport::Error),
}

/// The remote procedures exposed through [`super::UsersApi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateUser,
    SignUp,
    SignIn,
    CheckAuth,
    UserBy,
    UpdateUser,
    HealthCheck,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateUser => "createUser",
            Operation::SignUp => "signUp",
            Operation::SignIn => "signIn",
            Operation::CheckAuth => "checkAuth",
            Operation::UserBy => "userBy",
            Operation::UpdateUser => "updateUser",
            Operation::HealthCheck => "healthCheck",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote call that did not produce a response.
#[derive(Debug, thiserror::Error)]
#[error("{operation} api request: {kind}")]
pub struct RequestError {
    pub operation: Operation,
    #[source]
    pub kind: RequestErrorKind,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestErrorKind {
    /// The call reached the transport, and either the server or the
    /// transport reported a non-OK status.
    #[error("{0}")]
    Status(tonic::Status),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("the client has been closed")]
    Closed,
}

impl RequestError {
    pub(crate) fn new(operation: Operation, kind: RequestErrorKind) -> Self {
        Self { operation, kind }
    }

    pub(crate) fn closed(operation: Operation) -> Self {
        Self::new(operation, RequestErrorKind::Closed)
    }

    /// The status returned by the remote call, if it got that far.
    pub fn status(&self) -> Option<&tonic::Status> {
        match &self.kind {
            RequestErrorKind::Status(status) => Some(status),
            _ => None,
        }
    }

    /// Shorthand for the code of [`RequestError::status`].
    pub fn code(&self) -> Option<Code> {
        self.status().map(tonic::Status::code)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, RequestErrorKind::Timeout(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.kind, RequestErrorKind::Closed)
    }
}

/// Errors returned by [`super::UsersApi::health_check`].
///
/// `Request` means the service could not be asked, `Unhealthy` means it
/// answered and is not serving.
#[derive(Debug, thiserror::Error)]
pub enum HealthCheckError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("service '{service}' is unhealthy: {}", .status.as_str_name())]
    Unhealthy {
        service: String,
        status: ServingStatus,
    },
}
