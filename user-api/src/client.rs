//! # Users API Client
//!
//! [`UsersApi`] is the facade over the generated `UserServiceClient` and the
//! standard gRPC health client. It holds both stubs as named fields and only
//! exposes the user operations, so the generated API never leaks through it.
//!
//! ## Lifecycle
//!
//! A `UsersApi` value only exists once a transport is available
//! ([`UsersApi::connect`], [`UsersApi::connect_lazy`] or
//! [`UsersApi::from_service`]). [`UsersApi::close`] drops both stubs; any call
//! made afterwards fails with [`RequestErrorKind::Closed`].
//!
//! ## Concurrency
//!
//! Every method takes `&self`, so the client is meant to be shared behind an
//! `Arc`. Business calls clone the stub out of a read lock and run
//! concurrently over the multiplexed channel. Health checks hold a mutex
//! around the health stub for the whole call, so concurrent checks are
//! serialized.
//!
//! ## Timeouts
//!
//! Each call is bounded by [`ClientConfig::timeout`]. The deadline is also
//! sent to the server as `grpc-timeout`. When it expires the in-flight
//! future is dropped, which cancels the request.
mod error;

pub use error::*;

use crate::{BoxError, ClientConfig, UpdateUserRequest, User};
use http_body::Body as HttpBody;
use std::{future::Future, time::Duration};
use tokio::sync::{Mutex, RwLock};
use tonic::{client::GrpcService, transport::Channel};
use tonic_health::pb::{
    HealthCheckRequest, health_check_response::ServingStatus, health_client::HealthClient,
};
use tracing::{debug, warn};
use user_proto::{UserServiceClient, pb};
use uuid::Uuid;

/// Client for the remote user management service.
#[derive(Debug)]
pub struct UsersApi<S = Channel> {
    timeout: Duration,
    health_service: String,
    users: RwLock<Option<UserServiceClient<S>>>,
    health: Mutex<Option<HealthClient<S>>>,
}

impl UsersApi<Channel> {
    /// Dials the configured address and returns a connected client.
    ///
    /// # Returns
    ///
    /// * `Ok(UsersApi)` - The connected client.
    /// * `Err(ConnectError)` - If the address is invalid or the dial fails.
    pub async fn connect(config: ClientConfig) -> Result<Self, ConnectError> {
        let channel = config
            .endpoint()?
            .connect()
            .await
            .map_err(|e| ConnectError::ConnectionFailed(config.address.clone(), e))?;

        debug!(address = %config.address, "connected to user service");

        Ok(Self::from_service(channel, config))
    }

    /// Builds a client without dialing. The connection is established on the
    /// first call, and dial failures surface as [`RequestError`]s.
    pub fn connect_lazy(config: ClientConfig) -> Result<Self, ConnectError> {
        let channel = config.endpoint()?.connect_lazy();

        debug!(address = %config.address, "created lazy user service client");

        Ok(Self::from_service(channel, config))
    }
}

impl<S> UsersApi<S>
where
    S: GrpcService<tonic::body::Body> + Clone,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    /// Creates a client from an existing Tonic service/channel.
    ///
    /// Only the timeout and health service name of `config` are used, the
    /// transport settings belong to whoever built `service`.
    pub fn from_service(service: S, config: ClientConfig) -> Self {
        Self {
            timeout: config.timeout,
            health_service: config.health_service,
            users: RwLock::new(Some(UserServiceClient::new(service.clone()))),
            health: Mutex::new(Some(HealthClient::new(service))),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Registers `user` with the remote service.
    pub async fn create_user(&self, user: &User) -> Result<(), RequestError> {
        let request = self.request(pb::User::from(user.clone()));

        self.call(Operation::CreateUser, |mut client| async move {
            client.create_user(request).await
        })
        .await?;

        Ok(())
    }

    /// Creates an account and returns its auth token.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &[u8],
        user_type: i64,
    ) -> Result<Vec<u8>, RequestError> {
        let request = self.request(pb::SignUpRequest {
            email: email.to_string(),
            password: password.to_vec(),
            user_type,
        });

        let response = self
            .call(Operation::SignUp, |mut client| async move {
                client.sign_up(request).await
            })
            .await?;

        Ok(response.token)
    }

    /// Exchanges credentials for an auth token.
    pub async fn sign_in(&self, email: &str, password: &[u8]) -> Result<Vec<u8>, RequestError> {
        let request = self.request(pb::SignInRequest {
            email: email.to_string(),
            password: password.to_vec(),
        });

        let response = self
            .call(Operation::SignIn, |mut client| async move {
                client.sign_in(request).await
            })
            .await?;

        Ok(response.token)
    }

    /// Resolves the user owning `token`.
    ///
    /// An invalid token surfaces as a [`RequestError`] with code
    /// [`tonic::Code::Unauthenticated`].
    pub async fn check_auth(&self, token: &[u8]) -> Result<User, RequestError> {
        let request = self.request(pb::TokenRequest {
            token: token.to_vec(),
        });

        let response = self
            .call(Operation::CheckAuth, |mut client| async move {
                client.check_auth(request).await
            })
            .await?;

        Ok(response.into())
    }

    pub async fn user_by_uuid(&self, user_uuid: Uuid) -> Result<User, RequestError> {
        self.user_by(pb::user_getter::Getter::UserUuid(
            user_uuid.as_bytes().to_vec(),
        ))
        .await
    }

    async fn user_by(&self, getter: pb::user_getter::Getter) -> Result<User, RequestError> {
        let request = self.request(pb::UserGetter {
            getter: Some(getter),
        });

        let response = self
            .call(Operation::UserBy, |mut client| async move {
                client.user_by(request).await
            })
            .await?;

        Ok(response.into())
    }

    /// Applies `update` and returns the user as stored afterwards.
    pub async fn update_user(&self, update: &UpdateUserRequest) -> Result<User, RequestError> {
        let request = self.request(pb::UpdateUserRequest::from(update.clone()));

        let response = self
            .call(Operation::UpdateUser, |mut client| async move {
                client.update_user(request).await
            })
            .await?;

        Ok(response.into())
    }

    /// Asks the standard gRPC health service whether the user service is serving.
    ///
    /// Concurrent checks are serialized.
    pub async fn health_check(&self) -> Result<(), HealthCheckError> {
        let operation = Operation::HealthCheck;

        let mut guard = self.health.lock().await;
        let client = guard
            .as_mut()
            .ok_or_else(|| RequestError::closed(operation))?;

        let request = self.request(HealthCheckRequest {
            service: self.health_service.clone(),
        });

        debug!(%operation, service = %self.health_service, "sending request");

        let response = tokio::time::timeout(self.timeout, client.check(request))
            .await
            .map_err(|_| self.timed_out(operation))?
            .map_err(|status| self.failed(operation, status))?
            .into_inner();

        match response.status() {
            ServingStatus::Serving => Ok(()),
            status => {
                warn!(
                    service = %self.health_service,
                    status = status.as_str_name(),
                    "user service is unhealthy"
                );
                Err(HealthCheckError::Unhealthy {
                    service: self.health_service.clone(),
                    status,
                })
            }
        }
    }

    /// Drops the stubs, releasing the connection once in-flight calls finish.
    ///
    /// Business calls are cut off immediately: new ones fail with
    /// [`RequestErrorKind::Closed`]. The health stub is only dropped after an
    /// in-flight health check releases it, so `close` can wait up to
    /// [`ClientConfig::timeout`] when one is running.
    ///
    /// Calling it again is a no-op.
    pub async fn close(&self) {
        let users = self.users.write().await.take();
        let health = self.health.lock().await.take();

        if users.is_some() || health.is_some() {
            debug!("user service client closed");
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.users.read().await.is_none()
    }

    fn request<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        request.set_timeout(self.timeout);
        request
    }

    /// Runs one unary call on a clone of the business stub, bounded by the
    /// configured timeout.
    async fn call<T, F, Fut>(&self, operation: Operation, send: F) -> Result<T, RequestError>
    where
        F: FnOnce(UserServiceClient<S>) -> Fut,
        Fut: Future<Output = Result<tonic::Response<T>, tonic::Status>>,
    {
        let client = self
            .users
            .read()
            .await
            .clone()
            .ok_or_else(|| RequestError::closed(operation))?;

        debug!(%operation, "sending request");

        tokio::time::timeout(self.timeout, send(client))
            .await
            .map_err(|_| self.timed_out(operation))?
            .map(tonic::Response::into_inner)
            .map_err(|status| self.failed(operation, status))
    }

    fn timed_out(&self, operation: Operation) -> RequestError {
        warn!(%operation, timeout = ?self.timeout, "request timed out");
        RequestError::new(operation, RequestErrorKind::Timeout(self.timeout))
    }

    fn failed(&self, operation: Operation, status: tonic::Status) -> RequestError {
        warn!(%operation, code = ?status.code(), message = status.message(), "request failed");
        RequestError::new(operation, RequestErrorKind::Status(status))
    }
}
