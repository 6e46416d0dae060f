use std::sync::Arc;

use jiff::Timestamp;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{
    AuthenticatedClient,
    client::expiry::{ResponseClass, classify},
    config::Config,
    errors::Error,
    request_context::RequestDispatchContext,
    retry::{Attempt, RequestOutcome},
    session::{LeaderGuard, RefreshGeneration, RefreshResult, RefreshTicket, SessionInvalidated},
    telemetry::refresh::RefreshTelemetry,
    types::{ApiRequest, ApiResponse},
};

const REFRESH_CONTEXT: &str = "session.refresh";

/// Result of a single send before the refresh protocol is applied.
enum Dispatch {
    Done(ApiResponse),
    Expired(String),
}

impl AuthenticatedClient {
    /// Create a new AuthenticatedClient
    /// # Arguments
    /// * `config` - Explicit configuration (`Config`), typically loaded via `Config::from_file`,
    ///   `Config::from_env`, or `read_config`.
    pub fn new(config: Config) -> Result<Self, Error> {
        let context = RequestDispatchContext::build(&config)?;
        Ok(Self { context })
    }

    pub fn context(&self) -> &RequestDispatchContext {
        &self.context
    }

    /// Sends a request, transparently refreshing the session once if it has expired.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, Error> {
        request.validate()?;
        let mut outcome = RequestOutcome::start(&request.method, &request.path);
        let result = self.send_with_recovery(&request, &mut outcome).await;
        outcome.finish(result.is_ok());
        outcome.log();
        result
    }

    async fn send_with_recovery(
        &self,
        request: &ApiRequest,
        outcome: &mut RequestOutcome,
    ) -> Result<ApiResponse, Error> {
        let generation = self.context.coordinator().generation();
        outcome.record(Attempt::Original);
        let body = match self.dispatch(request, Attempt::Original).await? {
            Dispatch::Done(response) => return Ok(response),
            Dispatch::Expired(body) => body,
        };
        debug!(path = %request.path, body = %body, "session expired; entering refresh");

        self.await_refresh(generation, &request.path).await?;

        outcome.record(Attempt::Replay);
        match self.dispatch(request, Attempt::Replay).await? {
            Dispatch::Done(response) => Ok(response),
            Dispatch::Expired(body) => Err(Error::SessionExpired(body)),
        }
    }

    async fn dispatch(&self, request: &ApiRequest, attempt: Attempt) -> Result<Dispatch, Error> {
        let url = self.context.url_for(&request.path_and_query());
        let mut builder = self
            .context
            .http_client()
            .request(request.method.clone(), &url);
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }
        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?.to_vec();

        match classify(status, &body, self.context.expiry_marker()) {
            ResponseClass::Success => Ok(Dispatch::Done(ApiResponse {
                status,
                headers,
                body,
            })),
            ResponseClass::Expired => {
                let text = String::from_utf8_lossy(&body).into_owned();
                if !attempt.may_refresh() {
                    warn!(
                        method = %request.method,
                        path = %request.path,
                        attempt = %attempt,
                        "401 session expired again after refresh; not retrying"
                    );
                    return Err(Error::SessionExpired(text));
                }
                warn!(
                    method = %request.method,
                    path = %request.path,
                    attempt = %attempt,
                    "received 401 session expired"
                );
                Ok(Dispatch::Expired(text))
            }
            ResponseClass::Failed => {
                let text = String::from_utf8_lossy(&body).into_owned();
                debug!(
                    method = %request.method,
                    path = %request.path,
                    status = %status,
                    "request failed"
                );
                Err(Error::Http(status, text))
            }
        }
    }

    /// Waits for the session to be refreshed, performing the refresh if no other request
    /// already is.
    async fn await_refresh(&self, generation: RefreshGeneration, path: &str) -> Result<(), Error> {
        match self.context.coordinator().enter(generation) {
            RefreshTicket::Leader(guard) => self.run_refresh(guard).await,
            RefreshTicket::Follower {
                rx,
                attempt_id,
                depth,
            } => {
                RefreshTelemetry::for_attempt(attempt_id, REFRESH_CONTEXT)
                    .emit_queued(path, depth);
                match rx.await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(cause)) => Err(Error::RefreshFailed(cause)),
                    Err(_) => Err(Error::RefreshFailed(Arc::new(Error::RefreshAbandoned))),
                }
            }
            RefreshTicket::AlreadyRefreshed => Ok(()),
        }
    }

    /// Runs the refresh on its own task so it settles for every waiter even if the leading
    /// caller stops polling.
    async fn run_refresh(&self, guard: LeaderGuard) -> Result<(), Error> {
        let client = self.clone();
        let handle = tokio::spawn(async move { client.complete_refresh(guard).await });
        match handle.await {
            Ok(result) => result.map_err(Error::RefreshFailed),
            Err(_) => Err(Error::RefreshFailed(Arc::new(Error::RefreshAbandoned))),
        }
    }

    async fn complete_refresh(&self, guard: LeaderGuard) -> RefreshResult {
        let telemetry = RefreshTelemetry::for_attempt(guard.attempt_id(), REFRESH_CONTEXT);
        telemetry.emit_start(Timestamp::now());
        match self.call_refresh_endpoint().await {
            Ok(()) => {
                let released = guard.settle(Ok(()));
                telemetry.emit_success(released, Timestamp::now());
                Ok(())
            }
            Err(err) => {
                let cause = Arc::new(err);
                let rejected = guard.settle(Err(Arc::clone(&cause)));
                telemetry.emit_failure(&cause, rejected, Timestamp::now());
                let listeners = self.context.signal().notify();
                telemetry.emit_invalidated(listeners);
                Err(cause)
            }
        }
    }

    /// The only place the refresh endpoint is called.
    async fn call_refresh_endpoint(&self) -> Result<(), Error> {
        self.context.record_refresh_call();
        let exchange = async {
            let resp = self
                .context
                .http_client()
                .post(self.context.refresh_url())
                .send()
                .await?;
            let status = resp.status();
            if status.is_success() {
                Ok(())
            } else {
                let body = resp.text().await.unwrap_or_default();
                Err(Error::Http(status, body))
            }
        };
        match self.context.refresh_timeout() {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| Error::Timeout(limit))?,
            None => exchange.await,
        }
    }

    /// Refreshes the session through the same single-flight gate used by `send`. Joins an
    /// in-flight refresh instead of starting another.
    pub async fn refresh_session(&self) -> Result<(), Error> {
        let generation = self.context.coordinator().generation();
        self.await_refresh(generation, self.context.refresh_url()).await
    }

    pub fn subscribe_invalidations(&self) -> broadcast::Receiver<SessionInvalidated> {
        self.context.signal().subscribe()
    }

    /// Number of calls this client has made to the refresh endpoint.
    pub fn refresh_count(&self) -> u64 {
        self.context.refresh_calls()
    }

    pub fn is_refreshing(&self) -> bool {
        self.context.coordinator().is_refreshing()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.send(ApiRequest::post(path).with_json(body)?)
            .await?
            .json()
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.send(ApiRequest::put(path).with_json(body)?)
            .await?
            .json()
    }

    pub async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.send(ApiRequest::patch(path).with_json(body)?)
            .await?
            .json()
    }

    pub async fn delete(&self, path: &str) -> Result<StatusCode, Error> {
        Ok(self.send(ApiRequest::delete(path)).await?.status)
    }
}
