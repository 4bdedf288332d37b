use crate::config::IdScheme;
use crate::errors::{handle_rejection, RouteError};
use crate::handlers;
use crate::middleware::{with_api_key, with_request_logging, ApiKeys};
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use thiserror::Error;
use tictac_engine::ids::DEFAULT_ID_LENGTH;
use tictac_engine::store::{MatchStore, StoreConfig};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::hyper::body::Bytes;
use warp::reject::Rejection;
use warp::reply::{Reply, Response};
use warp::Filter;

/// Largest accepted request body.
const MAX_BODY_BYTES: u64 = 16 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    api_keys: ApiKeys,
    id_scheme: IdScheme,
    id_length: usize,
    store: StoreConfig,
}

impl ServerConfig {
    pub fn new<I, S>(host: impl Into<String>, port: u16, api_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            host: host.into(),
            port,
            api_keys: ApiKeys::new(api_keys),
            id_scheme: IdScheme::Alphanumeric,
            id_length: DEFAULT_ID_LENGTH,
            store: StoreConfig::default(),
        }
    }

    pub fn for_tests() -> Self {
        Self::new("127.0.0.1", 0, ["test-key"])
    }

    pub fn with_id_scheme(mut self, scheme: IdScheme, length: usize) -> Self {
        self.id_scheme = scheme;
        self.id_length = length;
        self
    }

    pub fn with_restricted(mut self, restricted: bool) -> Self {
        self.store.restricted = restricted;
        self
    }

    pub fn with_chain_next_match(mut self, chain: bool) -> Self {
        self.store.chain_next_match = chain;
        self
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.api_keys.is_empty() {
            return Err(ServerError::ConfigError(
                "At least one API key must be set. Pass --api-keys or set API_KEYS to a comma separated list, e.g. API_KEYS=\"key1,key2\"".into(),
            ));
        }
        Ok(())
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn api_keys(&self) -> &ApiKeys {
        &self.api_keys
    }

    pub fn id_scheme(&self) -> IdScheme {
        self.id_scheme
    }

    pub fn store_config(&self) -> StoreConfig {
        self.store
    }
}

#[derive(Debug, Clone)]
pub struct AppContext {
    config: ServerConfig,
    store: Arc<MatchStore>,
    api_keys: Arc<ApiKeys>,
}

impl AppContext {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let ids = config.id_scheme.generator(config.id_length);
        let store = Arc::new(MatchStore::with_id_generator(ids, config.store_config()));
        Ok(Self::new_with_store(config, store))
    }

    pub fn new_with_store(config: ServerConfig, store: Arc<MatchStore>) -> Self {
        let api_keys = Arc::new(config.api_keys.clone());
        Self {
            config,
            store,
            api_keys,
        }
    }

    pub fn new_for_tests() -> Self {
        let config = ServerConfig::for_tests();
        let store = Arc::new(MatchStore::new(config.store_config()));
        Self::new_with_store(config, store)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<MatchStore> {
        Arc::clone(&self.store)
    }

    pub fn api_keys(&self) -> Arc<ApiKeys> {
        Arc::clone(&self.api_keys)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[derive(Debug, Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let context = AppContext::new(config)?;
        Ok(Self { context })
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let bind_addr = Self::bind_addr(context.config())?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let routes = Self::routes(&context);
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        tracing::info!(
            url = %format!("http://{addr}"),
            restricted = context.config().store_config().restricted,
            "app started"
        );

        let task = tokio::spawn(async move {
            server_future.await;
            Ok(())
        });

        Ok(ServerHandle::new(addr, shutdown_tx, task, context))
    }

    /// Every route, with logging and error bodies applied.
    pub fn routes(
        context: &AppContext,
    ) -> impl Filter<Extract = (Response,), Error = Infallible> + Clone {
        let routes = Self::health_route()
            .or(Self::api_routes(context))
            .unify()
            .recover(handle_rejection)
            .unify();

        with_request_logging(routes)
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        if let Some(io_err) = err
            .source()
            .and_then(|source| source.downcast_ref::<std::io::Error>())
        {
            return ServerError::BindError(std::io::Error::new(io_err.kind(), io_err.to_string()));
        }

        ServerError::ConfigError(err.to_string())
    }

    fn health_route() -> BoxedFilter<(Response,)> {
        warp::path("health")
            .and(warp::get())
            .and(warp::path::end())
            .map(|| handlers::health().into_response())
            .boxed()
    }

    fn api_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let store = context.store();

        let create = warp::path!("api" / "games")
            .and(warp::post())
            .and(Self::with_store(store.clone()))
            .and_then(|store: Arc<MatchStore>| async move {
                Ok::<_, Infallible>(handlers::create_game(store).await)
            });

        let read = warp::path!("api" / "games" / String)
            .and(warp::get())
            .and(warp::header::optional::<String>("player-id"))
            .and(Self::with_store(store.clone()))
            .and_then(
                |game_id: String, player_id: Option<String>, store: Arc<MatchStore>| async move {
                    Ok::<_, Infallible>(handlers::get_game(store, game_id, player_id).await)
                },
            );

        let turn = warp::path!("api" / "games" / String / "turn")
            .and(warp::post())
            .and(Self::limited_body(MAX_BODY_BYTES))
            .and(Self::with_store(store.clone()))
            .and_then(
                |game_id: String, body: Bytes, store: Arc<MatchStore>| async move {
                    let request =
                        handlers::TurnRequest::from_body(&body).map_err(warp::reject::custom)?;
                    Ok::<_, Rejection>(handlers::submit_turn(store, game_id, request).await)
                },
            );

        let delete = warp::path!("api" / "games" / String)
            .and(warp::delete())
            .and(Self::with_store(store))
            .and_then(|game_id: String, store: Arc<MatchStore>| async move {
                Ok::<_, Infallible>(handlers::delete_game(store, game_id).await)
            });

        with_api_key(context.api_keys())
            .and(
                create
                    .or(turn)
                    .unify()
                    .or(read)
                    .unify()
                    .or(delete)
                    .unify(),
            )
            .boxed()
    }

    /// Buffers the request body, refusing anything over `max` bytes.
    ///
    /// Chunked bodies carry no `Content-Length`, so the declared length is only
    /// checked when present and the buffered length always is.
    fn limited_body(max: u64) -> impl Filter<Extract = (Bytes,), Error = Rejection> + Clone {
        warp::header::optional::<u64>("content-length")
            .and_then(move |declared: Option<u64>| async move {
                match declared {
                    Some(length) if length > max => {
                        Err(warp::reject::custom(RouteError::PayloadTooLarge))
                    }
                    _ => Ok(()),
                }
            })
            .untuple_one()
            .and(warp::body::bytes())
            .and_then(move |body: Bytes| async move {
                if body.len() as u64 > max {
                    Err(warp::reject::custom(RouteError::PayloadTooLarge))
                } else {
                    Ok(body)
                }
            })
    }

    fn with_store(
        store: Arc<MatchStore>,
    ) -> impl Filter<Extract = (Arc<MatchStore>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&store))
    }
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
    context: AppContext,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<Result<(), ServerError>>,
        context: AppContext,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
            context,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(result) => result?,
                Err(err) => {
                    return Err(ServerError::ConfigError(format!(
                        "server task join error: {err}"
                    )))
                }
            }
        }

        tracing::info!(address = %self.addr, "server stopped");
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
