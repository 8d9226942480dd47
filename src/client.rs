use crate::util::clock::Clock;
use lobot::Lobot;
use monoda::personal::{AccountId, Monobank, Statement, Token};
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};
use std::time::{Duration, Instant};
use std::{collections::HashMap, env, sync::Arc, thread};
use thiserror::Error;
use tracing::{info, trace, warn};
use ureq::tls::{TlsConfig, TlsProvider};
use ureq::Agent;

// Monobank allows roughly one statement request per account per minute, so a small pool covers a
// whole family roster.
const DEFAULT_THREADPOOL_SIZE: usize = 4;

/// Total transport attempts for a single statement request.
const RETRY_ATTEMPTS: u32 = 3;

/// Pause between transport attempts.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Upper bound on distinct `(account, window start)` keys held by the statement cache.
const CACHE_CAPACITY: usize = 64;

pub type StatementResult = Arc<Result<Statement, StatementError>>;

type StatementFetcher = Box<dyn Fn(&StatementKey) -> StatementResult + Sync>;

/// The public interface for the client API.
///
/// Exists as a trait so that unit tests can mock the client responses.
pub trait ClientApi {
    /// Get the memoized statements for a list of accounts over the current fetch window.
    fn get_statements(&self, accounts: &[AccountId]) -> HashMap<AccountId, StatementResult>;
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Error parsing RAYON_NUM_THREADS")]
    RayonThreadPoolSize(#[source] std::num::ParseIntError),

    #[error("Rayon thread pool error")]
    RayonThreadPoolInit(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Error)]
pub enum StatementClientError {
    #[error("Invalid Monobank URI")]
    MonobankUri(#[from] monoda::http::Error),

    #[error("Thread Pool error")]
    ThreadPool(#[from] PoolError),
}

/// Per-account fetch errors. These are memoized behind `Arc`, so they are `Clone` and carry
/// stringified causes.
#[derive(Clone, Debug, Error)]
pub enum StatementError {
    #[error("Upstream unreachable for account `{account}` after {attempts} attempts: {message}")]
    Unavailable {
        account: AccountId,
        attempts: u32,
        message: String,
    },

    #[error("Upstream error for account `{account}`: HTTP {status}: {body}")]
    Upstream {
        account: AccountId,
        status: u16,
        body: String,
    },

    #[error("Error parsing statement for account `{account}`: {message}")]
    Malformed { account: AccountId, message: String },

    #[error("No token registered for account `{0}`")]
    MissingToken(AccountId),
}

/// Memoization key for statement responses.
///
/// The token is deliberately not part of the key; the account already identifies whose statement
/// is being fetched.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct StatementKey {
    pub account: AccountId,

    /// Window start, in Unix epoch seconds.
    pub from: i64,
}

/// A simple, concurrent, memoizing Monobank statement client.
///
/// Responses (including errors) are memoized per `(account, window start)` and concurrent
/// requests for the same key are serialized by the cache, so each key is fetched from the network
/// at most once. Concurrency across keys is limited by global threadpool configuration. See
/// `cargo run -- --help`
pub struct StatementClient {
    pool: ThreadPool,
    clock: Arc<dyn Clock>,
    days: u32,

    // Protocol cache
    statement_cache: Lobot<StatementKey, StatementResult, StatementFetcher>,
}

impl StatementClient {
    /// Create a new statement client with the provided API server URI and account credentials.
    ///
    /// The fetch window is computed from `clock` at call time: `days` whole days back from "now",
    /// floored to a whole second.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> Result<(), spendcount::errors::StatementClientError> {
    /// # use spendcount::client::StatementClient;
    /// # use spendcount::util::clock::SystemClock;
    /// # use std::sync::Arc;
    /// let credentials = [(
    ///     "kKGVoZuHWzqVoZuH".parse().unwrap(),
    ///     "uB85JZKest8AjDornrqNNWdi2Conq7cvGVmo".parse().unwrap(),
    /// )];
    /// let client = StatementClient::new(
    ///     "https://api.monobank.ua/",
    ///     credentials,
    ///     30,
    ///     Arc::new(SystemClock),
    /// )?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        api_server: &str,
        credentials: impl IntoIterator<Item = (AccountId, Token)>,
        days: u32,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StatementClientError> {
        let (num_threads, pool) = create_thread_pool()?;

        let agent = Agent::from(
            Agent::config_builder()
                // Error statuses are part of the protocol. See `fetch_statement`.
                .http_status_as_error(false)
                .max_idle_connections_per_host(num_threads)
                .tls_config(
                    TlsConfig::builder()
                        .provider(TlsProvider::NativeTls)
                        .build(),
                )
                .build(),
        );
        let monobank = Arc::new(Monobank::new(api_server)?);
        let tokens: Arc<HashMap<AccountId, Token>> = Arc::new(credentials.into_iter().collect());

        let statement_fetcher = Box::new(move |key: &_| {
            fetch_statement(&agent, &monobank, &tokens, key)
        }) as StatementFetcher;

        Ok(Self {
            pool,
            clock,
            days,
            statement_cache: Lobot::with_capacity(CACHE_CAPACITY, statement_fetcher),
        })
    }

    /// Create a statement client around an injected fetcher, for tests that count fetches.
    #[cfg(test)]
    fn with_fetcher(days: u32, clock: Arc<dyn Clock>, fetcher: StatementFetcher) -> Self {
        let (_, pool) = create_thread_pool().unwrap();

        Self {
            pool,
            clock,
            days,
            statement_cache: Lobot::with_capacity(CACHE_CAPACITY, fetcher),
        }
    }
}

impl ClientApi for StatementClient {
    fn get_statements(&self, accounts: &[AccountId]) -> HashMap<AccountId, StatementResult> {
        let from = self.clock.window_start(self.days);

        self.pool.in_place_scope(|_scope| {
            accounts
                .par_iter()
                .map(|account| {
                    let key = StatementKey {
                        account: account.clone(),
                        from,
                    };

                    (account.clone(), self.statement_cache.get(key))
                })
                .collect()
        })
    }
}

pub(crate) fn create_thread_pool() -> Result<(usize, ThreadPool), PoolError> {
    // Configure the Rayon thread pool for I/O concurrency.
    let num_threads = env::var("RAYON_NUM_THREADS")
        .unwrap_or_else(|_| DEFAULT_THREADPOOL_SIZE.to_string())
        .parse()
        .map_err(PoolError::RayonThreadPoolSize)?;

    let pool = ThreadPoolBuilder::new().num_threads(num_threads).build()?;

    Ok((num_threads, pool))
}

/// Run `op` until it succeeds, pausing `delay` between attempts, for at most `attempts` total
/// tries. Returns the last error when every attempt fails.
pub(crate) fn retry<T, E: std::fmt::Display>(
    attempts: u32,
    delay: Duration,
    mut op: impl FnMut() -> Result<T, E>,
) -> Result<T, E> {
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts => {
                warn!("Attempt {attempt} of {attempts} failed: {err}. Retrying in {delay:?}");
                thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// This is the statement constructor for the memoizing client.
/// It does error handling in a special way because the return value needs to be wrapped in `Arc`.
///
/// Transport failures are retried with a pause between attempts; an HTTP error status is a
/// response, not a transport failure, and is never retried.
fn fetch_statement(
    agent: &Agent,
    monobank: &Arc<Monobank>,
    tokens: &Arc<HashMap<AccountId, Token>>,
    key: &StatementKey,
) -> StatementResult {
    let thread_id = std::thread::current().id();
    let account = key.account.clone();

    let Some(token) = tokens.get(&account) else {
        return Arc::new(Err(StatementError::MissingToken(account)));
    };

    info!(
        "Fetching statement for account `{account}` from {from} on {thread_id:?}",
        from = key.from,
    );

    let start = Instant::now();
    let mut resp = match retry(RETRY_ATTEMPTS, RETRY_DELAY, || {
        agent.run(monobank.get_statement(token, &account, key.from))
    }) {
        Ok(resp) => resp,
        Err(err) => {
            return Arc::new(Err(StatementError::Unavailable {
                account,
                attempts: RETRY_ATTEMPTS,
                message: err.to_string(),
            }));
        }
    };

    let status = resp.status();
    if !status.is_success() {
        let body = resp
            .body_mut()
            .read_to_string()
            .unwrap_or_else(|err| format!("<unreadable body: {err}>"));

        return Arc::new(Err(StatementError::Upstream {
            account,
            status: status.as_u16(),
            body,
        }));
    }

    let statement: Statement = match resp.body_mut().read_json() {
        Ok(statement) => statement,
        Err(err) => {
            return Arc::new(Err(StatementError::Malformed {
                account,
                message: err.to_string(),
            }));
        }
    };
    let dur = start.elapsed();

    info!(
        "Account `{account}` statement received in {dur:?} ({len} records)",
        len = statement.len(),
    );
    trace!("{statement:#?}");

    Arc::new(Ok(statement))
}
