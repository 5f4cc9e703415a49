//! Randomness sources.
//!
//! A source is asked for a seed with [`RandomnessSource::request`] and then
//! polled until the answer is available. [`wait_for_result`] bounds the wait;
//! an all-zero seed counts as "not ready yet".

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use nftune_battle::{create_rng, BattleError, BattleResult, RandomSeed};
use rand::{Rng, RngCore};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

/// Bytes in a full seed.
pub const SEED_BYTES: usize = 32;

/// Handle for an outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// A seed together with its coin flip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomnessResult {
    /// Hex seed.
    pub seed: RandomSeed,
    /// Coin flip returned alongside the seed.
    pub coin_flip: bool,
}

/// An external supplier of seeds.
pub trait RandomnessSource: Send + Sync {
    /// Starts a request.
    fn request(&self) -> impl Future<Output = BattleResult<RequestId>> + Send;

    /// Checks whether the answer to `request` is available.
    fn poll(
        &self,
        request: RequestId,
    ) -> impl Future<Output = BattleResult<Option<RandomnessResult>>> + Send;

    /// Drops any state held for a request the caller stopped waiting on.
    fn cancel(&self, _request: RequestId) {}
}

/// Requests a seed and polls until it arrives or `timeout` elapses.
///
/// The timeout covers the request as well as the polling.
pub async fn wait_for_result<S: RandomnessSource + ?Sized>(
    source: &S,
    timeout: Duration,
    poll_interval: Duration,
) -> BattleResult<RandomnessResult> {
    let started = Instant::now();
    let mut issued = None;
    let outcome =
        tokio::time::timeout(timeout, request_and_poll(source, poll_interval, &mut issued)).await;

    match outcome {
        Ok(result) => result,
        Err(_) => {
            if let Some(request) = issued {
                debug!(%request, "abandoning randomness request");
                source.cancel(request);
            }
            Err(BattleError::UpstreamTimeout {
                waited_ms: started.elapsed().as_millis() as u64,
            })
        }
    }
}

async fn request_and_poll<S: RandomnessSource + ?Sized>(
    source: &S,
    poll_interval: Duration,
    issued: &mut Option<RequestId>,
) -> BattleResult<RandomnessResult> {
    let request = source.request().await?;
    *issued = Some(request);
    loop {
        match source.poll(request).await? {
            Some(result) if !result.seed.is_zero() => return Ok(result),
            Some(_) => debug!(%request, "randomness source answered a zero seed"),
            None => debug!(%request, "randomness not ready"),
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Deterministic local source backed by PCG32.
///
/// Answers become available `latency` after the request. An unresponsive
/// source never answers.
#[derive(Debug)]
pub struct LocalRandomness {
    rng: Mutex<Pcg32>,
    latency: Duration,
    responsive: bool,
    next_id: AtomicU64,
    pending: Mutex<HashMap<RequestId, (Instant, RandomnessResult)>>,
}

impl LocalRandomness {
    /// Source answering immediately, seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(create_rng(seed)),
            latency: Duration::ZERO,
            responsive: true,
            next_id: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Source seeded from the OS.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Source that never answers.
    pub fn unresponsive() -> Self {
        Self {
            responsive: false,
            ..Self::new(0)
        }
    }

    /// Sets how long each answer takes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn generate(&self) -> BattleResult<RandomnessResult> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| BattleError::storage("randomness generator lock poisoned"))?;
        let mut bytes = [0u8; SEED_BYTES];
        rng.fill_bytes(&mut bytes);
        let coin_flip = rng.gen_bool(0.5);
        Ok(RandomnessResult {
            seed: RandomSeed::from_bytes(&bytes)?,
            coin_flip,
        })
    }
}

impl RandomnessSource for LocalRandomness {
    async fn request(&self) -> BattleResult<RequestId> {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let result = self.generate()?;
        let ready_at = Instant::now() + self.latency;
        self.pending
            .lock()
            .map_err(|_| BattleError::storage("randomness request table lock poisoned"))?
            .insert(id, (ready_at, result));
        Ok(id)
    }

    async fn poll(&self, request: RequestId) -> BattleResult<Option<RandomnessResult>> {
        if !self.responsive {
            return Ok(None);
        }
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| BattleError::storage("randomness request table lock poisoned"))?;
        match pending.get(&request) {
            Some((ready_at, _)) if Instant::now() >= *ready_at => {
                Ok(pending.remove(&request).map(|(_, result)| result))
            }
            Some(_) => Ok(None),
            None => Err(BattleError::not_found("randomness request", request.to_string())),
        }
    }

    fn cancel(&self, request: RequestId) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&request);
        }
    }
}

/// Source that hands out a fixed list of answers in order, then repeats the last.
#[derive(Debug)]
pub struct FixedRandomness {
    answers: Vec<RandomnessResult>,
    served: AtomicU64,
}

impl FixedRandomness {
    /// Always answers `seed`.
    pub fn new(seed: RandomSeed, coin_flip: bool) -> Self {
        Self::sequence(vec![RandomnessResult { seed, coin_flip }])
    }

    /// Answers each entry once, in order.
    pub fn sequence(answers: Vec<RandomnessResult>) -> Self {
        Self {
            answers,
            served: AtomicU64::new(0),
        }
    }
}

impl RandomnessSource for FixedRandomness {
    async fn request(&self) -> BattleResult<RequestId> {
        Ok(RequestId(self.served.fetch_add(1, Ordering::Relaxed)))
    }

    async fn poll(&self, request: RequestId) -> BattleResult<Option<RandomnessResult>> {
        let index = (request.0 as usize).min(self.answers.len().saturating_sub(1));
        Ok(self.answers.get(index).cloned())
    }
}
