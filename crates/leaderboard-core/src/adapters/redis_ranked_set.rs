//! Redis Ranked-Set Adapter
//!
//! `RankedSetStore` on Redis sorted sets, shared by every process of a
//! deployment, so a rebuild run from one process is what the others read.
//!
//! Redis breaks score ties by member bytes. Members are stored as
//! zero-padded decimals under negated scores, which makes an ascending
//! `ZRANGE`/`ZRANK` walk score descending with ties by ascending player id.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Cmd, FromRedisValue, RedisError};
use tracing::info;

use crate::domain::{BackendError, PlayerId, Score};
use crate::ports::outbound::{RankedMember, RankedSetStore};

/// Largest score a sorted-set double holds exactly.
pub const MAX_EXACT_SCORE: Score = 1 << 53;

/// Ranked-set store on a Redis server.
#[derive(Clone)]
pub struct RedisRankedSet {
    conn: ConnectionManager,
}

impl RedisRankedSet {
    /// Connect to `url`, e.g. `redis://127.0.0.1:6379/0`. The connection is
    /// re-established transparently after a drop.
    pub async fn connect(url: &str) -> Result<Self, BackendError> {
        let client = Client::open(url).map_err(backend_error)?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(backend_error)?;
        info!("Connected to ranked-set service");
        Ok(Self { conn })
    }

    async fn query<T: FromRedisValue + Send>(&self, cmd: &Cmd) -> Result<T, BackendError> {
        let mut conn = self.conn.clone();
        cmd.query_async::<_, T>(&mut conn)
            .await
            .map_err(backend_error)
    }
}

#[async_trait]
impl RankedSetStore for RedisRankedSet {
    async fn add(&self, key: &str, member: PlayerId, score: Score) -> Result<(), BackendError> {
        let mut cmd = redis::cmd("ZADD");
        cmd.arg(key).arg(encode_score(score)?).arg(encode_member(member));
        self.query(&cmd).await
    }

    async fn add_many(&self, key: &str, members: &[RankedMember]) -> Result<(), BackendError> {
        if members.is_empty() {
            return Ok(());
        }
        let mut cmd = redis::cmd("ZADD");
        cmd.arg(key);
        for &(member, score) in members {
            cmd.arg(encode_score(score)?).arg(encode_member(member));
        }
        self.query(&cmd).await
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        self.query(&cmd).await
    }

    async fn range_desc_with_scores(
        &self,
        key: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<RankedMember>, BackendError> {
        let Some((start, stop)) = range_args(start, stop) else {
            return Ok(Vec::new());
        };
        let mut cmd = redis::cmd("ZRANGE");
        cmd.arg(key).arg(start).arg(stop).arg("WITHSCORES");
        let raw: Vec<(String, f64)> = self.query(&cmd).await?;

        raw.into_iter()
            .map(|(member, score)| Ok((decode_member(&member)?, decode_score(score)?)))
            .collect()
    }

    async fn rank_desc(&self, key: &str, member: PlayerId) -> Result<Option<u64>, BackendError> {
        let mut cmd = redis::cmd("ZRANK");
        cmd.arg(key).arg(encode_member(member));
        self.query(&cmd).await
    }

    async fn score(&self, key: &str, member: PlayerId) -> Result<Option<Score>, BackendError> {
        let mut cmd = redis::cmd("ZSCORE");
        cmd.arg(key).arg(encode_member(member));
        let raw: Option<f64> = self.query(&cmd).await?;
        raw.map(decode_score).transpose()
    }

    async fn cardinality(&self, key: &str) -> Result<usize, BackendError> {
        let mut cmd = redis::cmd("ZCARD");
        cmd.arg(key);
        self.query(&cmd).await
    }
}

/// Fixed-width so byte order equals numeric order.
fn encode_member(member: PlayerId) -> String {
    format!("{:020}", member)
}

fn decode_member(raw: &str) -> Result<PlayerId, BackendError> {
    raw.parse()
        .map_err(|_| BackendError::Query(format!("unexpected ranked-set member '{}'", raw)))
}

fn encode_score(score: Score) -> Result<f64, BackendError> {
    if score > MAX_EXACT_SCORE {
        return Err(BackendError::Query(format!(
            "score {} exceeds exact sorted-set range {}",
            score, MAX_EXACT_SCORE
        )));
    }
    Ok(-(score as f64))
}

fn decode_score(raw: f64) -> Result<Score, BackendError> {
    let score = -raw;
    if !score.is_finite() || score < 0.0 || score.fract() != 0.0 || score > MAX_EXACT_SCORE as f64
    {
        return Err(BackendError::Query(format!(
            "unexpected ranked-set score {}",
            raw
        )));
    }
    Ok(score as Score)
}

/// `ZRANGE` bounds. `None` when the range is empty; a stop past `isize`
/// means "to the end".
fn range_args(start: usize, stop: usize) -> Option<(isize, isize)> {
    if stop < start {
        return None;
    }
    let start = isize::try_from(start).ok()?;
    Some((start, isize::try_from(stop).unwrap_or(-1)))
}

fn backend_error(e: RedisError) -> BackendError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout()
    {
        BackendError::Unavailable(e.to_string())
    } else {
        BackendError::Query(e.to_string())
    }
}
