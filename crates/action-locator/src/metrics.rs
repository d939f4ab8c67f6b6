use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{
    core::Collector, histogram_opts, Histogram, IntCounter, IntCounterVec, Registry,
};
use tracing::error;

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealMetricsSnapshot {
    pub attempts: u64,
    pub successes: u64,
    pub exhausted: u64,
    pub strategy_failures: u64,
}

static ATTEMPTS: AtomicU64 = AtomicU64::new(0);
static SUCCESSES: AtomicU64 = AtomicU64::new(0);
static EXHAUSTED: AtomicU64 = AtomicU64::new(0);
static STRATEGY_FAILURES: AtomicU64 = AtomicU64::new(0);

lazy_static! {
    static ref HEAL_ATTEMPTS_TOTAL: IntCounter = IntCounter::new(
        "selfheal_heal_attempts_total",
        "Total heal requests received"
    )
    .unwrap();
    static ref HEAL_SUCCESS_TOTAL: IntCounterVec = IntCounterVec::new(
        prometheus::Opts::new(
            "selfheal_heal_success_total",
            "Heals resolved, by winning strategy"
        ),
        &["strategy"]
    )
    .unwrap();
    static ref HEAL_EXHAUSTED_TOTAL: IntCounter = IntCounter::new(
        "selfheal_heal_exhausted_total",
        "Heals where every strategy abstained"
    )
    .unwrap();
    static ref STRATEGY_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        prometheus::Opts::new(
            "selfheal_strategy_failures_total",
            "Strategy errors caught during healing"
        ),
        &["strategy"]
    )
    .unwrap();
    static ref HEAL_DURATION: Histogram = Histogram::with_opts(histogram_opts!(
        "selfheal_heal_duration_seconds",
        "Time spent running the strategy cascade",
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    ))
    .unwrap();
}

fn register<C>(registry: &Registry, collector: C)
where
    C: Collector + Clone + Send + Sync + 'static,
{
    if let Err(err) = registry.register(Box::new(collector.clone())) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register heal metric");
        }
    }
}

pub fn register_metrics(registry: &Registry) {
    register(registry, HEAL_ATTEMPTS_TOTAL.clone());
    register(registry, HEAL_SUCCESS_TOTAL.clone());
    register(registry, HEAL_EXHAUSTED_TOTAL.clone());
    register(registry, STRATEGY_FAILURES_TOTAL.clone());
    register(registry, HEAL_DURATION.clone());
}

pub fn record_attempt() {
    ATTEMPTS.fetch_add(1, Ordering::Relaxed);
    HEAL_ATTEMPTS_TOTAL.inc();
}

pub fn record_success(strategy: &str, duration: Duration) {
    SUCCESSES.fetch_add(1, Ordering::Relaxed);
    HEAL_SUCCESS_TOTAL.with_label_values(&[strategy]).inc();
    HEAL_DURATION.observe(duration.as_secs_f64());
}

pub fn record_exhausted(duration: Duration) {
    EXHAUSTED.fetch_add(1, Ordering::Relaxed);
    HEAL_EXHAUSTED_TOTAL.inc();
    HEAL_DURATION.observe(duration.as_secs_f64());
}

pub fn record_strategy_failure(strategy: &str) {
    STRATEGY_FAILURES.fetch_add(1, Ordering::Relaxed);
    STRATEGY_FAILURES_TOTAL.with_label_values(&[strategy]).inc();
}

pub fn snapshot() -> HealMetricsSnapshot {
    HealMetricsSnapshot {
        attempts: ATTEMPTS.load(Ordering::Relaxed),
        successes: SUCCESSES.load(Ordering::Relaxed),
        exhausted: EXHAUSTED.load(Ordering::Relaxed),
        strategy_failures: STRATEGY_FAILURES.load(Ordering::Relaxed),
    }
}
