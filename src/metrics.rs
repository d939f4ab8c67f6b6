use once_cell::sync::{Lazy, OnceCell};
use prometheus::{Encoder, Registry, TextEncoder};

use action_locator::metrics as heal_metrics;

use crate::errors::SelfHealError;

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static REGISTER_ONCE: OnceCell<()> = OnceCell::new();

pub fn register_metrics() {
    REGISTER_ONCE.get_or_init(|| {
        heal_metrics::register_metrics(global_registry());
    });
}

pub fn global_registry() -> &'static Registry {
    &GLOBAL_REGISTRY
}

/// Prometheus text exposition of every registered metric
pub fn render_metrics() -> Result<String, SelfHealError> {
    register_metrics();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&global_registry().gather(), &mut buffer)
        .map_err(|err| SelfHealError::Metrics(err.to_string()))?;
    String::from_utf8(buffer).map_err(|err| SelfHealError::Metrics(err.to_string()))
}
