//! Config store: shared widget configuration with change broadcast.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::flow::PayoutMethod;

use super::model::{RecipientType, VerificationStep, WidgetConfig, WidgetConfigPatch};

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Change notification sent to subscribers after every write.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfigEvent {
    Updated { revision: u64 },
    Reset { revision: u64 },
}

struct Inner {
    config: WidgetConfig,
    revision: u64,
}

/// Holds the committed widget configuration.
///
/// Writes replace the whole snapshot under the lock (last write wins) and
/// bump the revision.
pub struct ConfigStore {
    inner: RwLock<Inner>,
    strict: bool,
    tx: broadcast::Sender<ConfigEvent>,
}

impl ConfigStore {
    /// Create a store holding the built-in defaults.
    pub fn new(strict: bool) -> Arc<Self> {
        Self::with_config(WidgetConfig::default(), strict)
    }

    pub fn with_config(config: WidgetConfig, strict: bool) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            inner: RwLock::new(Inner {
                config,
                revision: 0,
            }),
            strict,
            tx,
        })
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.tx.subscribe()
    }

    /// Snapshot of the committed configuration.
    pub async fn get(&self) -> WidgetConfig {
        self.inner.read().await.config.clone()
    }

    pub async fn revision(&self) -> u64 {
        self.inner.read().await.revision
    }

    /// Shallow-merge a typed patch. Values are stored as given.
    pub async fn update(&self, patch: WidgetConfigPatch) {
        if patch.is_empty() {
            debug!("Ignoring empty config patch");
            return;
        }
        debug!(?patch, "Applying config patch");
        self.mutate(|config| patch.apply_to(config)).await;
    }

    /// Merge an untyped JSON object.
    ///
    /// Unknown top-level keys are rejected in strict mode and dropped with a
    /// warning otherwise. Values of the wrong shape are always rejected.
    pub async fn update_json(&self, value: serde_json::Value) -> Result<(), ConfigError> {
        let serde_json::Value::Object(mut map) = value else {
            return Err(ConfigError::ParseError(
                "config patch must be a JSON object".to_string(),
            ));
        };

        let unknown: Vec<String> = map
            .keys()
            .filter(|k| !WidgetConfigPatch::FIELDS.contains(&k.as_str()))
            .cloned()
            .collect();
        for key in unknown {
            if self.strict {
                warn!(field = %key, "Rejecting config patch with unknown field");
                return Err(ConfigError::InvalidConfigField(key));
            }
            warn!(field = %key, "Dropping unknown config field");
            map.remove(&key);
        }

        for key in WidgetConfigPatch::FIELDS {
            if let Some(v) = map.get(key) {
                let single = serde_json::json!({ key: v });
                serde_json::from_value::<WidgetConfigPatch>(single).map_err(|e| {
                    ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: e.to_string(),
                    }
                })?;
            }
        }

        let patch: WidgetConfigPatch = serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        self.update(patch).await;
        Ok(())
    }

    /// Add `step` at the end if absent, otherwise remove it.
    pub async fn toggle_step(&self, step: VerificationStep) {
        self.mutate(|config| {
            if let Some(pos) = config.enabled_steps.iter().position(|s| *s == step) {
                config.enabled_steps.remove(pos);
                debug!(step = %step, "Verification step disabled");
            } else {
                config.enabled_steps.push(step);
                debug!(step = %step, "Verification step enabled");
            }
        })
        .await;
    }

    pub async fn toggle_payout_method(&self, method: PayoutMethod) {
        self.mutate(|config| {
            if !config.enabled_payout_methods.remove(&method) {
                config.enabled_payout_methods.insert(method);
                debug!(method = %method, "Payout method enabled");
            } else {
                debug!(method = %method, "Payout method disabled");
            }
        })
        .await;
    }

    pub async fn set_recipient_type(&self, recipient_type: RecipientType) {
        self.mutate(|config| config.recipient_type = recipient_type)
            .await;
    }

    /// Payouts-only mode drops every verification step; leaving it restores
    /// the default steps.
    pub async fn set_payouts_only_mode(&self, enabled: bool) {
        info!(enabled, "Payouts-only mode changed");
        self.mutate(|config| {
            config.enabled_steps = if enabled {
                Vec::new()
            } else {
                VerificationStep::DEFAULT_ORDER.to_vec()
            };
        })
        .await;
    }

    /// Restore the built-in defaults.
    pub async fn reset(&self) {
        let revision = {
            let mut inner = self.inner.write().await;
            inner.config = WidgetConfig::default();
            inner.revision += 1;
            inner.revision
        };
        info!(revision, "Widget config reset to defaults");
        // Ok if no subscribers
        let _ = self.tx.send(ConfigEvent::Reset { revision });
    }

    async fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut WidgetConfig),
    {
        let revision = {
            let mut inner = self.inner.write().await;
            let mut next = inner.config.clone();
            f(&mut next);
            inner.config = next;
            inner.revision += 1;
            inner.revision
        };
        let _ = self.tx.send(ConfigEvent::Updated { revision });
    }
}
