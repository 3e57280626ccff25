//! Preview/commit cycle for proposed styles.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::StyleError;
use crate::widget::{ConfigStore, Theme, WidgetConfigPatch, WidgetKey};

use super::presets::StylePreset;

/// A proposed theme that has not been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewState {
    /// Name of the preset the preview came from, if any.
    pub preset_name: Option<String>,
    pub theme: Theme,
}

/// Holds at most one pending preview and commits it to the config store.
pub struct StyleConfigurator {
    store: Arc<ConfigStore>,
    key: WidgetKey,
    preview: Option<PreviewState>,
}

impl StyleConfigurator {
    pub fn new(store: Arc<ConfigStore>, key: WidgetKey) -> Self {
        Self {
            store,
            key,
            preview: None,
        }
    }

    /// The pending preview, if one is showing.
    pub fn preview(&self) -> Option<&PreviewState> {
        self.preview.as_ref()
    }

    pub fn widget_key(&self) -> &WidgetKey {
        &self.key
    }

    /// Overlay `preset` on the committed theme and hold the result as the
    /// pending preview. The store is not touched.
    pub async fn propose(&mut self, preset: &StylePreset) -> PreviewState {
        let committed = self.store.get().await.theme;
        let preview = PreviewState {
            preset_name: Some(preset.name.to_string()),
            theme: preset.overlay(&committed),
        };
        info!(preset = preset.name, "Style preview proposed");
        self.preview = Some(preview.clone());
        preview
    }

    /// Write `preview` to the store and bump the widget key. Returns the new
    /// key value.
    pub async fn commit(&mut self, preview: PreviewState) -> u64 {
        let name = preview.preset_name.clone();
        self.store.update(WidgetConfigPatch::theme(preview.theme)).await;
        self.preview = None;
        let key = self.key.bump();
        info!(preset = name.as_deref().unwrap_or("custom"), widget_key = key, "Style applied");
        key
    }

    /// Commit the pending preview.
    pub async fn apply(&mut self) -> Result<u64, StyleError> {
        let preview = self.preview.take().ok_or(StyleError::NothingToApply)?;
        Ok(self.commit(preview).await)
    }

    /// Drop the pending preview. Returns whether there was one.
    pub fn discard(&mut self) -> bool {
        self.preview.take().is_some()
    }
}
