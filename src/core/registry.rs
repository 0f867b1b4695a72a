use crate::core::template::FragmentTemplate;
use crate::domain::model::PropertyMap;
use crate::domain::ports::{ConfigProvider, FragmentSource};
use crate::markup::Document;
use crate::utils::diagnostics::Diagnostics;
use crate::utils::error::FragmentError;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Outcome of a `load_many` barrier once every load has settled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub loaded: Vec<String>,
    pub failed: Vec<FragmentError>,
}

impl LoadSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 元件註冊表：名稱 → 來源位置，以及已載入的模板
///
/// 建立一次後以 `Arc` 共用。所有鎖都不會跨越 await。
pub struct ComponentRegistry<S: FragmentSource> {
    source: S,
    registrations: RwLock<HashMap<String, String>>,
    templates: RwLock<HashMap<String, Arc<FragmentTemplate>>>,
    // 每個名稱同時最多一個進行中的 fetch
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    diagnostics: Diagnostics,
}

impl<S: FragmentSource> ComponentRegistry<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            registrations: RwLock::new(HashMap::new()),
            templates: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn from_config<C: ConfigProvider>(source: S, config: &C) -> Self {
        let registry = Self::new(source);
        registry.register_all(
            config
                .components()
                .iter()
                .map(|(name, location)| (name.as_str(), location.as_str())),
        );
        registry
    }

    /// Inserts or overwrites a registration. Reachability is checked on load.
    pub fn register(&self, name: &str, source: &str) {
        tracing::debug!("Registering component {} -> {}", name, source);
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), source.to_string());
    }

    pub fn register_all<'a, I>(&self, entries: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, source) in entries {
            self.register(name, source);
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.source_of(name).is_some()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn template(&self, name: &str) -> Option<Arc<FragmentTemplate>> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn source_of(&self, name: &str) -> Option<String> {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn gate(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    /// Loads a component once. Failures are reported to the diagnostics
    /// channel before being returned, so callers may simply ignore them.
    pub async fn load(&self, name: &str) -> Result<(), FragmentError> {
        let result = self.try_load(name).await;
        if let Err(e) = &result {
            self.diagnostics.report(e);
        }
        result
    }

    async fn try_load(&self, name: &str) -> Result<(), FragmentError> {
        if self.is_loaded(name) {
            return Ok(());
        }

        let location = self
            .source_of(name)
            .ok_or_else(|| FragmentError::UnregisteredComponent {
                name: name.to_string(),
            })?;

        let gate = self.gate(name);
        let _guard = gate.lock().await;
        // 等待期間可能已被其他呼叫載入
        if self.is_loaded(name) {
            tracing::debug!("Component {} loaded by a concurrent call", name);
            return Ok(());
        }

        let markup = self
            .source
            .fetch(&location)
            .await
            .map_err(|e| FragmentError::FetchFailure {
                name: name.to_string(),
                location: location.clone(),
                reason: e.to_string(),
            })?;

        let template =
            FragmentTemplate::parse(name, &markup).map_err(|e| FragmentError::FetchFailure {
                name: name.to_string(),
                location: location.clone(),
                reason: e.to_string(),
            })?;

        self.templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::new(template));

        tracing::info!("📦 Loaded component {} from {}", name, location);
        Ok(())
    }

    /// Starts every load before awaiting any and waits for all of them to
    /// settle. A failing load never cancels its siblings.
    pub async fn load_many<N: AsRef<str>>(&self, names: &[N]) -> LoadSummary {
        let results = join_all(names.iter().map(|name| self.load(name.as_ref()))).await;

        let mut summary = LoadSummary::default();
        for (name, result) in names.iter().zip(results) {
            match result {
                Ok(()) => summary.loaded.push(name.as_ref().to_string()),
                Err(e) => summary.failed.push(e),
            }
        }
        summary
    }

    /// Renders `name` into the element matched by `mount_selector`, replacing
    /// whatever the mount point held. On failure the document is untouched and
    /// exactly one diagnostic is reported.
    pub async fn render(
        &self,
        document: &mut Document,
        name: &str,
        mount_selector: &str,
        properties: &PropertyMap,
    ) -> Result<(), FragmentError> {
        let result = self
            .try_render(document, name, mount_selector, properties)
            .await;
        if let Err(e) = &result {
            self.diagnostics.report(e);
        }
        result
    }

    async fn try_render(
        &self,
        document: &mut Document,
        name: &str,
        mount_selector: &str,
        properties: &PropertyMap,
    ) -> Result<(), FragmentError> {
        // 載入失敗併入 TemplateNotFound，只記錄一次
        let load_failure = self.try_load(name).await.err();

        let template = self
            .template(name)
            .ok_or_else(|| FragmentError::TemplateNotFound {
                name: name.to_string(),
                reason: load_failure
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "not loaded".to_string()),
            })?;

        let mount_not_found = |reason: Option<String>| {
            if let Some(reason) = reason {
                tracing::debug!("Mount selector {} rejected: {}", mount_selector, reason);
            }
            FragmentError::MountPointNotFound {
                component: name.to_string(),
                selector: mount_selector.to_string(),
            }
        };
        let mount = document
            .query_selector(mount_selector)
            .map_err(|e| mount_not_found(Some(e.to_string())))?
            .ok_or_else(|| mount_not_found(None))?;

        let instance = template.instantiate(properties);
        if !document.replace_children(&mount, instance) {
            return Err(mount_not_found(None));
        }

        tracing::debug!("Rendered component {} into {}", name, mount_selector);
        Ok(())
    }
}
