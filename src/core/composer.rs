use crate::core::behaviors::page_listeners;
use crate::core::page::Page;
use crate::core::registry::ComponentRegistry;
use crate::domain::model::{NavigationSettings, PageIdentity, Section, SiteLayout};
use crate::domain::ports::{ConfigProvider, FragmentSource};
use crate::markup::Document;
use crate::utils::error::{FragmentError, Result, SiteError};
use serde::Serialize;
use std::sync::Arc;

/// 組合流程的狀態，單向前進，每次頁面載入只走一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComposerPhase {
    Init,
    Identify,
    Render,
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionReport {
    pub identity: PageIdentity,
    pub rendered: Vec<String>,
    pub failures: Vec<FragmentError>,
    pub listeners_attached: usize,
}

impl CompositionReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// For callers that want any component failure to be fatal.
    pub fn into_result(self) -> Result<Self> {
        match self.failures.first() {
            Some(first) => Err(SiteError::Fragment(first.clone())),
            None => Ok(self),
        }
    }
}

pub struct PageComposer<S: FragmentSource> {
    registry: Arc<ComponentRegistry<S>>,
    layout: SiteLayout,
    navigation: NavigationSettings,
    phase: ComposerPhase,
}

impl<S: FragmentSource> PageComposer<S> {
    pub fn new(
        registry: Arc<ComponentRegistry<S>>,
        layout: SiteLayout,
        navigation: NavigationSettings,
    ) -> Self {
        Self {
            registry,
            layout,
            navigation,
            phase: ComposerPhase::Init,
        }
    }

    pub fn from_config<C: ConfigProvider>(registry: Arc<ComponentRegistry<S>>, config: &C) -> Self {
        Self::new(
            registry,
            config.layout().clone(),
            config.navigation().clone(),
        )
    }

    pub fn phase(&self) -> ComposerPhase {
        self.phase
    }

    /// Runs the single composition pass for `page` at navigation `path`.
    pub async fn compose(&mut self, page: &mut Page, path: &str) -> Result<CompositionReport> {
        if self.phase != ComposerPhase::Init {
            return Err(SiteError::AlreadyComposed);
        }

        let mut rendered = Vec::new();
        let mut failures = Vec::new();

        // Init: 共用元件並行載入
        let shared = [
            self.layout.navbar.component.clone(),
            self.layout.footer.component.clone(),
        ];
        // 失敗會在渲染時以 TemplateNotFound 記入報告
        let _ = self.registry.load_many(&shared).await;

        self.phase = ComposerPhase::Identify;
        let identity = PageIdentity::from_path(path);
        tracing::info!("🧭 Composing page '{}' as {}", path, identity);

        self.phase = ComposerPhase::Render;
        let navbar = self.layout.navbar.clone();
        self.render_section(page.document_mut(), &navbar, &mut rendered, &mut failures)
            .await;

        self.render_page_content(page, identity, &mut rendered, &mut failures)
            .await;

        let footer = self.layout.footer.clone();
        self.render_section(page.document_mut(), &footer, &mut rendered, &mut failures)
            .await;

        set_active_nav(page.document_mut(), &self.navigation, identity);

        let mut listeners_attached = 0;
        for listener in page_listeners(&self.navigation, page.document()) {
            if page.attach(listener) {
                listeners_attached += 1;
            }
        }

        self.phase = ComposerPhase::Terminal;

        if failures.is_empty() {
            tracing::info!("✅ Composed {} with {} components", identity, rendered.len());
        } else {
            tracing::warn!(
                "⚠️ Composed {} with {} components, {} failures",
                identity,
                rendered.len(),
                failures.len()
            );
        }

        Ok(CompositionReport {
            identity,
            rendered,
            failures,
            listeners_attached,
        })
    }

    async fn render_page_content(
        &self,
        page: &mut Page,
        identity: PageIdentity,
        rendered: &mut Vec<String>,
        failures: &mut Vec<FragmentError>,
    ) {
        if let Some(main) = &self.layout.main_selector {
            if !matches!(page.document().query_selector(main), Ok(Some(_))) {
                tracing::debug!("No {} on page, skipping page content", main);
                return;
            }
        }

        let Some(layout) = self.layout.page(identity) else {
            tracing::debug!("No page-specific components for {}", identity);
            return;
        };

        let components = layout.components();
        if components.len() > 1 || !layout.preload.is_empty() {
            let summary = self.registry.load_many(&components).await;
            // 區塊元件的失敗在渲染時以 TemplateNotFound 記錄，只補上純預載的
            failures.extend(summary.failed.into_iter().filter(|e| {
                !layout
                    .sections
                    .iter()
                    .any(|s| s.component == e.component())
            }));
        }

        for section in &layout.sections {
            self.render_section(page.document_mut(), section, rendered, failures)
                .await;
        }
    }

    async fn render_section(
        &self,
        document: &mut Document,
        section: &Section,
        rendered: &mut Vec<String>,
        failures: &mut Vec<FragmentError>,
    ) {
        match self
            .registry
            .render(document, &section.component, &section.mount, &section.props)
            .await
        {
            Ok(()) => rendered.push(section.component.clone()),
            Err(e) => failures.push(e),
        }
    }
}

/// Marks navigation links whose page attribute equals `identity` as active
/// and clears the class everywhere else.
pub fn set_active_nav(document: &mut Document, settings: &NavigationSettings, identity: PageIdentity) {
    let Ok(links) = document.query_selector_all(&settings.link_selector) else {
        tracing::warn!("Invalid navigation link selector: {}", settings.link_selector);
        return;
    };
    for path in links {
        if let Some(link) = document.element_mut(&path) {
            link.remove_class(&settings.active_class);
            if link.attr(&settings.page_attribute) == Some(identity.as_str()) {
                link.add_class(&settings.active_class);
            }
        }
    }
}
