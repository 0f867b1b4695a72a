use crate::domain::model::{default_components, NavigationSettings, SiteLayout};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{
    validate_base_location, validate_non_empty_string, validate_path, validate_selector, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site: SiteSection,
    #[serde(default = "default_components")]
    pub components: BTreeMap<String, String>,
    #[serde(default)]
    pub layout: SiteLayout,
    #[serde(default)]
    pub navigation: NavigationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSection {
    pub name: String,
    /// 片段的基底目錄或 http(s) URL
    pub base: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteSection {
                name: "InnoVet".to_string(),
                base: ".".to_string(),
            },
            components: default_components(),
            layout: SiteLayout::default(),
            navigation: NavigationSettings::default(),
        }
    }
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SITE_BASE})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("site.name", &self.site.name)?;
        validate_base_location("site.base", &self.site.base)?;

        for (name, location) in &self.components {
            validate_non_empty_string("components", name)?;
            validate_path(&format!("components.{}", name), location)?;
        }

        let mut sections = vec![
            ("layout.navbar", &self.layout.navbar),
            ("layout.footer", &self.layout.footer),
        ];
        for (identity, page) in &self.layout.pages {
            for section in &page.sections {
                sections.push(("layout.pages", section));
            }
            for name in &page.preload {
                self.ensure_registered(&format!("layout.pages.{}.preload", identity), name)?;
            }
        }
        for (field, section) in sections {
            self.ensure_registered(field, &section.component)?;
            validate_selector(&format!("{}.mount", field), &section.mount)?;
        }

        if let Some(main) = &self.layout.main_selector {
            validate_selector("layout.main_selector", main)?;
        }

        let nav = &self.navigation;
        for (field, selector) in [
            ("navigation.link_selector", &nav.link_selector),
            ("navigation.menu_toggle", &nav.menu_toggle),
            ("navigation.menu", &nav.menu),
            ("navigation.navbar", &nav.navbar),
            ("navigation.anchor_selector", &nav.anchor_selector),
        ] {
            validate_selector(field, selector)?;
        }
        validate_non_empty_string("navigation.active_class", &nav.active_class)?;
        validate_non_empty_string("navigation.scrolled_class", &nav.scrolled_class)?;

        Ok(())
    }

    fn ensure_registered(&self, field: &str, component: &str) -> Result<()> {
        if self.components.contains_key(component) {
            Ok(())
        } else {
            Err(SiteError::InvalidConfigValueError {
                field: field.to_string(),
                value: component.to_string(),
                reason: "component is not registered in [components]".to_string(),
            })
        }
    }
}

impl ConfigProvider for SiteConfig {
    fn base_location(&self) -> &str {
        &self.site.base
    }

    fn components(&self) -> &BTreeMap<String, String> {
        &self.components
    }

    fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    fn navigation(&self) -> &NavigationSettings {
        &self.navigation
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
