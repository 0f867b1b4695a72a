use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

pub type ComponentName = String;
pub type ComponentSource = String;

/// 單次渲染的佔位符替換值
pub type PropertyMap = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageIdentity {
    Home,
    About,
    Services,
    Activities,
    Team,
    Contact,
}

impl PageIdentity {
    /// Matched in order against the navigation path; first hit wins.
    pub const MATCH_ORDER: [PageIdentity; 5] = [
        PageIdentity::About,
        PageIdentity::Services,
        PageIdentity::Activities,
        PageIdentity::Team,
        PageIdentity::Contact,
    ];

    pub fn from_path(path: &str) -> Self {
        Self::MATCH_ORDER
            .into_iter()
            .find(|identity| path.contains(identity.as_str()))
            .unwrap_or(PageIdentity::Home)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageIdentity::Home => "home",
            PageIdentity::About => "about",
            PageIdentity::Services => "services",
            PageIdentity::Activities => "activities",
            PageIdentity::Team => "team",
            PageIdentity::Contact => "contact",
        }
    }
}

impl fmt::Display for PageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageIdentity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(PageIdentity::Home),
            other => Self::MATCH_ORDER
                .into_iter()
                .find(|identity| identity.as_str() == other)
                .ok_or_else(|| format!("unknown page identity: {}", other)),
        }
    }
}

/// 一個渲染指令：把元件放進掛載點
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub component: ComponentName,
    pub mount: String,
    #[serde(default)]
    pub props: PropertyMap,
}

impl Section {
    pub fn new(component: &str, mount: &str) -> Self {
        Self {
            component: component.to_string(),
            mount: mount.to_string(),
            props: PropertyMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Loaded alongside the sections but not rendered.
    #[serde(default)]
    pub preload: Vec<ComponentName>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl PageLayout {
    /// Every component this page loads, sections first.
    pub fn components(&self) -> Vec<ComponentName> {
        let mut names: Vec<ComponentName> =
            self.sections.iter().map(|s| s.component.clone()).collect();
        for name in &self.preload {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteLayout {
    pub navbar: Section,
    pub footer: Section,
    pub main_selector: Option<String>,
    pub pages: BTreeMap<PageIdentity, PageLayout>,
}

impl SiteLayout {
    pub fn page(&self, identity: PageIdentity) -> Option<&PageLayout> {
        self.pages.get(&identity)
    }
}

impl Default for SiteLayout {
    fn default() -> Self {
        let single = |component: &str, mount: &str| PageLayout {
            preload: Vec::new(),
            sections: vec![Section::new(component, mount)],
        };

        let mut pages = BTreeMap::new();
        pages.insert(
            PageIdentity::Home,
            PageLayout {
                // activities 目前仍是頁面內的靜態區塊，只預先載入
                preload: vec!["activities-section".to_string()],
                sections: vec![
                    Section::new("hero", "#hero-container"),
                    Section::new("about-section", "#about-container"),
                    Section::new("services-section", "#services-container"),
                ],
            },
        );
        pages.insert(PageIdentity::About, single("about-section", "#about-container"));
        pages.insert(
            PageIdentity::Services,
            single("services-section", "#services-container"),
        );
        pages.insert(
            PageIdentity::Activities,
            single("activities-section", "#activities-container"),
        );

        Self {
            navbar: Section::new("navbar", "#navbar-container"),
            footer: Section::new("footer", "#footer-container"),
            main_selector: Some("#main-content".to_string()),
            pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    pub link_selector: String,
    pub page_attribute: String,
    pub active_class: String,
    pub menu_toggle: String,
    pub menu: String,
    pub navbar: String,
    pub scrolled_class: String,
    pub scroll_threshold: u32,
    pub anchor_selector: String,
    pub scroll_offset: u32,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            link_selector: ".nav-link".to_string(),
            page_attribute: "data-page".to_string(),
            active_class: "active".to_string(),
            menu_toggle: "#mobile-menu".to_string(),
            menu: "#nav-menu".to_string(),
            navbar: "#navbar".to_string(),
            scrolled_class: "scrolled".to_string(),
            scroll_threshold: 50,
            anchor_selector: "a[href^=\"#\"]".to_string(),
            scroll_offset: 70,
        }
    }
}

/// The site's registration table: every component lives under `components/`.
pub fn default_components() -> BTreeMap<ComponentName, ComponentSource> {
    [
        "navbar",
        "footer",
        "hero",
        "about-section",
        "services-section",
        "activities-section",
        "page-header",
    ]
    .into_iter()
    .map(|name| (name.to_string(), format!("components/{}.html", name)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_identity_from_path() {
        assert_eq!(PageIdentity::from_path("/services/index.html"), PageIdentity::Services);
        assert_eq!(PageIdentity::from_path("/about-us"), PageIdentity::About);
        assert_eq!(PageIdentity::from_path("/"), PageIdentity::Home);
        assert_eq!(PageIdentity::from_path("/team.html"), PageIdentity::Team);
        assert_eq!(PageIdentity::from_path("/contact"), PageIdentity::Contact);
        assert_eq!(PageIdentity::from_path("index.html"), PageIdentity::Home);
    }

    #[test]
    fn test_page_identity_first_match_wins() {
        // about 排在 services 前面
        assert_eq!(
            PageIdentity::from_path("/services/about"),
            PageIdentity::About
        );
        assert_eq!(
            PageIdentity::from_path("/Services"),
            PageIdentity::Home
        );
    }

    #[test]
    fn test_page_identity_round_trips_through_str() {
        for identity in [PageIdentity::Home, PageIdentity::Activities] {
            assert_eq!(identity.as_str().parse::<PageIdentity>(), Ok(identity));
        }
        assert!("blog".parse::<PageIdentity>().is_err());
    }

    #[test]
    fn test_default_layout_matches_registration_table() {
        let layout = SiteLayout::default();
        let components = default_components();

        assert!(components.contains_key(&layout.navbar.component));
        assert!(components.contains_key(&layout.footer.component));
        for page in layout.pages.values() {
            for name in page.components() {
                assert!(components.contains_key(&name), "{} is not registered", name);
            }
        }
        assert!(layout.page(PageIdentity::Team).is_none());
        assert!(layout.page(PageIdentity::Contact).is_none());

        let home = layout.page(PageIdentity::Home).unwrap();
        assert_eq!(
            home.components(),
            vec!["hero", "about-section", "services-section", "activities-section"]
        );
    }
}
