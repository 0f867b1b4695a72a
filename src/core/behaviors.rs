use crate::domain::model::NavigationSettings;
use crate::markup::{Document, NodePath};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    Click,
    Scroll,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ListenerTarget {
    Window,
    Elements(String),
}

/// 頁面層級的互動行為
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Behavior {
    ToggleMenu {
        toggle: String,
        menu: String,
        class: String,
    },
    CloseMenu {
        toggle: String,
        menu: String,
        class: String,
    },
    SmoothScroll {
        offset: u32,
    },
    NavbarScroll {
        navbar: String,
        class: String,
        threshold: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listener {
    pub event: EventKind,
    pub target: ListenerTarget,
    pub behavior: Behavior,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Click { target: NodePath },
    Scroll { y: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrollRequest {
    pub selector: String,
    #[serde(skip)]
    pub target: NodePath,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventOutcome {
    pub default_prevented: bool,
    pub scroll_to: Option<ScrollRequest>,
}

/// The listeners a composed page gets: mobile menu toggle (only when both the
/// toggle and the menu exist), menu close on navigation, smooth scrolling for
/// in-page anchors and the navbar scroll style.
pub fn page_listeners(settings: &NavigationSettings, document: &Document) -> Vec<Listener> {
    let mut listeners = Vec::new();

    let has = |selector: &str| matches!(document.query_selector(selector), Ok(Some(_)));
    if has(&settings.menu_toggle) && has(&settings.menu) {
        listeners.push(Listener {
            event: EventKind::Click,
            target: ListenerTarget::Elements(settings.menu_toggle.clone()),
            behavior: Behavior::ToggleMenu {
                toggle: settings.menu_toggle.clone(),
                menu: settings.menu.clone(),
                class: settings.active_class.clone(),
            },
        });
        listeners.push(Listener {
            event: EventKind::Click,
            target: ListenerTarget::Elements(settings.link_selector.clone()),
            behavior: Behavior::CloseMenu {
                toggle: settings.menu_toggle.clone(),
                menu: settings.menu.clone(),
                class: settings.active_class.clone(),
            },
        });
    }

    listeners.push(Listener {
        event: EventKind::Click,
        target: ListenerTarget::Elements(settings.anchor_selector.clone()),
        behavior: Behavior::SmoothScroll {
            offset: settings.scroll_offset,
        },
    });

    listeners.push(Listener {
        event: EventKind::Scroll,
        target: ListenerTarget::Window,
        behavior: Behavior::NavbarScroll {
            navbar: settings.navbar.clone(),
            class: settings.scrolled_class.clone(),
            threshold: settings.scroll_threshold,
        },
    });

    listeners
}

impl Behavior {
    pub fn apply(
        &self,
        document: &mut Document,
        event: &Event,
        current_target: Option<&[usize]>,
        outcome: &mut EventOutcome,
    ) {
        match self {
            Behavior::ToggleMenu {
                toggle,
                menu,
                class,
            } => {
                for selector in [toggle, menu] {
                    with_first(document, selector, |el| {
                        el.toggle_class(class);
                    });
                }
            }
            Behavior::CloseMenu {
                toggle,
                menu,
                class,
            } => {
                for selector in [toggle, menu] {
                    with_first(document, selector, |el| el.remove_class(class));
                }
            }
            Behavior::SmoothScroll { offset } => {
                let Some(href) = current_target
                    .and_then(|path| document.element(path))
                    .and_then(|el| el.attr("href"))
                    .map(str::to_string)
                else {
                    return;
                };
                outcome.default_prevented = true;
                // href 為 "#" 時不是合法選擇器，只阻止預設行為
                if let Ok(Some(target)) = document.query_selector(&href) {
                    outcome.scroll_to = Some(ScrollRequest {
                        selector: href,
                        target,
                        offset: *offset,
                    });
                }
            }
            Behavior::NavbarScroll {
                navbar,
                class,
                threshold,
            } => {
                let Event::Scroll { y } = event else {
                    return;
                };
                let scrolled = *y > *threshold;
                with_first(document, navbar, |el| {
                    if scrolled {
                        el.add_class(class);
                    } else {
                        el.remove_class(class);
                    }
                });
            }
        }
    }
}

fn with_first<F>(document: &mut Document, selector: &str, f: F)
where
    F: FnOnce(&mut crate::markup::Element),
{
    if let Ok(Some(path)) = document.query_selector(selector) {
        if let Some(element) = document.element_mut(&path) {
            f(element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_menu_listeners_need_both_elements() {
        let settings = NavigationSettings::default();

        let full = Document::parse(
            r#"<div id="mobile-menu"></div><ul id="nav-menu"></ul><nav id="navbar"></nav>"#,
        )
        .unwrap();
        let listeners = page_listeners(&settings, &full);
        assert_eq!(listeners.len(), 4);

        let no_menu = Document::parse(r#"<div id="mobile-menu"></div>"#).unwrap();
        let listeners = page_listeners(&settings, &no_menu);
        assert_eq!(listeners.len(), 2);
        assert!(listeners
            .iter()
            .all(|l| !matches!(l.behavior, Behavior::ToggleMenu { .. })));
    }

    #[test]
    fn test_navbar_scroll_threshold() {
        let mut doc = Document::parse(r#"<nav id="navbar" class="navbar"></nav>"#).unwrap();
        let behavior = Behavior::NavbarScroll {
            navbar: "#navbar".to_string(),
            class: "scrolled".to_string(),
            threshold: 50,
        };
        let mut outcome = EventOutcome::default();

        behavior.apply(&mut doc, &Event::Scroll { y: 50 }, None, &mut outcome);
        assert_eq!(doc.to_html(), r#"<nav id="navbar" class="navbar"></nav>"#);

        behavior.apply(&mut doc, &Event::Scroll { y: 51 }, None, &mut outcome);
        assert_eq!(doc.to_html(), r#"<nav id="navbar" class="navbar scrolled"></nav>"#);

        behavior.apply(&mut doc, &Event::Scroll { y: 0 }, None, &mut outcome);
        assert_eq!(doc.to_html(), r#"<nav id="navbar" class="navbar"></nav>"#);
        assert_eq!(outcome, EventOutcome::default());
    }
}
