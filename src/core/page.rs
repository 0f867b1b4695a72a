use crate::core::behaviors::{Event, EventKind, EventOutcome, Listener, ListenerTarget};
use crate::markup::{Document, Selector};
use crate::utils::error::{Result, SiteError};

/// A host page: its markup plus the listeners attached to it.
#[derive(Debug, Clone, Default)]
pub struct Page {
    document: Document,
    listeners: Vec<Listener>,
}

impl Page {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            listeners: Vec::new(),
        }
    }

    pub fn parse(html: &str) -> Result<Self> {
        Ok(Self::new(Document::parse(html)?))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    /// Attaches a listener unless an equal one is already attached.
    pub fn attach(&mut self, listener: Listener) -> bool {
        if self.listeners.contains(&listener) {
            tracing::debug!("Listener already attached: {:?}", listener.behavior);
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Clicks the first element matching `selector`. The event bubbles from the
    /// element up through its ancestors.
    pub fn click(&mut self, selector: &str) -> Result<EventOutcome> {
        let target = self
            .document
            .query_selector(selector)?
            .ok_or_else(|| SiteError::selector(selector, "no element matches"))?;

        let mut outcome = EventOutcome::default();
        let event = Event::Click {
            target: target.clone(),
        };
        let listeners = self.listeners.clone();

        for depth in (1..=target.len()).rev() {
            let current = &target[..depth];
            for listener in listeners.iter().filter(|l| l.event == EventKind::Click) {
                let ListenerTarget::Elements(listener_selector) = &listener.target else {
                    continue;
                };
                let Ok(parsed) = Selector::parse(listener_selector) else {
                    continue;
                };
                let matched = self
                    .document
                    .element(current)
                    .is_some_and(|el| parsed.matches(el));
                if matched {
                    listener
                        .behavior
                        .apply(&mut self.document, &event, Some(current), &mut outcome);
                }
            }
        }

        Ok(outcome)
    }

    /// Dispatches a window scroll to vertical offset `y`.
    pub fn scroll(&mut self, y: u32) -> EventOutcome {
        let mut outcome = EventOutcome::default();
        let event = Event::Scroll { y };
        let listeners = self.listeners.clone();
        for listener in listeners
            .iter()
            .filter(|l| l.event == EventKind::Scroll && l.target == ListenerTarget::Window)
        {
            listener
                .behavior
                .apply(&mut self.document, &event, None, &mut outcome);
        }
        outcome
    }

    pub fn to_html(&self) -> String {
        self.document.to_html()
    }
}
