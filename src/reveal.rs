//! Fade-in of page blocks as they scroll into view.

use crate::dom::Element;
use std::cell::RefCell;

pub const REVEAL_THRESHOLD: f64 = 0.1;

/// Whether the visibility observer should keep watching an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObserverAction {
    Keep,
    Unobserve,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealStyle {
    pub name: &'static str,
    pub selector: &'static str,
    pub hidden_transform: &'static str,
    pub shown_transform: &'static str,
    pub duration_ms: u32,
    pub stagger_ms: Option<u32>,
    pub root_margin: Option<&'static str>,
}

pub const SECTIONS: RevealStyle = RevealStyle {
    name: "sections",
    selector: ".section",
    hidden_transform: "translateY(30px)",
    shown_transform: "translateY(0)",
    duration_ms: 600,
    stagger_ms: None,
    root_margin: Some("0px 0px -50px 0px"),
};

pub const PROJECT_CARDS: RevealStyle = RevealStyle {
    name: "project_cards",
    selector: ".project-card",
    hidden_transform: "translateY(30px)",
    shown_transform: "translateY(0)",
    duration_ms: 500,
    stagger_ms: Some(100),
    root_margin: None,
};

pub const SKILL_CATEGORIES: RevealStyle = RevealStyle {
    name: "skill_categories",
    selector: ".skill-category",
    hidden_transform: "scale(0.9)",
    shown_transform: "scale(1)",
    duration_ms: 500,
    stagger_ms: Some(100),
    root_margin: None,
};

pub const TIMELINE_ITEMS: RevealStyle = RevealStyle {
    name: "timeline_items",
    selector: ".timeline-item",
    hidden_transform: "translateX(-30px)",
    shown_transform: "translateX(0)",
    duration_ms: 600,
    stagger_ms: Some(200),
    root_margin: None,
};

pub const ALL_GROUPS: [RevealStyle; 4] = [SECTIONS, PROJECT_CARDS, SKILL_CATEGORIES, TIMELINE_ITEMS];

impl RevealStyle {
    pub fn transition(&self, index: usize) -> String {
        let duration = seconds(self.duration_ms);
        match self.stagger_ms {
            Some(stagger) => {
                let delay = seconds(stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX)));
                format!("opacity {duration} ease {delay}, transform {duration} ease {delay}")
            }
            None => format!("opacity {duration} ease, transform {duration} ease"),
        }
    }
}

fn seconds(ms: u32) -> String {
    format!("{}s", f64::from(ms) / 1000.0)
}

pub struct RevealGroup<E: Element> {
    style: RevealStyle,
    elements: Vec<E>,
    revealed: RefCell<Vec<bool>>,
}

impl<E: Element> RevealGroup<E> {
    /// Hides every element and sets its staggered transition.
    pub fn prepare(style: RevealStyle, elements: Vec<E>) -> Self {
        for (index, element) in elements.iter().enumerate() {
            element.set_style("opacity", "0");
            element.set_style("transform", style.hidden_transform);
            element.set_style("transition", &style.transition(index));
        }

        let revealed = RefCell::new(vec![false; elements.len()]);
        Self {
            style,
            elements,
            revealed,
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.borrow().get(index).copied().unwrap_or(false)
    }

    /// Reacts to one observer entry for the element at `index`.
    pub fn on_intersection(&self, index: usize, is_intersecting: bool) -> ObserverAction {
        if !is_intersecting {
            return ObserverAction::Keep;
        }
        let Some(element) = self.elements.get(index) else {
            return ObserverAction::Unobserve;
        };

        let mut revealed = self.revealed.borrow_mut();
        if !revealed[index] {
            element.set_style("opacity", "1");
            element.set_style("transform", self.style.shown_transform);
            revealed[index] = true;
        }
        ObserverAction::Unobserve
    }
}
