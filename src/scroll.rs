use crate::dom::{Document, Element, ScrollBehavior};

#[derive(Clone, Debug, PartialEq)]
pub enum AnchorOutcome {
    /// The bare `#` link.
    EmptyFragment,
    /// `href` did not start with `#`; the router leaves it alone.
    NotInPage,
    MissingTarget(String),
    Scrolled { target: String, top: f64 },
}

/// Smooth scrolling for in-page anchors, clearing the fixed header.
pub struct SmoothScrollRouter<D: Document> {
    document: D,
    offset: f64,
}

impl<D: Document> SmoothScrollRouter<D> {
    pub fn new(document: D, offset: f64) -> Self {
        Self { document, offset }
    }

    /// Handles an anchor activation whose default navigation was already
    /// suppressed.
    pub fn follow(&self, href: &str) -> AnchorOutcome {
        let Some(id) = href.strip_prefix('#') else {
            return AnchorOutcome::NotInPage;
        };
        if id.is_empty() {
            return AnchorOutcome::EmptyFragment;
        }

        let Some(target) = self.document.element_by_id(id) else {
            return AnchorOutcome::MissingTarget(id.to_string());
        };

        let top = target.offset_top() - self.offset;
        self.document.scroll_to(top, ScrollBehavior::Smooth);
        AnchorOutcome::Scrolled {
            target: id.to_string(),
            top,
        }
    }
}

pub struct ScrollTopButton<D: Document> {
    document: D,
    button: D::Element,
    threshold: f64,
}

impl<D: Document> ScrollTopButton<D> {
    pub fn new(document: D, button: D::Element, threshold: f64) -> Self {
        Self {
            document,
            button,
            threshold,
        }
    }

    /// Returns whether the button is shown.
    pub fn update_visibility(&self, scroll_y: f64) -> bool {
        let visible = scroll_y > self.threshold;
        self.button
            .set_style("display", if visible { "flex" } else { "none" });
        visible
    }

    pub fn scroll_to_top(&self) {
        self.document.scroll_to(0.0, ScrollBehavior::Smooth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDocument, FakeElement};

    #[test]
    fn anchor_scrolls_to_target_minus_header_offset() {
        let document = FakeDocument::new();
        document.insert(FakeElement::with_id("projects").bounds(900.0, 400.0));
        let router = SmoothScrollRouter::new(document.clone(), 80.0);

        let outcome = router.follow("#projects");

        assert_eq!(
            outcome,
            AnchorOutcome::Scrolled {
                target: "projects".to_string(),
                top: 820.0
            }
        );
        assert_eq!(document.scrolls(), vec![(820.0, ScrollBehavior::Smooth)]);
    }

    #[test]
    fn bare_fragment_and_missing_targets_do_not_scroll() {
        let document = FakeDocument::new();
        let router = SmoothScrollRouter::new(document.clone(), 80.0);

        assert_eq!(router.follow("#"), AnchorOutcome::EmptyFragment);
        assert_eq!(
            router.follow("#nowhere"),
            AnchorOutcome::MissingTarget("nowhere".to_string())
        );
        assert_eq!(router.follow("/resume.pdf"), AnchorOutcome::NotInPage);
        assert!(document.scrolls().is_empty());
    }

    #[test]
    fn target_near_top_produces_negative_offset() {
        let document = FakeDocument::new();
        document.insert(FakeElement::with_id("home").bounds(20.0, 400.0));
        let router = SmoothScrollRouter::new(document.clone(), 80.0);

        router.follow("#home");

        assert_eq!(document.scrolls(), vec![(-60.0, ScrollBehavior::Smooth)]);
    }

    #[test]
    fn scroll_top_button_tracks_threshold() {
        let document = FakeDocument::new();
        let button = FakeElement::with_id("scrollTop");
        let scroll_top = ScrollTopButton::new(document.clone(), button.clone(), 300.0);

        assert!(!scroll_top.update_visibility(300.0));
        assert_eq!(button.style("display").as_deref(), Some("none"));
        assert!(scroll_top.update_visibility(301.0));
        assert_eq!(button.style("display").as_deref(), Some("flex"));

        document.set_scroll_y(1_200.0);
        scroll_top.scroll_to_top();
        assert_eq!(document.scrolls(), vec![(0.0, ScrollBehavior::Smooth)]);
    }
}
