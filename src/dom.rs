//! Handles the reactors are built from.
//!
//! Every reactor receives the elements and browser services it touches at
//! construction time. The browser implementations live in `frontend`; the
//! test fakes live in `testing`.

use crate::outcome::BestEffort;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

pub trait Element: Clone + 'static {
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);

    fn has_class(&self, class: &str) -> bool;
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    /// Returns whether the class is present afterwards.
    fn toggle_class(&self, class: &str) -> bool;
    fn set_class_name(&self, value: &str);

    fn set_style(&self, property: &str, value: &str);

    fn text(&self) -> String;
    fn set_text(&self, value: &str);

    fn offset_top(&self) -> f64;
    fn offset_height(&self) -> f64;

    fn id(&self) -> Option<String> {
        self.attribute("id").filter(|value| !value.is_empty())
    }
}

pub trait Document: Clone + 'static {
    type Element: Element;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
    fn scroll_y(&self) -> f64;
    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);
    /// Appends `<script src=...>` to the body.
    fn append_script(&self, src: &str);
}

pub trait PreferenceStore {
    fn read(&self, key: &str) -> BestEffort<Option<String>>;
    fn write(&self, key: &str, value: &str) -> BestEffort<()>;
}

pub trait Notifier {
    fn alert(&self, message: &str);
}
