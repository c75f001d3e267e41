use crate::dom::Element;

pub const OPEN_CLASS: &str = "active";
pub const ACTIVE_LINK_CLASS: &str = "active";
pub const HEADER_SHADOW: &str = "0 4px 6px -1px rgba(0, 0, 0, 0.1)";

const BAR_OPEN_STYLES: [(&str, &str); 3] = [
    ("transform", "rotate(45deg) translateY(8px)"),
    ("opacity", "0"),
    ("transform", "rotate(-45deg) translateY(-8px)"),
];
const BAR_CLOSED_STYLES: [(&str, &str); 3] = [
    ("transform", "none"),
    ("opacity", "1"),
    ("transform", "none"),
];

/// Mobile menu, scroll-spy and header shadow.
pub struct NavigationController<E: Element> {
    menu: Option<E>,
    bars: Vec<E>,
    links: Vec<E>,
    sections: Vec<E>,
    header: Option<E>,
    spy_margin: f64,
    header_shadow_threshold: f64,
}

impl<E: Element> NavigationController<E> {
    pub fn new(menu: Option<E>, bars: Vec<E>, links: Vec<E>, sections: Vec<E>) -> Self {
        Self {
            menu,
            bars,
            links,
            sections,
            header: None,
            spy_margin: 100.0,
            header_shadow_threshold: 50.0,
        }
    }

    pub fn with_header(mut self, header: Option<E>) -> Self {
        self.header = header;
        self
    }

    pub fn with_thresholds(mut self, spy_margin: f64, header_shadow_threshold: f64) -> Self {
        self.spy_margin = spy_margin;
        self.header_shadow_threshold = header_shadow_threshold;
        self
    }

    pub fn is_open(&self) -> bool {
        self.menu
            .as_ref()
            .map_or(false, |menu| menu.has_class(OPEN_CLASS))
    }

    /// Returns whether the menu is open afterwards.
    pub fn toggle_menu(&self) -> bool {
        let Some(menu) = &self.menu else {
            return false;
        };
        let open = menu.toggle_class(OPEN_CLASS);
        self.style_bars(open);
        open
    }

    pub fn close_menu(&self) {
        if let Some(menu) = &self.menu {
            menu.remove_class(OPEN_CLASS);
        }
        self.style_bars(false);
    }

    fn style_bars(&self, open: bool) {
        let styles = if open { BAR_OPEN_STYLES } else { BAR_CLOSED_STYLES };
        for (bar, (property, value)) in self.bars.iter().zip(styles) {
            bar.set_style(property, value);
        }
    }

    /// Highlights the link of the section under `scroll_y + margin`.
    ///
    /// Sections are visited in document order and every match re-highlights,
    /// so with overlapping sections the last match wins. Returns the id of the
    /// highlighted section, if any matched.
    pub fn update_active_link(&self, scroll_y: f64) -> Option<String> {
        let position = scroll_y + self.spy_margin;
        let mut active = None;

        for section in &self.sections {
            let Some(id) = section.id() else {
                continue;
            };
            let top = section.offset_top();
            let bottom = top + section.offset_height();

            if position >= top && position < bottom {
                for link in &self.links {
                    link.remove_class(ACTIVE_LINK_CLASS);
                }
                if let Some(link) = self.link_for(&id) {
                    link.add_class(ACTIVE_LINK_CLASS);
                }
                active = Some(id);
            }
        }

        active
    }

    fn link_for(&self, id: &str) -> Option<&E> {
        let href = format!("#{id}");
        self.links
            .iter()
            .find(|link| link.attribute("href").as_deref() == Some(href.as_str()))
    }

    /// Returns whether the shadow is shown.
    pub fn update_header_shadow(&self, scroll_y: f64) -> bool {
        let raised = scroll_y > self.header_shadow_threshold;
        if let Some(header) = &self.header {
            header.set_style("box-shadow", if raised { HEADER_SHADOW } else { "none" });
        }
        raised
    }
}
