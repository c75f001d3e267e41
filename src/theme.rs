use crate::{
    dom::{Element, PreferenceStore},
    logging::{LogLevel, Logger},
    outcome::BestEffort,
};
use serde_json::json;
use std::rc::Rc;

pub const THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// The icon shows the theme a click switches to.
    pub fn icon_class(self) -> &'static str {
        match self {
            Self::Light => "fas fa-moon",
            Self::Dark => "fas fa-sun",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toggled {
    pub theme: Theme,
    pub persisted: BestEffort<()>,
}

pub struct ThemeController<E: Element> {
    root: E,
    icon: Option<E>,
    store: Rc<dyn PreferenceStore>,
    storage_key: String,
    logger: Logger,
}

impl<E: Element> ThemeController<E> {
    pub fn new(
        root: E,
        icon: Option<E>,
        store: Rc<dyn PreferenceStore>,
        storage_key: impl Into<String>,
        logger: Logger,
    ) -> Self {
        Self {
            root,
            icon,
            store,
            storage_key: storage_key.into(),
            logger,
        }
    }

    /// Applies the stored preference, falling back to light.
    pub fn load(&self) -> Theme {
        let theme = match self.store.read(&self.storage_key) {
            BestEffort::Applied(stored) => stored
                .as_deref()
                .and_then(Theme::from_str)
                .unwrap_or_default(),
            BestEffort::Ignored(reason) => {
                self.logger.event(
                    LogLevel::Debug,
                    "theme.storage_ignored",
                    json!({ "op": "read", "reason": reason.as_str() }),
                );
                Theme::default()
            }
        };

        self.apply(theme);
        theme
    }

    pub fn current(&self) -> Theme {
        self.root
            .attribute(THEME_ATTRIBUTE)
            .as_deref()
            .and_then(Theme::from_str)
            .unwrap_or_default()
    }

    pub fn toggle(&self) -> Toggled {
        let next = self.current().toggled();
        self.apply(next);

        let persisted = self.store.write(&self.storage_key, next.as_str());
        if let Some(reason) = persisted.ignored() {
            self.logger.event(
                LogLevel::Debug,
                "theme.storage_ignored",
                json!({ "op": "write", "reason": reason.as_str() }),
            );
        }

        Toggled {
            theme: next,
            persisted,
        }
    }

    fn apply(&self, theme: Theme) {
        self.root.set_attribute(THEME_ATTRIBUTE, theme.as_str());
        if let Some(icon) = &self.icon {
            icon.set_class_name(theme.icon_class());
        }
        self.logger.event(
            LogLevel::Debug,
            "theme.applied",
            json!({ "theme": theme.as_str() }),
        );
    }
}
