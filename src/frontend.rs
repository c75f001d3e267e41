use crate::{
    config::Config,
    contact::{ContactForm, FormHandle, FormTransport, TransportError, TransportResponse},
    counter::{CounterAnimator, COUNTER_THRESHOLD},
    dom::{Document, Element, Notifier, PreferenceStore, ScrollBehavior},
    lazy_images::{load_lazy_images, LazyLoad},
    logging::{LogLevel, LogSink, Logger},
    navigation::NavigationController,
    outcome::{BestEffort, Ignored},
    reveal::{ObserverAction, RevealGroup, ALL_GROUPS, REVEAL_THRESHOLD},
    scroll::{ScrollTopButton, SmoothScrollRouter},
    theme::ThemeController,
    timer::{RepeatingTask, Scheduler, TimerId},
    typing::{start_typing, PHRASES},
};
use futures_util::future::LocalBoxFuture;
use gloo_net::http::Request;
use gloo_timers::callback::Timeout;
use js_sys::{Array, Reflect};
use serde_json::json;
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};
use url::Url;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    window, Event, EventTarget, FormData, HtmlElement, HtmlFormElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, NodeList, ScrollToOptions, Window,
};

#[derive(Clone)]
pub struct WebElement(HtmlElement);

impl Element for WebElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let _ = self.0.set_attribute(name, value);
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn add_class(&self, class: &str) {
        let _ = self.0.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.0.class_list().remove_1(class);
    }

    fn toggle_class(&self, class: &str) -> bool {
        self.0.class_list().toggle(class).unwrap_or(false)
    }

    fn set_class_name(&self, value: &str) {
        self.0.set_class_name(value);
    }

    fn set_style(&self, property: &str, value: &str) {
        let _ = self.0.style().set_property(property, value);
    }

    fn text(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    fn set_text(&self, value: &str) {
        self.0.set_text_content(Some(value));
    }

    fn offset_top(&self) -> f64 {
        f64::from(self.0.offset_top())
    }

    fn offset_height(&self) -> f64 {
        f64::from(self.0.offset_height())
    }
}

#[derive(Clone)]
struct WebDocument {
    window: Window,
    document: web_sys::Document,
}

impl WebDocument {
    fn query_all(&self, selector: &str) -> Vec<WebElement> {
        self.document
            .query_selector_all(selector)
            .map(html_elements)
            .unwrap_or_default()
    }

    fn query_first(&self, selector: &str) -> Option<WebElement> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
            .map(WebElement)
    }

    fn base_url(&self) -> Option<Url> {
        self.document
            .base_uri()
            .ok()
            .flatten()
            .and_then(|value| Url::parse(&value).ok())
    }
}

impl Document for WebDocument {
    type Element = WebElement;

    fn element_by_id(&self, id: &str) -> Option<WebElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
            .map(WebElement)
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match behavior {
            ScrollBehavior::Auto => web_sys::ScrollBehavior::Auto,
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn append_script(&self, src: &str) {
        let Some(body) = self.document.body() else {
            return;
        };
        if let Ok(script) = self.document.create_element("script") {
            let _ = script.set_attribute("src", src);
            let _ = body.append_child(&script);
        }
    }
}

fn html_elements(list: NodeList) -> Vec<WebElement> {
    (0..list.length())
        .filter_map(|index| list.get(index))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .map(WebElement)
        .collect()
}

struct LocalStorage(Window);

impl PreferenceStore for LocalStorage {
    fn read(&self, key: &str) -> BestEffort<Option<String>> {
        match self.0.local_storage().ok().flatten() {
            Some(storage) => storage
                .get_item(key)
                .map(BestEffort::Applied)
                .unwrap_or(BestEffort::Ignored(Ignored::StorageUnavailable)),
            None => BestEffort::Ignored(Ignored::StorageUnavailable),
        }
    }

    fn write(&self, key: &str, value: &str) -> BestEffort<()> {
        match self.0.local_storage().ok().flatten() {
            Some(storage) => storage
                .set_item(key, value)
                .map(BestEffort::Applied)
                .unwrap_or(BestEffort::Ignored(Ignored::StorageUnavailable)),
            None => BestEffort::Ignored(Ignored::StorageUnavailable),
        }
    }
}

struct WindowNotifier(Window);

impl Notifier for WindowNotifier {
    fn alert(&self, message: &str) {
        let _ = self.0.alert_with_message(message);
    }
}

struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, level: LogLevel, line: &str) {
        let line = JsValue::from_str(line);
        match level {
            LogLevel::Debug | LogLevel::Info => web_sys::console::log_1(&line),
            LogLevel::Warn => web_sys::console::warn_1(&line),
            LogLevel::Error => web_sys::console::error_1(&line),
        }
    }
}

/// Page timers backed by `gloo_timers`.
///
/// Each live `Timeout` is owned here so that clearing a timer drops its
/// callback. Timers that already fired are released on the next call, never
/// from inside their own callback.
#[derive(Default)]
struct WindowScheduler {
    next_id: Cell<i32>,
    live: RefCell<HashMap<TimerId, Timeout>>,
    fired: Rc<RefCell<Vec<TimerId>>>,
}

impl WindowScheduler {
    fn release_fired(&self) {
        let fired: Vec<TimerId> = self.fired.borrow_mut().drain(..).collect();
        let mut live = self.live.borrow_mut();
        for id in fired {
            live.remove(&id);
        }
    }
}

impl Scheduler for WindowScheduler {
    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Option<TimerId> {
        self.release_fired();

        let id = TimerId(self.next_id.get());
        self.next_id.set(self.next_id.get().wrapping_add(1));

        let fired = Rc::clone(&self.fired);
        let timeout = Timeout::new(delay_ms, move || {
            task();
            fired.borrow_mut().push(id);
        });
        self.live.borrow_mut().insert(id, timeout);
        Some(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.release_fired();
        // Dropping a `Timeout` clears it.
        self.live.borrow_mut().remove(&id);
    }
}

struct WebForm(HtmlFormElement);

impl FormHandle for WebForm {
    fn action(&self) -> Option<String> {
        self.0.get_attribute("action")
    }

    fn fields(&self) -> Vec<(String, String)> {
        let Ok(data) = FormData::new_with_form(&self.0) else {
            return Vec::new();
        };
        let Ok(Some(entries)) = js_sys::try_iter(&data) else {
            return Vec::new();
        };

        entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let pair = entry.dyn_into::<Array>().ok()?;
                let name = pair.get(0).as_string()?;
                let value = pair.get(1).as_string()?;
                Some((name, value))
            })
            .collect()
    }

    fn reset(&self) {
        self.0.reset();
    }
}

struct GlooTransport;

impl FormTransport for GlooTransport {
    fn post(
        &self,
        url: Url,
        fields: Vec<(String, String)>,
    ) -> LocalBoxFuture<'_, Result<TransportResponse, TransportError>> {
        Box::pin(async move {
            let body = FormData::new().map_err(|error| TransportError::Network(format!("{error:?}")))?;
            for (name, value) in &fields {
                let _ = body.append_with_str(name, value);
            }

            let response = Request::post(url.as_str())
                .header("Accept", "application/json")
                .body(body)
                .map_err(|error| TransportError::Network(error.to_string()))?
                .send()
                .await
                .map_err(|error| TransportError::Network(error.to_string()))?;

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Ok(TransportResponse { status, body })
        })
    }
}

fn listen(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn observe(
    elements: &[WebElement],
    threshold: f64,
    root_margin: Option<&str>,
    on_entry: impl Fn(usize, bool) -> ObserverAction + 'static,
) {
    let targets: Vec<web_sys::Element> = elements
        .iter()
        .map(|element| element.0.clone().into())
        .collect();

    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let target = entry.target();
                let Some(index) = targets.iter().position(|candidate| *candidate == target) else {
                    continue;
                };
                if on_entry(index, entry.is_intersecting()) == ObserverAction::Unobserve {
                    observer.unobserve(&target);
                }
            }
        },
    );

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    if let Some(margin) = root_margin {
        options.set_root_margin(margin);
    }

    let Ok(observer) =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
    else {
        return;
    };
    for element in elements {
        observer.observe(&element.0);
    }
    callback.forget();
}

fn skipped(logger: &Logger, reactor: &str, missing: &str) {
    logger.event(
        LogLevel::Debug,
        "reactor.skipped",
        json!({ "reactor": reactor, "missing": missing }),
    );
}

fn wire_theme(page: &WebDocument, config: &Config, logger: &Logger) {
    let Some(root) = page
        .document
        .document_element()
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        .map(WebElement)
    else {
        skipped(logger, "theme", "document element");
        return;
    };

    let toggle = page.element_by_id("themeToggle");
    let icon = toggle
        .as_ref()
        .and_then(|toggle| toggle.0.query_selector("i").ok().flatten())
        .and_then(|icon| icon.dyn_into::<HtmlElement>().ok())
        .map(WebElement);

    let controller = Rc::new(ThemeController::new(
        root,
        icon,
        Rc::new(LocalStorage(page.window.clone())),
        config.theme_storage_key.clone(),
        logger.clone(),
    ));
    controller.load();

    let Some(toggle) = toggle else {
        skipped(logger, "theme", "#themeToggle");
        return;
    };
    listen(&toggle.0, "click", move |_| {
        controller.toggle();
    });
}

fn wire_navigation(
    page: &WebDocument,
    config: &Config,
    logger: &Logger,
) -> Rc<NavigationController<WebElement>> {
    let toggle = page.element_by_id("navToggle");
    let menu = page.element_by_id("navMenu");
    if menu.is_none() {
        skipped(logger, "navigation.menu", "#navMenu");
    }

    let bars = toggle
        .as_ref()
        .and_then(|toggle| toggle.0.query_selector_all("span").ok())
        .map(html_elements)
        .unwrap_or_default();
    let links = page.query_all(".nav-link");
    let sections = page.query_all("section[id]");

    let nav = Rc::new(
        NavigationController::new(menu, bars, links.clone(), sections)
            .with_header(page.element_by_id("navbar"))
            .with_thresholds(config.spy_margin, config.header_shadow_threshold),
    );

    if let Some(toggle) = toggle {
        let nav = Rc::clone(&nav);
        listen(&toggle.0, "click", move |_| {
            nav.toggle_menu();
        });
    }

    for link in &links {
        let nav = Rc::clone(&nav);
        listen(&link.0, "click", move |_| nav.close_menu());
    }

    {
        let nav = Rc::clone(&nav);
        let scroller = page.clone();
        listen(&page.window, "scroll", move |_| {
            nav.update_active_link(scroller.scroll_y());
        });
    }
    {
        let nav = Rc::clone(&nav);
        let scroller = page.clone();
        listen(&page.window, "scroll", move |_| {
            nav.update_header_shadow(scroller.scroll_y());
        });
    }

    nav
}

fn wire_smooth_scroll(page: &WebDocument, config: &Config) {
    let router = Rc::new(SmoothScrollRouter::new(page.clone(), config.anchor_offset));

    for anchor in page.query_all(r##"a[href^="#"]"##) {
        let router = Rc::clone(&router);
        let target = anchor.clone();
        listen(&anchor.0, "click", move |event| {
            event.prevent_default();
            let href = target.attribute("href").unwrap_or_default();
            router.follow(&href);
        });
    }
}

fn wire_scroll_top(page: &WebDocument, config: &Config, logger: &Logger) {
    let Some(button) = page.element_by_id("scrollTop") else {
        skipped(logger, "scroll_top", "#scrollTop");
        return;
    };
    let scroll_top = Rc::new(ScrollTopButton::new(
        page.clone(),
        button.clone(),
        config.scroll_top_threshold,
    ));

    {
        let scroll_top = Rc::clone(&scroll_top);
        let scroller = page.clone();
        listen(&page.window, "scroll", move |_| {
            scroll_top.update_visibility(scroller.scroll_y());
        });
    }
    listen(&button.0, "click", move |_| scroll_top.scroll_to_top());
}

fn wire_reveal(page: &WebDocument, logger: &Logger) {
    for style in ALL_GROUPS {
        let elements = page.query_all(style.selector);
        if elements.is_empty() {
            skipped(logger, style.name, style.selector);
            continue;
        }

        let group = Rc::new(RevealGroup::prepare(style, elements.clone()));
        observe(&elements, REVEAL_THRESHOLD, style.root_margin, move |index, visible| {
            group.on_intersection(index, visible)
        });
    }
}

fn wire_typing(
    page: &WebDocument,
    config: &Config,
    scheduler: Rc<dyn Scheduler>,
    logger: &Logger,
) -> Option<RepeatingTask> {
    let Some(target) = page.query_first(".typing-text") else {
        skipped(logger, "typing", ".typing-text");
        return None;
    };
    start_typing(target, &PHRASES, config.typing, scheduler)
}

fn wire_counters(
    page: &WebDocument,
    config: &Config,
    scheduler: Rc<dyn Scheduler>,
    logger: &Logger,
) -> Option<Rc<CounterAnimator>> {
    let stats = page.query_all(".stat-item h3");
    if stats.is_empty() {
        skipped(logger, "counter", ".stat-item h3");
        return None;
    }

    let animator = Rc::new(CounterAnimator::new(
        scheduler,
        config.counter_interval_ms(),
        config.counter_steps,
        logger.clone(),
    ));
    {
        let animator = Rc::clone(&animator);
        let targets = stats.clone();
        observe(&stats, COUNTER_THRESHOLD, None, move |index, visible| {
            animator.on_intersection(index, &targets[index], visible)
        });
    }
    Some(animator)
}

fn wire_contact_form(page: &WebDocument, logger: &Logger) {
    let Some(form) = page
        .document
        .get_element_by_id("contactForm")
        .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
    else {
        skipped(logger, "contact", "#contactForm");
        return;
    };

    let contact = Rc::new(ContactForm::new(
        WebForm(form.clone()),
        GlooTransport,
        page.element_by_id("formStatus"),
        Rc::new(WindowNotifier(page.window.clone())),
        page.base_url(),
        logger.clone(),
    ));

    listen(&form, "submit", move |event| {
        event.prevent_default();
        let contact = Rc::clone(&contact);
        spawn_local(async move {
            contact.submit().await;
        });
    });
}

fn supports_native_lazy_loading() -> bool {
    Reflect::get(&js_sys::global(), &JsValue::from_str("HTMLImageElement"))
        .and_then(|constructor| Reflect::get(&constructor, &JsValue::from_str("prototype")))
        .and_then(|prototype| Reflect::has(&prototype, &JsValue::from_str("loading")))
        .unwrap_or(false)
}

fn wire_lazy_images(page: &WebDocument, logger: &Logger) {
    let images = page.query_all(r#"img[loading="lazy"]"#);
    match load_lazy_images(page, supports_native_lazy_loading(), &images) {
        LazyLoad::Native { promoted } => logger.event(
            LogLevel::Debug,
            "lazy_images.native",
            json!({ "promoted": promoted }),
        ),
        LazyLoad::Fallback => logger.event(LogLevel::Debug, "lazy_images.fallback", json!({})),
    }
}

fn wire_ready(page: &WebDocument, nav: Rc<NavigationController<WebElement>>, logger: &Logger) {
    let scroller = page.clone();
    let logger = logger.clone();
    let ready = move || {
        logger.event(LogLevel::Info, "page.ready", json!({}));
        nav.update_active_link(scroller.scroll_y());
    };

    let loading = Reflect::get(&page.document, &JsValue::from_str("readyState"))
        .ok()
        .and_then(|state| state.as_string())
        .map_or(false, |state| state == "loading");

    if loading {
        listen(&page.document, "DOMContentLoaded", move |_| ready());
    } else {
        ready();
    }
}

/// Timer-driven reactors that outlive `run`.
pub struct Reactors {
    typing: Option<RepeatingTask>,
    counters: Option<Rc<CounterAnimator>>,
}

impl Reactors {
    pub fn shutdown(&self) {
        if let Some(typing) = &self.typing {
            typing.cancel();
        }
        if let Some(counters) = &self.counters {
            counters.cancel_all();
        }
    }
}

pub fn run() -> Option<Reactors> {
    let window = window()?;
    let document = window.document()?;

    let config = Config::from_lookup(|name| document.body().and_then(|body| body.get_attribute(name)));
    let logger = Logger::new(config.log_level, Rc::new(ConsoleSink));
    let page = WebDocument {
        window,
        document,
    };
    let scheduler: Rc<dyn Scheduler> = Rc::new(WindowScheduler::default());

    wire_theme(&page, &config, &logger);
    let nav = wire_navigation(&page, &config, &logger);
    wire_smooth_scroll(&page, &config);
    wire_scroll_top(&page, &config, &logger);
    wire_reveal(&page, &logger);
    let typing = wire_typing(&page, &config, Rc::clone(&scheduler), &logger);
    let counters = wire_counters(&page, &config, scheduler, &logger);
    wire_contact_form(&page, &logger);
    wire_lazy_images(&page, &logger);
    wire_ready(&page, nav, &logger);

    Some(Reactors { typing, counters })
}
