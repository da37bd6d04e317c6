//! DOM backed platform: an `<input>`/`<textarea>` overlaid on a canvas.

use glam::Vec2;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Event, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    HtmlTextAreaElement, KeyboardEvent, Node, Window,
};

use super::{NativeEvent, NativeInput, NativeInputKind, RenderSurface, SelectionRange};
use crate::error::{Result, TextInputError};
use crate::view::{Bounds, Size};

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| TextInputError::Platform("no global window".to_string()))
}

fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| TextInputError::Platform("window has no document".to_string()))
}

fn js_error(error: JsValue) -> TextInputError {
    TextInputError::Platform(format!("{error:?}"))
}

fn log_failure(action: &str, result: std::result::Result<(), JsValue>) {
    if let Err(error) = result {
        warn!(action, error = ?error, "dom text input call failed");
    }
}

#[derive(Debug, Clone)]
enum Field {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl Field {
    fn create(document: &Document, kind: NativeInputKind) -> Result<Self> {
        match kind {
            NativeInputKind::SingleLine => {
                let input = document
                    .create_element("input")
                    .map_err(js_error)?
                    .dyn_into::<HtmlInputElement>()
                    .map_err(|_| TextInputError::Platform("not an input element".to_string()))?;
                input.set_type("text");
                Ok(Field::Input(input))
            }
            NativeInputKind::MultiLine => {
                let area = document
                    .create_element("textarea")
                    .map_err(js_error)?
                    .dyn_into::<HtmlTextAreaElement>()
                    .map_err(|_| TextInputError::Platform("not a textarea element".to_string()))?;
                Ok(Field::TextArea(area))
            }
        }
    }

    fn element(&self) -> &HtmlElement {
        match self {
            Field::Input(input) => input,
            Field::TextArea(area) => area,
        }
    }

    fn value(&self) -> String {
        match self {
            Field::Input(input) => input.value(),
            Field::TextArea(area) => area.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            Field::Input(input) => input.set_value(value),
            Field::TextArea(area) => area.set_value(value),
        }
    }

    fn selection(&self) -> SelectionRange {
        let (start, end) = match self {
            Field::Input(input) => (input.selection_start(), input.selection_end()),
            Field::TextArea(area) => (area.selection_start(), area.selection_end()),
        };
        let start = start.ok().flatten().unwrap_or(0) as usize;
        let end = end.ok().flatten().unwrap_or(start as u32) as usize;
        SelectionRange { start, end }
    }

    fn set_selection(&self, range: SelectionRange) {
        let (start, end) = (range.start as u32, range.end as u32);
        let result = match self {
            Field::Input(input) => input.set_selection_range(start, end),
            Field::TextArea(area) => area.set_selection_range(start, end),
        };
        log_failure("set_selection_range", result);
    }

    fn select(&self) {
        match self {
            Field::Input(input) => input.select(),
            Field::TextArea(area) => area.select(),
        }
    }

    fn set_disabled(&self, disabled: bool) {
        match self {
            Field::Input(input) => input.set_disabled(disabled),
            Field::TextArea(area) => area.set_disabled(disabled),
        }
    }

    fn set_placeholder(&self, placeholder: &str) {
        match self {
            Field::Input(input) => input.set_placeholder(placeholder),
            Field::TextArea(area) => area.set_placeholder(placeholder),
        }
    }

    fn has_focus(&self) -> bool {
        let node: &Node = self.element();
        document()
            .ok()
            .and_then(|document| document.active_element())
            .is_some_and(|active| active.is_same_node(Some(node)))
    }
}

type Listener = (&'static str, Closure<dyn FnMut(Event)>);

/// Native element living in the page DOM.
///
/// Listeners queue [`NativeEvent`]s capturing the key code and selection at
/// the moment the browser fires them.
pub struct DomTextInput {
    field: Field,
    kind: NativeInputKind,
    events: Rc<RefCell<VecDeque<NativeEvent>>>,
    listeners: Vec<Listener>,
}

impl DomTextInput {
    pub fn new(kind: NativeInputKind) -> Result<Self> {
        let field = Field::create(&document()?, kind)?;
        let mut dom = Self {
            field,
            kind,
            events: Rc::new(RefCell::new(VecDeque::new())),
            listeners: Vec::new(),
        };
        dom.listen()?;
        Ok(dom)
    }

    pub fn element(&self) -> &HtmlElement {
        self.field.element()
    }

    fn listen(&mut self) -> Result<()> {
        let field = self.field.clone();
        let events = self.events.clone();
        self.add_listener("keydown", move |event: Event| {
            let key_code = event
                .dyn_ref::<KeyboardEvent>()
                .map(KeyboardEvent::key_code)
                .unwrap_or(0);
            events.borrow_mut().push_back(NativeEvent::KeyDown {
                key_code,
                selection: field.selection(),
            });
        })?;

        let events = self.events.clone();
        self.add_listener("keyup", move |event: Event| {
            let key_code = event
                .dyn_ref::<KeyboardEvent>()
                .map(KeyboardEvent::key_code)
                .unwrap_or(0);
            events.borrow_mut().push_back(NativeEvent::KeyUp { key_code });
        })?;

        let field = self.field.clone();
        let events = self.events.clone();
        self.add_listener("input", move |_event: Event| {
            events.borrow_mut().push_back(NativeEvent::Input {
                value: field.value(),
            });
        })?;

        let events = self.events.clone();
        self.add_listener("focus", move |_event: Event| {
            events.borrow_mut().push_back(NativeEvent::Focus);
        })?;

        let events = self.events.clone();
        self.add_listener("blur", move |_event: Event| {
            events.borrow_mut().push_back(NativeEvent::Blur);
        })
    }

    fn add_listener(
        &mut self,
        name: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<()> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        self.field
            .element()
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            .map_err(js_error)?;
        self.listeners.push((name, closure));
        Ok(())
    }
}

impl Drop for DomTextInput {
    fn drop(&mut self) {
        for (name, closure) in self.listeners.drain(..) {
            log_failure(
                "remove_event_listener",
                self.field
                    .element()
                    .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref()),
            );
        }
        self.detach();
    }
}

impl NativeInput for DomTextInput {
    fn kind(&self) -> NativeInputKind {
        self.kind
    }

    fn set_style_property(&mut self, name: &str, value: &str) {
        log_failure(
            "set_style_property",
            self.field.element().style().set_property(name, value),
        );
    }

    fn style_property(&self, name: &str) -> String {
        self.field
            .element()
            .style()
            .get_property_value(name)
            .unwrap_or_default()
    }

    fn bounding_rect(&self) -> Bounds {
        let rect = self.field.element().get_bounding_client_rect();
        Bounds::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }

    fn attach(&mut self) {
        if self.is_attached() {
            return;
        }
        match document().map(|document| document.body()) {
            Ok(Some(body)) => log_failure(
                "append_child",
                body.append_child(self.field.element()).map(|_| ()),
            ),
            Ok(None) => warn!("document has no body to attach the text input to"),
            Err(error) => warn!(%error, "cannot attach text input"),
        }
    }

    fn detach(&mut self) {
        let element = self.field.element();
        if let Some(parent) = element.parent_node() {
            log_failure("remove_child", parent.remove_child(element).map(|_| ()));
        }
    }

    fn is_attached(&self) -> bool {
        self.field.element().is_connected()
    }

    fn focus(&mut self) {
        log_failure("focus", self.field.element().focus());
    }

    fn blur(&mut self) {
        log_failure("blur", self.field.element().blur());
    }

    fn select_all(&mut self) {
        self.field.select();
    }

    fn has_focus(&self) -> bool {
        self.field.has_focus()
    }

    fn focus_later(&mut self, delay: Duration) {
        let field = self.field.clone();
        let retry = Closure::once_into_js(move || {
            if !field.has_focus() {
                let _ = field.element().focus();
            }
        });
        let scheduled = window().and_then(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    retry.unchecked_ref::<js_sys::Function>(),
                    delay.as_millis() as i32,
                )
                .map_err(js_error)
        });
        if let Err(error) = scheduled {
            warn!(%error, "cannot schedule focus retry");
        }
    }

    fn value(&self) -> String {
        self.field.value()
    }

    fn set_value(&mut self, value: &str) {
        self.field.set_value(value);
    }

    fn selection(&self) -> SelectionRange {
        self.field.selection()
    }

    fn set_selection(&mut self, range: SelectionRange) {
        self.field.set_selection(range);
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.field.set_disabled(disabled);
    }

    fn set_placeholder(&mut self, placeholder: &str) {
        self.field.set_placeholder(placeholder);
    }

    fn set_max_length(&mut self, max_length: Option<&str>) {
        let element = self.field.element();
        let result = match max_length {
            Some(max_length) => element.set_attribute("maxlength", max_length),
            None => element.remove_attribute("maxlength"),
        };
        log_failure("set_max_length", result);
    }

    fn set_secret(&mut self, secret: bool) {
        if let Field::Input(input) = &self.field {
            input.set_type(if secret { "password" } else { "text" });
        }
    }

    fn is_secret(&self) -> bool {
        match &self.field {
            Field::Input(input) => input.type_() == "password",
            Field::TextArea(_) => false,
        }
    }

    fn poll_event(&mut self) -> Option<NativeEvent> {
        self.events.borrow_mut().pop_front()
    }
}

/// A canvas element the scene is rendered into.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    /// Renderer resolution; the device pixel ratio unless overridden.
    pub resolution: f32,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let resolution = window()?.device_pixel_ratio() as f32;
        Ok(Self { canvas, resolution })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl RenderSurface for CanvasSurface {
    fn resolution(&self) -> f32 {
        self.resolution
    }

    fn client_rect(&self) -> Bounds {
        let rect = self.canvas.get_bounding_client_rect();
        Bounds::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }

    fn scroll_offset(&self) -> Vec2 {
        let Ok(window) = window() else {
            return Vec2::ZERO;
        };
        Vec2::new(
            window.scroll_x().unwrap_or(0.0) as f32,
            window.scroll_y().unwrap_or(0.0) as f32,
        )
    }

    fn render_size(&self) -> Size {
        Size::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }
}
