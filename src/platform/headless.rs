//! In-memory platform used by native hosts without a DOM and by tests.

use glam::{Affine2, Vec2};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use super::{
    NativeEvent, NativeInput, NativeInputKind, RenderSurface, SceneNode, SelectionRange,
};
use crate::style::parse_css_number;
use crate::view::{Bounds, Size, parse_css_matrix};

const DEFAULT_WIDTH: f32 = 150.0;
const DEFAULT_HEIGHT: f32 = 20.0;
const DEFAULT_TEXTAREA_HEIGHT: f32 = 40.0;

#[derive(Debug)]
struct HeadlessState {
    kind: NativeInputKind,
    styles: BTreeMap<String, String>,
    style_writes: usize,
    attached: bool,
    focused: bool,
    value: String,
    selection: SelectionRange,
    disabled: bool,
    placeholder: String,
    max_length: Option<String>,
    secret: bool,
    events: VecDeque<NativeEvent>,
    pending_focus: Option<Duration>,
    failing_focus: usize,
    focus_attempts: usize,
}

/// Native element double backed by shared state, so a test can keep a handle
/// after moving one into a widget.
#[derive(Debug, Clone)]
pub struct HeadlessInput {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessInput {
    pub fn new(kind: NativeInputKind) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState {
                kind,
                styles: BTreeMap::new(),
                style_writes: 0,
                attached: false,
                focused: false,
                value: String::new(),
                selection: SelectionRange::default(),
                disabled: false,
                placeholder: String::new(),
                max_length: None,
                secret: false,
                events: VecDeque::new(),
                pending_focus: None,
                failing_focus: 0,
                focus_attempts: 0,
            })),
        }
    }

    pub fn single_line() -> Self {
        Self::new(NativeInputKind::SingleLine)
    }

    pub fn multi_line() -> Self {
        Self::new(NativeInputKind::MultiLine)
    }

    pub fn style(&self, name: &str) -> Option<String> {
        self.state.borrow().styles.get(name).cloned()
    }

    /// Number of style mutations so far. Tests use it to observe skipped passes.
    pub fn style_writes(&self) -> usize {
        self.state.borrow().style_writes
    }

    pub fn is_displayed(&self) -> bool {
        let state = self.state.borrow();
        state.attached && state.styles.get("display").is_none_or(|display| display != "none")
    }

    pub fn is_disabled(&self) -> bool {
        self.state.borrow().disabled
    }

    pub fn placeholder(&self) -> String {
        self.state.borrow().placeholder.clone()
    }

    pub fn max_length(&self) -> Option<String> {
        self.state.borrow().max_length.clone()
    }

    pub fn focus_attempts(&self) -> usize {
        self.state.borrow().focus_attempts
    }

    /// The next `count` focus attempts will not take.
    pub fn fail_next_focus(&self, count: usize) {
        self.state.borrow_mut().failing_focus = count;
    }

    pub fn pending_focus_retry(&self) -> Option<Duration> {
        self.state.borrow().pending_focus
    }

    /// Fires the scheduled focus retry, if any. Returns whether one was pending.
    pub fn run_deferred(&self) -> bool {
        let pending = self.state.borrow_mut().pending_focus.take();
        if pending.is_none() {
            return false;
        }
        if !self.state.borrow().focused {
            let mut handle = self.clone();
            handle.focus();
        }
        true
    }

    /// Queues an event as if the platform had fired it.
    pub fn push_event(&self, event: NativeEvent) {
        self.state.borrow_mut().events.push_back(event);
    }

    pub fn queued_events(&self) -> usize {
        self.state.borrow().events.len()
    }

    /// Types characters at the current selection, queuing the same
    /// keydown/input/keyup sequence a browser fires per keystroke.
    pub fn type_text(&self, text: &str) {
        let mut state = self.state.borrow_mut();
        for ch in text.chars() {
            let selection = state.selection;
            let key_code = ch.to_ascii_uppercase() as u32;
            state.events.push_back(NativeEvent::KeyDown {
                key_code,
                selection,
            });

            let length = state.value.chars().count();
            let at_limit = state
                .max_length
                .as_deref()
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .is_some_and(|max| length - (selection.end - selection.start) >= max);
            if !at_limit {
                let mut chars: Vec<char> = state.value.chars().collect();
                let start = selection.start.min(chars.len());
                let end = selection.end.clamp(start, chars.len());
                chars.drain(start..end);
                chars.insert(start, ch);
                state.value = chars.into_iter().collect();
                state.selection = SelectionRange::caret(start + 1);
                let value = state.value.clone();
                state.events.push_back(NativeEvent::Input { value });
            }

            state.events.push_back(NativeEvent::KeyUp { key_code });
        }
    }

    fn resolved_size(state: &HeadlessState) -> Size {
        let width = state
            .styles
            .get("width")
            .and_then(|raw| parse_css_number(raw))
            .unwrap_or(DEFAULT_WIDTH);
        let height = state
            .styles
            .get("height")
            .and_then(|raw| parse_css_number(raw))
            .unwrap_or(match state.kind {
                NativeInputKind::SingleLine => DEFAULT_HEIGHT,
                NativeInputKind::MultiLine => DEFAULT_TEXTAREA_HEIGHT,
            });
        Size::new(width, height)
    }
}

impl NativeInput for HeadlessInput {
    fn kind(&self) -> NativeInputKind {
        self.state.borrow().kind
    }

    fn set_style_property(&mut self, name: &str, value: &str) {
        let mut state = self.state.borrow_mut();
        state.style_writes += 1;
        if value.is_empty() {
            state.styles.remove(name);
        } else {
            state.styles.insert(name.to_string(), value.to_string());
        }
    }

    fn style_property(&self, name: &str) -> String {
        self.state
            .borrow()
            .styles
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn bounding_rect(&self) -> Bounds {
        if !self.is_displayed() {
            return Bounds::ZERO;
        }
        let state = self.state.borrow();
        let size = Self::resolved_size(&state);
        let origin = Vec2::new(
            state
                .styles
                .get("left")
                .and_then(|raw| parse_css_number(raw))
                .unwrap_or(0.0),
            state
                .styles
                .get("top")
                .and_then(|raw| parse_css_number(raw))
                .unwrap_or(0.0),
        );
        let transform = state
            .styles
            .get("transform")
            .and_then(|raw| parse_css_matrix(raw))
            .unwrap_or(Affine2::IDENTITY);
        let corners = [
            transform.transform_point2(Vec2::ZERO),
            transform.transform_point2(Vec2::new(size.width, 0.0)),
            transform.transform_point2(Vec2::new(0.0, size.height)),
            transform.transform_point2(Vec2::new(size.width, size.height)),
        ];
        let min = corners.iter().copied().reduce(Vec2::min).unwrap_or(Vec2::ZERO);
        let max = corners.iter().copied().reduce(Vec2::max).unwrap_or(Vec2::ZERO);
        Bounds::new(origin.x + min.x, origin.y + min.y, max.x - min.x, max.y - min.y)
    }

    fn attach(&mut self) {
        self.state.borrow_mut().attached = true;
    }

    fn detach(&mut self) {
        let mut state = self.state.borrow_mut();
        state.attached = false;
        if state.focused {
            state.focused = false;
            state.events.push_back(NativeEvent::Blur);
        }
    }

    fn is_attached(&self) -> bool {
        self.state.borrow().attached
    }

    fn focus(&mut self) {
        let displayed = self.is_displayed();
        let mut state = self.state.borrow_mut();
        state.focus_attempts += 1;
        if state.failing_focus > 0 {
            state.failing_focus -= 1;
            return;
        }
        if state.focused || state.disabled || !displayed {
            return;
        }
        state.focused = true;
        state.events.push_back(NativeEvent::Focus);
    }

    fn blur(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.focused {
            state.focused = false;
            state.events.push_back(NativeEvent::Blur);
        }
    }

    fn select_all(&mut self) {
        let mut state = self.state.borrow_mut();
        let end = state.value.chars().count();
        state.selection = SelectionRange { start: 0, end };
    }

    fn has_focus(&self) -> bool {
        self.state.borrow().focused
    }

    fn focus_later(&mut self, delay: Duration) {
        self.state.borrow_mut().pending_focus = Some(delay);
    }

    fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    fn set_value(&mut self, value: &str) {
        let mut state = self.state.borrow_mut();
        state.value = value.to_string();
        let end = state.value.chars().count();
        state.selection = SelectionRange::caret(end);
    }

    fn selection(&self) -> SelectionRange {
        self.state.borrow().selection
    }

    fn set_selection(&mut self, range: SelectionRange) {
        let mut state = self.state.borrow_mut();
        let len = state.value.chars().count();
        let start = range.start.min(len);
        state.selection = SelectionRange {
            start,
            end: range.end.clamp(start, len),
        };
    }

    fn set_disabled(&mut self, disabled: bool) {
        let mut state = self.state.borrow_mut();
        state.disabled = disabled;
        // Browsers drop focus from a disabled control without firing blur.
        if disabled {
            state.focused = false;
        }
    }

    fn set_placeholder(&mut self, placeholder: &str) {
        self.state.borrow_mut().placeholder = placeholder.to_string();
    }

    fn set_max_length(&mut self, max_length: Option<&str>) {
        self.state.borrow_mut().max_length = max_length.map(str::to_string);
    }

    fn set_secret(&mut self, secret: bool) {
        self.state.borrow_mut().secret = secret;
    }

    fn is_secret(&self) -> bool {
        self.state.borrow().secret
    }

    fn poll_event(&mut self) -> Option<NativeEvent> {
        self.state.borrow_mut().events.pop_front()
    }
}

/// Render surface with fixed geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessSurface {
    pub resolution: f32,
    pub client_rect: Bounds,
    pub scroll_offset: Vec2,
    pub render_size: Size,
}

impl HeadlessSurface {
    /// A surface whose CSS size equals its render size at resolution 1.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            resolution: 1.0,
            client_rect: Bounds::new(0.0, 0.0, width, height),
            scroll_offset: Vec2::ZERO,
            render_size: Size::new(width, height),
        }
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl RenderSurface for HeadlessSurface {
    fn resolution(&self) -> f32 {
        self.resolution
    }

    fn client_rect(&self) -> Bounds {
        self.client_rect
    }

    fn scroll_offset(&self) -> Vec2 {
        self.scroll_offset
    }

    fn render_size(&self) -> Size {
        self.render_size
    }
}

/// Scene node with explicit world properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticNode {
    pub world_transform: Affine2,
    pub world_alpha: f32,
    pub world_visible: bool,
}

impl StaticNode {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            world_transform: Affine2::from_translation(Vec2::new(x, y)),
            ..Self::default()
        }
    }
}

impl Default for StaticNode {
    fn default() -> Self {
        Self {
            world_transform: Affine2::IDENTITY,
            world_alpha: 1.0,
            world_visible: true,
        }
    }
}

impl SceneNode for StaticNode {
    fn world_transform(&self) -> Affine2 {
        self.world_transform
    }

    fn world_alpha(&self) -> f32 {
        self.world_alpha
    }

    fn world_visible(&self) -> bool {
        self.world_visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_queues_key_and_input_events() {
        let mut input = HeadlessInput::single_line();
        input.attach();
        input.type_text("a");

        assert_eq!(
            input.poll_event(),
            Some(NativeEvent::KeyDown {
                key_code: 'A' as u32,
                selection: SelectionRange::caret(0),
            })
        );
        assert_eq!(
            input.poll_event(),
            Some(NativeEvent::Input {
                value: "a".to_string()
            })
        );
        assert_eq!(
            input.poll_event(),
            Some(NativeEvent::KeyUp {
                key_code: 'A' as u32
            })
        );
        assert_eq!(input.poll_event(), None);
        assert_eq!(input.selection(), SelectionRange::caret(1));
    }

    #[test]
    fn max_length_blocks_insertion() {
        let mut input = HeadlessInput::single_line();
        input.set_max_length(Some("2"));
        input.type_text("abc");
        assert_eq!(input.value(), "ab");
    }

    #[test]
    fn hidden_element_has_empty_bounds_and_cannot_focus() {
        let mut input = HeadlessInput::single_line();
        input.attach();
        input.set_style_property("display", "none");
        assert_eq!(input.bounding_rect(), Bounds::ZERO);
        input.focus();
        assert!(!input.has_focus());
    }

    #[test]
    fn bounds_follow_transform_scale() {
        let mut input = HeadlessInput::single_line();
        input.attach();
        input.set_style_property("width", "100px");
        input.set_style_property("height", "20px");
        input.set_style_property("left", "10px");
        input.set_style_property("top", "5px");
        input.set_style_property("transform", "matrix(2,0,0,2,0,0)");
        assert_eq!(input.bounding_rect(), Bounds::new(10.0, 5.0, 200.0, 40.0));
    }

    #[test]
    fn deferred_focus_retries_once() {
        let mut input = HeadlessInput::single_line();
        input.attach();
        input.fail_next_focus(1);
        input.focus();
        input.focus_later(Duration::from_millis(10));
        assert!(!input.has_focus());
        assert!(input.run_deferred());
        assert!(input.has_focus());
        assert!(!input.run_deferred());
        assert_eq!(input.focus_attempts(), 2);
    }
}
