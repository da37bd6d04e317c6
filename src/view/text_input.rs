use glam::Vec2;
use std::fmt;
use tracing::{debug, trace};

use crate::error::{Result, TextInputError};
use crate::platform::{
    FOCUS_RETRY_DELAY, NativeEvent, NativeInput, NativeInputKind, RenderSurface, SceneNode,
    SelectionRange,
};
use crate::style::{
    Color, InputStyle, InputStyleKey, StyleEffect, SurrogatePadding, SurrogateTextStyle,
};
use crate::ui::{
    BlurEvent, BlurHandlerProp, EventMeta, FocusEvent, FocusHandlerProp, InputEvent,
    InputHandlerProp, InteractionState, KeyDownEvent, KeyDownHandlerProp, KeyUpEvent,
    KeyUpHandlerProp, Listener, ListenerHandle, Listeners, Restriction, RestrictionGuard,
    StateTrigger,
};
use crate::view::graphics::next_node_id;
use crate::view::{
    BoxCache, BoxGenerator, BoxStyleConfig, CosmicTextMeasure, DefaultBoxGenerator, FontMetrics,
    FrameState, Graphics, OverlaySnapshot, PLACEHOLDER_COLOR, Size, Surrogate, TextMeasure,
    TextNode, apply_overlay, surrogate_text,
};

/// Children of the widget in back-to-front order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayItem<'a> {
    Box(&'a Graphics),
    HitRegion(&'a Graphics),
    Mask(&'a Graphics),
    Text(&'a TextNode),
}

pub struct TextInputBuilder {
    input_style: InputStyle,
    multiline: bool,
    box_generator: Option<Box<dyn BoxGenerator>>,
    box_style: Option<BoxStyleConfig>,
    text_measure: Option<Box<dyn TextMeasure>>,
    placeholder: String,
    placeholder_color: Color,
    substitute_text: bool,
    max_length: Option<String>,
    restrict: Option<Restriction>,
    secret: bool,
    disabled: bool,
}

impl Default for TextInputBuilder {
    fn default() -> Self {
        Self {
            input_style: InputStyle::new(),
            multiline: false,
            box_generator: None,
            box_style: None,
            text_measure: None,
            placeholder: String::new(),
            placeholder_color: PLACEHOLDER_COLOR,
            substitute_text: true,
            max_length: None,
            restrict: None,
            secret: false,
            disabled: false,
        }
    }
}

impl TextInputBuilder {
    /// Style layered over the overlay defaults.
    pub fn input_style(mut self, style: InputStyle) -> Self {
        self.input_style = self.input_style.merge(style);
        self
    }

    pub fn style(mut self, key: InputStyleKey, value: &str) -> Self {
        self.input_style.set(key, value);
        self
    }

    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    pub fn box_style(mut self, style: BoxStyleConfig) -> Self {
        self.box_style = Some(style);
        self
    }

    /// Replaces the default box generator. Takes precedence over `box_style`.
    pub fn box_generator(mut self, generator: impl BoxGenerator + 'static) -> Self {
        self.box_generator = Some(Box::new(generator));
        self
    }

    pub fn text_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.text_measure = Some(Box::new(measure));
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn placeholder_color(mut self, color: Color) -> Self {
        self.placeholder_color = color;
        self
    }

    pub fn substitute_text(mut self, substitute: bool) -> Self {
        self.substitute_text = substitute;
        self
    }

    pub fn max_length(mut self, max_length: impl Into<String>) -> Self {
        self.max_length = Some(max_length.into());
        self
    }

    pub fn restrict(mut self, restriction: impl Into<Restriction>) -> Self {
        self.restrict = Some(restriction.into());
        self
    }

    pub fn secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Kind of native element `build` expects.
    pub fn native_kind(&self) -> NativeInputKind {
        NativeInputKind::from_multiline(self.multiline)
    }

    pub fn build(self, native: impl NativeInput + 'static) -> Result<TextInput> {
        let expected = self.native_kind();
        let found = native.kind();
        if expected != found {
            return Err(TextInputError::NativeKindMismatch { expected, found });
        }

        let mut native: Box<dyn NativeInput> = Box::new(native);
        if self.multiline {
            native.set_style_property("resize", "none");
        }
        let input_style = InputStyle::overlay_defaults().merge(self.input_style);
        for (key, value) in input_style.iter() {
            native.set_style_property(key.css_name(), value);
        }
        native.set_secret(self.secret);
        native.set_max_length(self.max_length.as_deref());

        let box_cache = match (self.box_generator, self.box_style) {
            (Some(generator), _) => Some(BoxCache::from_boxed(generator)),
            (None, Some(style)) => Some(BoxCache::new(DefaultBoxGenerator::new(style))),
            (None, None) => None,
        };
        let restriction = self
            .restrict
            .map(|restriction| RestrictionGuard::new(restriction, &native.value()))
            .transpose()?;
        let text_measure = self
            .text_measure
            .unwrap_or_else(|| Box::new(CosmicTextMeasure::new()) as Box<dyn TextMeasure>);

        let mut input = TextInput {
            id: next_node_id(),
            native,
            input_style,
            multiline: self.multiline,
            box_cache,
            shown_box: None,
            state: InteractionState::Default,
            disabled: false,
            substituted: false,
            surrogate: None,
            dom_added: false,
            dom_visible: true,
            placeholder: self.placeholder,
            placeholder_color: self.placeholder_color,
            max_length: self.max_length,
            restriction,
            selection: SelectionRange::default(),
            frame: None,
            previous: None,
            font_metrics: None,
            text_measure,
            listeners: Listeners::default(),
            destroyed: false,
        };
        input.set_state(InteractionState::Default);
        if self.substitute_text {
            input.set_substitute_text(true);
        } else {
            input.apply_placeholder();
        }
        if self.disabled {
            input.set_disabled(true);
        }
        debug!(id = input.id, multiline = input.multiline, "created text input");
        Ok(input)
    }
}

/// Editable text field drawn in a scene graph, backed by an overlaid native
/// text-entry element.
pub struct TextInput {
    id: u64,
    native: Box<dyn NativeInput>,
    input_style: InputStyle,
    multiline: bool,
    /// No background is drawn without a box style or generator.
    box_cache: Option<BoxCache>,
    shown_box: Option<(InteractionState, u64)>,
    state: InteractionState,
    disabled: bool,
    substituted: bool,
    surrogate: Option<Surrogate>,
    dom_added: bool,
    dom_visible: bool,
    placeholder: String,
    placeholder_color: Color,
    max_length: Option<String>,
    restriction: Option<RestrictionGuard>,
    /// Selection before the edit in flight, restored when a value is rejected.
    selection: SelectionRange,
    frame: Option<FrameState>,
    previous: Option<OverlaySnapshot>,
    font_metrics: Option<FontMetrics>,
    text_measure: Box<dyn TextMeasure>,
    listeners: Listeners,
    destroyed: bool,
}

impl fmt::Debug for TextInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextInput")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("multiline", &self.multiline)
            .field("substituted", &self.substituted)
            .field("disabled", &self.disabled)
            .field("dom_visible", &self.dom_visible)
            .field("box_cache", &self.box_cache)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl TextInput {
    pub fn builder() -> TextInputBuilder {
        TextInputBuilder::default()
    }

    /// Single-line input with default styling.
    pub fn new(native: impl NativeInput + 'static) -> Result<Self> {
        Self::builder().build(native)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn multiline(&self) -> bool {
        self.multiline
    }

    pub fn input_style(&self) -> &InputStyle {
        &self.input_style
    }

    pub fn native_input(&self) -> &dyn NativeInput {
        self.native.as_ref()
    }

    /// Whether the native element is meant to be shown on the next pass.
    pub fn native_visible(&self) -> bool {
        self.dom_visible
    }

    pub fn font_metrics(&self) -> Option<FontMetrics> {
        self.font_metrics
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn substitute_text(&self) -> bool {
        self.substituted
    }

    pub fn set_substitute_text(&mut self, substitute: bool) {
        if self.substituted == substitute {
            return;
        }
        self.substituted = substitute;
        if substitute {
            self.surrogate = Some(Surrogate::new());
            self.update_font_metrics();
            self.apply_substitution_visibility();
            debug!(id = self.id, "created text input surrogate");
        } else {
            self.surrogate = None;
            self.dom_visible = true;
            debug!(id = self.id, "destroyed text input surrogate");
        }
        self.apply_placeholder();
        self.update();
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
        self.apply_placeholder();
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        self.native.set_disabled(disabled);
        self.apply_trigger(if disabled {
            StateTrigger::Disable
        } else {
            StateTrigger::Enable
        });
    }

    pub fn max_length(&self) -> Option<&str> {
        self.max_length.as_deref()
    }

    pub fn set_max_length(&mut self, max_length: Option<&str>) {
        self.max_length = max_length.map(str::to_string);
        self.native.set_max_length(max_length);
    }

    pub fn restrict(&self) -> Option<&Restriction> {
        self.restriction.as_ref().map(RestrictionGuard::source)
    }

    pub fn set_restrict(&mut self, restriction: impl Into<Restriction>) -> Result<()> {
        let guard = RestrictionGuard::new(restriction.into(), &self.native.value())?;
        self.restriction = Some(guard);
        Ok(())
    }

    pub fn clear_restrict(&mut self) {
        self.restriction = None;
    }

    pub fn text(&self) -> String {
        self.native.value()
    }

    pub fn set_text(&mut self, text: &str) {
        self.native.set_value(text);
        if let Some(guard) = self.restriction.as_mut() {
            guard.accept_if_match(text);
        }
        if self.substituted {
            self.update_surrogate();
        }
    }

    pub fn secret(&self) -> bool {
        self.native.is_secret()
    }

    pub fn set_secret(&mut self, secret: bool) {
        self.native.set_secret(secret);
        if self.substituted {
            self.update_surrogate();
        }
    }

    pub fn focus(&mut self) {
        if self.substituted && !self.dom_visible {
            self.native.set_style_property("display", "block");
        }
        self.native.focus();
    }

    pub fn blur(&mut self) {
        self.native.blur();
    }

    /// Focuses the field and selects its whole value.
    pub fn select(&mut self) {
        self.focus();
        self.native.select_all();
    }

    /// Sets one style key by CSS or camelCase name.
    pub fn set_input_style(&mut self, key: &str, value: &str) -> Result<()> {
        let key: InputStyleKey = key.parse()?;
        self.set_input_style_key(key, value);
        Ok(())
    }

    pub fn set_input_style_key(&mut self, key: InputStyleKey, value: &str) {
        let effect = self.input_style.set(key, value);
        if effect.contains(StyleEffect::NATIVE) {
            self.native.set_style_property(key.css_name(), value);
        }
        if self.substituted && effect.contains(StyleEffect::FONT_METRICS) {
            self.update_font_metrics();
        }
        if self.frame.is_some() {
            self.update();
        } else if self.substituted && effect.contains(StyleEffect::SURROGATE) {
            self.update_surrogate();
        }
    }

    /// The widget entered the scene graph.
    pub fn on_added(&mut self) {
        self.native.attach();
        self.native.set_style_property("display", "none");
        self.dom_added = true;
        self.previous = None;
    }

    /// The widget left the scene graph. The native element survives.
    pub fn on_removed(&mut self) {
        self.native.detach();
        self.dom_added = false;
    }

    pub fn is_added(&self) -> bool {
        self.dom_added
    }

    pub fn destroy(&mut self) {
        if let Some(cache) = self.box_cache.as_mut() {
            cache.clear();
        }
        self.shown_box = None;
        self.surrogate = None;
        self.listeners.clear();
        if self.dom_added {
            self.on_removed();
        }
        self.destroyed = true;
        debug!(id = self.id, "destroyed text input");
    }

    /// Per-frame hook. Drains native events, then repositions the overlay
    /// when the node or the surface moved.
    pub fn render(&mut self, node: &dyn SceneNode, surface: &dyn RenderSurface) {
        if self.destroyed {
            return;
        }
        self.process_native_events();
        let frame = FrameState::capture(node, surface);
        self.frame = Some(frame);
        if frame.snapshot().changed_since(self.previous.as_ref()) {
            self.update();
        }
    }

    pub fn process_native_events(&mut self) {
        while let Some(event) = self.native.poll_event() {
            let meta = EventMeta { target_id: self.id };
            match event {
                NativeEvent::KeyDown {
                    key_code,
                    selection,
                } => {
                    self.selection = selection;
                    self.listeners.emit_key_down(&KeyDownEvent { meta, key_code });
                }
                NativeEvent::Input { value } => self.on_native_input(meta, value),
                NativeEvent::KeyUp { key_code } => {
                    self.listeners.emit_key_up(&KeyUpEvent { meta, key_code });
                }
                NativeEvent::Focus => {
                    self.apply_trigger(StateTrigger::Focus);
                    self.listeners.emit_focus(&FocusEvent { meta });
                }
                NativeEvent::Blur => {
                    self.apply_trigger(StateTrigger::Blur);
                    self.listeners.emit_blur(&BlurEvent { meta });
                }
            }
        }
    }

    /// Routes a pointer-down at widget-local `point`. Returns whether the
    /// surrogate hit region took it.
    pub fn pointer_down(&mut self, point: Vec2) -> bool {
        let hit = self
            .surrogate
            .as_ref()
            .is_some_and(|surrogate| surrogate.hit_region.interactive && surrogate.contains(point));
        if hit {
            self.handle_surrogate_pointer_down();
        }
        hit
    }

    /// Shows the native element and focuses it, with one deferred retry for
    /// platforms that drop the first synchronous attempt.
    pub fn handle_surrogate_pointer_down(&mut self) {
        self.native.set_style_property("display", "block");
        self.native.focus();
        self.native.focus_later(FOCUS_RETRY_DELAY);
    }

    pub fn surrogate(&self) -> Option<&Surrogate> {
        self.surrogate.as_ref()
    }

    pub fn current_box(&self) -> Option<&Graphics> {
        let (state, _) = self.shown_box?;
        self.box_cache.as_ref()?.get(state)
    }

    pub fn display_list(&self) -> Vec<DisplayItem<'_>> {
        let mut items = Vec::with_capacity(4);
        if let Some(current) = self.current_box() {
            items.push(DisplayItem::Box(current));
        }
        if let Some(surrogate) = &self.surrogate {
            items.push(DisplayItem::HitRegion(&surrogate.hit_region));
            items.push(DisplayItem::Mask(&surrogate.mask));
            items.push(DisplayItem::Text(&surrogate.text));
        }
        items
    }

    pub fn on_key_down<F>(&mut self, handler: F) -> ListenerHandle
    where
        F: for<'a> FnMut(&'a KeyDownEvent) + 'static,
    {
        self.listeners.add(KeyDownHandlerProp::new(handler))
    }

    pub fn on_key_up<F>(&mut self, handler: F) -> ListenerHandle
    where
        F: for<'a> FnMut(&'a KeyUpEvent) + 'static,
    {
        self.listeners.add(KeyUpHandlerProp::new(handler))
    }

    pub fn on_input<F>(&mut self, handler: F) -> ListenerHandle
    where
        F: for<'a> FnMut(&'a InputEvent) + 'static,
    {
        self.listeners.add(InputHandlerProp::new(handler))
    }

    pub fn on_focus<F>(&mut self, handler: F) -> ListenerHandle
    where
        F: for<'a> FnMut(&'a FocusEvent) + 'static,
    {
        self.listeners.add(FocusHandlerProp::new(handler))
    }

    pub fn on_blur<F>(&mut self, handler: F) -> ListenerHandle
    where
        F: for<'a> FnMut(&'a BlurEvent) + 'static,
    {
        self.listeners.add(BlurHandlerProp::new(handler))
    }

    pub fn add_listener(&mut self, listener: impl Into<Listener>) -> ListenerHandle {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.remove(handle)
    }

    fn on_native_input(&mut self, meta: EventMeta, value: String) {
        let value = match self.restriction.as_mut() {
            Some(guard) => match guard.check(&value) {
                None => value,
                Some(accepted) => {
                    let accepted = accepted.to_string();
                    debug!(rejected = %value, accepted = %accepted, "reverted restricted input");
                    self.native.set_value(&accepted);
                    self.native.set_selection(self.selection);
                    accepted
                }
            },
            None => value,
        };
        if self.substituted {
            self.update_substitution();
        }
        self.listeners.emit_input(&InputEvent { meta, value });
    }

    fn apply_trigger(&mut self, trigger: StateTrigger) {
        self.set_state(self.state.next(trigger));
    }

    fn set_state(&mut self, state: InteractionState) {
        if self.state != state {
            debug!(id = self.id, from = %self.state, to = %state, "text input state changed");
        }
        self.state = state;
        self.update_box();
        if self.substituted {
            self.update_substitution();
        }
    }

    fn apply_placeholder(&mut self) {
        if self.substituted {
            self.update_surrogate();
            self.native.set_placeholder("");
        } else {
            self.native.set_placeholder(&self.placeholder);
        }
    }

    fn apply_substitution_visibility(&mut self) {
        let empty = self.native.value().is_empty();
        let focused = self.state == InteractionState::Focused;
        self.dom_visible = focused;
        if let Some(surrogate) = self.surrogate.as_mut() {
            surrogate.text.visible = !focused || empty;
        }
    }

    fn update_substitution(&mut self) {
        self.apply_substitution_visibility();
        self.update_overlay();
        self.update_surrogate();
    }

    fn update(&mut self) {
        self.update_overlay();
        self.update_box();
        if self.substituted {
            self.update_surrogate();
        }
    }

    fn update_overlay(&mut self) {
        let Some(frame) = self.frame else {
            return;
        };
        apply_overlay(self.native.as_mut(), &frame, self.dom_visible);
        self.previous = Some(frame.snapshot());
    }

    fn update_box(&mut self) {
        if self.box_cache.is_none() {
            return;
        }
        let measured = self.measure_native_bounds();
        let state = self.state;
        let shown = self.box_cache.as_mut().and_then(|cache| {
            cache.ensure(measured);
            cache.get(state).map(|graphics| (state, graphics.id()))
        });
        if shown != self.shown_box {
            trace!(id = self.id, state = %self.state, "swapped text input box");
            self.shown_box = shown;
        }
    }

    fn update_surrogate(&mut self) {
        if self.surrogate.is_none() {
            return;
        }
        let field = self.measure_native_bounds();
        let value = self.native.value();
        let padding = SurrogatePadding::from_style(&self.input_style);
        let style = SurrogateTextStyle::derive(
            &self.input_style,
            self.multiline,
            field.width,
            value.is_empty(),
            self.placeholder_color,
        );
        let text = surrogate_text(&value, &self.placeholder, self.native.is_secret());
        let measured = self.text_measure.measure_text(&text, &style);

        if let Some(surrogate) = self.surrogate.as_mut() {
            surrogate.update_text(text, style, measured, field, padding, self.multiline);
            surrogate.update_hit_region(field, self.disabled);
            surrogate.update_mask(field, padding);
        }
    }

    fn update_font_metrics(&mut self) {
        let style = SurrogateTextStyle::derive(
            &self.input_style,
            self.multiline,
            0.0,
            false,
            self.placeholder_color,
        );
        self.font_metrics = Some(self.text_measure.measure_font(&style));
    }

    /// Untransformed layout size of the native element: transform cleared and
    /// display forced, both restored afterwards.
    fn measure_native_bounds(&mut self) -> Size {
        let attach_for_measure = !self.native.is_attached();
        if attach_for_measure {
            self.native.attach();
        }
        let transform = self.native.style_property("transform");
        let display = self.native.style_property("display");
        self.native.set_style_property("transform", "");
        self.native.set_style_property("display", "block");

        let bounds = self.native.bounding_rect();

        self.native.set_style_property("transform", &transform);
        self.native.set_style_property("display", &display);
        if attach_for_measure {
            self.native.detach();
        }
        bounds.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessInput, HeadlessSurface, StaticNode};
    use crate::view::{BoxStyle, EstimatedTextMeasure};
    use rstest::rstest;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn substituted(native: &HeadlessInput) -> TextInput {
        TextInput::builder()
            .text_measure(EstimatedTextMeasure)
            .placeholder("Name")
            .box_style(BoxStyleConfig::Single(BoxStyle::filled(Color::from_rgb_u32(0xcccccc))))
            .style(InputStyleKey::Width, "200px")
            .style(InputStyleKey::Height, "24px")
            .build(native.clone())
            .expect("matching native kind")
    }

    fn mounted(native: &HeadlessInput) -> TextInput {
        let mut input = substituted(native);
        input.on_added();
        input.render(&StaticNode::default(), &HeadlessSurface::default());
        input
    }

    #[test]
    fn rejects_mismatched_native_kind() {
        let result = TextInput::builder()
            .multiline(true)
            .text_measure(EstimatedTextMeasure)
            .build(HeadlessInput::single_line());
        assert!(matches!(
            result,
            Err(TextInputError::NativeKindMismatch {
                expected: NativeInputKind::MultiLine,
                found: NativeInputKind::SingleLine,
            })
        ));
    }

    #[test]
    fn overlay_defaults_reach_native_style() {
        let native = HeadlessInput::multi_line();
        let _input = TextInput::builder()
            .multiline(true)
            .text_measure(EstimatedTextMeasure)
            .style(InputStyleKey::Background, "#fff")
            .build(native.clone())
            .expect("matching native kind");
        assert_eq!(native.style("position").as_deref(), Some("absolute"));
        assert_eq!(native.style("transform-origin").as_deref(), Some("0 0"));
        assert_eq!(native.style("background").as_deref(), Some("#fff"));
        assert_eq!(native.style("resize").as_deref(), Some("none"));
    }

    #[test]
    fn focus_blur_and_disable_drive_state() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);

        input.focus();
        input.process_native_events();
        assert_eq!(input.state(), InteractionState::Focused);

        input.blur();
        input.process_native_events();
        assert_eq!(input.state(), InteractionState::Default);

        input.focus();
        input.process_native_events();
        input.set_disabled(true);
        input.process_native_events();
        assert_eq!(input.state(), InteractionState::Disabled);
        assert!(native.is_disabled());

        input.set_disabled(false);
        assert_eq!(input.state(), InteractionState::Default);
    }

    #[test]
    fn restriction_reverts_and_restores_selection() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        input.set_restrict("0-9").expect("valid class");
        let values = Rc::new(RefCell::new(Vec::new()));
        let seen = values.clone();
        input.on_input(move |event| seen.borrow_mut().push(event.value.clone()));

        native.type_text("12a");
        input.process_native_events();

        assert_eq!(input.text(), "12");
        assert_eq!(native.selection(), SelectionRange::caret(2));
        assert_eq!(*values.borrow(), vec!["1", "12", "12"]);
    }

    #[test]
    fn queued_keystrokes_settle_on_last_accepted_value() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        input.set_restrict("/[0-9]*/").expect("valid pattern");

        native.type_text("12a3");
        input.process_native_events();

        assert_eq!(input.text(), "12");
    }

    #[test]
    fn substitution_visibility_with_empty_value() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        let surrogate_visible = |input: &TextInput| {
            input
                .surrogate()
                .map(|surrogate| surrogate.text.visible)
                .unwrap_or(false)
        };

        assert_eq!(input.state(), InteractionState::Default);
        assert!(!native.is_displayed());
        assert!(surrogate_visible(&input));
        assert_eq!(
            input.surrogate().map(|surrogate| surrogate.text.text.as_str()),
            Some("Name")
        );

        input.focus();
        input.process_native_events();
        assert_eq!(input.state(), InteractionState::Focused);
        assert!(native.is_displayed());
        assert!(surrogate_visible(&input));
    }

    #[test]
    fn focused_surrogate_hides_while_value_present() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        input.focus();
        native.type_text("hi");
        input.process_native_events();

        let surrogate = input.surrogate().expect("substituted");
        assert!(!surrogate.text.visible);
        assert_eq!(surrogate.text.text, "hi");

        input.blur();
        input.process_native_events();
        let surrogate = input.surrogate().expect("substituted");
        assert!(surrogate.text.visible);
        assert!(!native.is_displayed());
    }

    #[test]
    fn unchanged_frame_skips_overlay_writes() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        let surface = HeadlessSurface::default();

        let writes = native.style_writes();
        input.render(&StaticNode::default(), &surface);
        assert_eq!(native.style_writes(), writes);

        input.render(&StaticNode::at(4.0, 0.0), &surface);
        assert!(native.style_writes() > writes);
        assert_eq!(
            native.style("transform").as_deref(),
            Some("matrix(1,0,0,1,4,0)")
        );
    }

    #[test]
    fn disabling_substitution_shows_native_again() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        assert_eq!(native.placeholder(), "");

        input.set_substitute_text(false);
        assert!(input.surrogate().is_none());
        assert!(input.native_visible());
        assert!(native.is_displayed());
        assert_eq!(native.placeholder(), "Name");
        assert_eq!(input.display_list().len(), 1);
    }

    #[test]
    fn surrogate_pointer_down_retries_focus_once() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        native.fail_next_focus(1);

        assert!(input.pointer_down(Vec2::new(10.0, 10.0)));
        assert_eq!(native.pending_focus_retry(), Some(FOCUS_RETRY_DELAY));
        assert!(!native.has_focus());

        native.run_deferred();
        input.process_native_events();
        assert_eq!(input.state(), InteractionState::Focused);
        assert_eq!(native.focus_attempts(), 2);
    }

    #[test]
    fn pointer_outside_hit_region_is_ignored() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        assert!(!input.pointer_down(Vec2::new(500.0, 10.0)));
        assert_eq!(native.pending_focus_retry(), None);
    }

    #[test]
    fn unknown_style_key_is_rejected() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        assert!(matches!(
            input.set_input_style("zIndex", "2"),
            Err(TextInputError::UnknownStyleKey(_))
        ));
        input.set_input_style("fontSize", "20px").expect("known key");
        assert_eq!(native.style("font-size").as_deref(), Some("20px"));
        assert_eq!(input.font_metrics().map(|metrics| metrics.font_size), Some(20.0));
    }

    #[test]
    fn secret_values_are_masked_in_surrogate() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        input.set_secret(true);
        input.set_text("abc");
        assert_eq!(
            input.surrogate().map(|surrogate| surrogate.text.text.as_str()),
            Some("•••")
        );
    }

    #[test]
    fn destroy_releases_boxes_and_detaches() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        assert!(input.current_box().is_some());
        input.destroy();
        assert!(input.current_box().is_none());
        assert!(input.surrogate().is_none());
        assert!(!native.is_attached());
        assert!(input.display_list().is_empty());
    }

    #[test]
    fn state_changes_swap_cached_boxes_without_rebuilding() {
        let native = HeadlessInput::single_line();
        let built = Rc::new(RefCell::new(Vec::new()));
        let log = built.clone();
        let mut input = TextInput::builder()
            .text_measure(EstimatedTextMeasure)
            .box_generator(move |width: f32, height: f32, state: InteractionState| {
                log.borrow_mut().push((state, width, height));
                let mut graphics = Graphics::new();
                graphics.draw_rect(0.0, 0.0, width, height);
                graphics
            })
            .build(native.clone())
            .expect("matching native kind");
        input.on_added();
        input.render(&StaticNode::default(), &HeadlessSurface::default());
        assert_eq!(built.borrow().len(), 3);
        let default_box = input.current_box().map(Graphics::id);

        input.focus();
        input.process_native_events();
        assert_ne!(input.current_box().map(Graphics::id), default_box);
        assert_eq!(built.borrow().len(), 3);

        input.set_input_style("height", "30px").expect("known key");
        input.render(&StaticNode::at(1.0, 0.0), &HeadlessSurface::default());
        assert_eq!(built.borrow().len(), 6);
        assert!(built.borrow()[3..].iter().all(|(_, _, height)| *height == 30.0));
    }

    #[test]
    fn no_box_style_draws_no_box() {
        let native = HeadlessInput::single_line();
        let mut input = TextInput::builder()
            .text_measure(EstimatedTextMeasure)
            .build(native.clone())
            .expect("matching native kind");
        input.on_added();
        input.render(&StaticNode::default(), &HeadlessSurface::default());
        assert!(input.current_box().is_none());

        input.focus();
        input.process_native_events();
        assert_eq!(input.state(), InteractionState::Focused);
        assert!(input.current_box().is_none());
        assert!(
            !input
                .display_list()
                .iter()
                .any(|item| matches!(item, DisplayItem::Box(_)))
        );
    }

    #[rstest]
    #[case(&[], InteractionState::Default)]
    #[case(&[StateTrigger::Focus], InteractionState::Focused)]
    #[case(&[StateTrigger::Focus, StateTrigger::Blur], InteractionState::Default)]
    #[case(
        &[StateTrigger::Focus, StateTrigger::Blur, StateTrigger::Focus],
        InteractionState::Focused
    )]
    #[case(&[StateTrigger::Blur, StateTrigger::Blur], InteractionState::Default)]
    #[case(&[StateTrigger::Focus, StateTrigger::Disable], InteractionState::Disabled)]
    #[case(&[StateTrigger::Disable, StateTrigger::Enable], InteractionState::Default)]
    #[case(
        &[StateTrigger::Focus, StateTrigger::Disable, StateTrigger::Enable, StateTrigger::Focus],
        InteractionState::Focused
    )]
    fn widget_state_follows_trigger_sequence(
        #[case] triggers: &[StateTrigger],
        #[case] expected: InteractionState,
    ) {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        for trigger in triggers {
            match trigger {
                StateTrigger::Focus => input.focus(),
                StateTrigger::Blur => input.blur(),
                StateTrigger::Disable => input.set_disabled(true),
                StateTrigger::Enable => input.set_disabled(false),
            }
            input.process_native_events();
        }
        assert_eq!(input.state(), expected);
    }

    #[test]
    fn bracket_restriction_is_a_literal_class() {
        let native = HeadlessInput::single_line();
        let mut input = mounted(&native);
        input.set_restrict("[").expect("class bodies always compile");
        native.type_text("[a");
        input.process_native_events();
        assert_eq!(input.text(), "[");
    }
}
