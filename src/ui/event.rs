use slotmap::{SlotMap, new_key_type};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

new_key_type! {
    /// Handle returned by listener registration; pass it back to remove the listener.
    pub struct ListenerHandle;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMeta {
    pub target_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDownEvent {
    pub meta: EventMeta,
    pub key_code: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyUpEvent {
    pub meta: EventMeta,
    pub key_code: u32,
}

/// Fired after the value changed and passed restriction checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub meta: EventMeta,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusEvent {
    pub meta: EventMeta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlurEvent {
    pub meta: EventMeta,
}

#[derive(Clone)]
pub struct KeyDownHandlerProp {
    handler: Rc<RefCell<dyn FnMut(&KeyDownEvent)>>,
}

#[derive(Clone)]
pub struct KeyUpHandlerProp {
    handler: Rc<RefCell<dyn FnMut(&KeyUpEvent)>>,
}

#[derive(Clone)]
pub struct InputHandlerProp {
    handler: Rc<RefCell<dyn FnMut(&InputEvent)>>,
}

#[derive(Clone)]
pub struct FocusHandlerProp {
    handler: Rc<RefCell<dyn FnMut(&FocusEvent)>>,
}

#[derive(Clone)]
pub struct BlurHandlerProp {
    handler: Rc<RefCell<dyn FnMut(&BlurEvent)>>,
}

macro_rules! impl_handler_prop {
    ($ty:ident, $event_ty:ty) => {
        impl $ty {
            pub fn new<F>(handler: F) -> Self
            where
                F: for<'a> FnMut(&'a $event_ty) + 'static,
            {
                Self {
                    handler: Rc::new(RefCell::new(handler)),
                }
            }

            pub fn call(&self, event: &$event_ty) {
                (self.handler.borrow_mut())(event);
            }
        }

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                Rc::ptr_eq(&self.handler, &other.handler)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty)).finish_non_exhaustive()
            }
        }

        impl<F> From<F> for $ty
        where
            F: for<'a> FnMut(&'a $event_ty) + 'static,
        {
            fn from(handler: F) -> Self {
                Self::new(handler)
            }
        }
    };
}

impl_handler_prop!(KeyDownHandlerProp, KeyDownEvent);
impl_handler_prop!(KeyUpHandlerProp, KeyUpEvent);
impl_handler_prop!(InputHandlerProp, InputEvent);
impl_handler_prop!(FocusHandlerProp, FocusEvent);
impl_handler_prop!(BlurHandlerProp, BlurEvent);

pub fn on_key_down<F>(handler: F) -> KeyDownHandlerProp
where
    F: for<'a> FnMut(&'a KeyDownEvent) + 'static,
{
    KeyDownHandlerProp::new(handler)
}

pub fn on_key_up<F>(handler: F) -> KeyUpHandlerProp
where
    F: for<'a> FnMut(&'a KeyUpEvent) + 'static,
{
    KeyUpHandlerProp::new(handler)
}

pub fn on_input<F>(handler: F) -> InputHandlerProp
where
    F: for<'a> FnMut(&'a InputEvent) + 'static,
{
    InputHandlerProp::new(handler)
}

pub fn on_focus<F>(handler: F) -> FocusHandlerProp
where
    F: for<'a> FnMut(&'a FocusEvent) + 'static,
{
    FocusHandlerProp::new(handler)
}

pub fn on_blur<F>(handler: F) -> BlurHandlerProp
where
    F: for<'a> FnMut(&'a BlurEvent) + 'static,
{
    BlurHandlerProp::new(handler)
}

#[derive(Clone, Debug)]
pub enum Listener {
    KeyDown(KeyDownHandlerProp),
    KeyUp(KeyUpHandlerProp),
    Input(InputHandlerProp),
    Focus(FocusHandlerProp),
    Blur(BlurHandlerProp),
}

impl From<KeyDownHandlerProp> for Listener {
    fn from(value: KeyDownHandlerProp) -> Self {
        Listener::KeyDown(value)
    }
}

impl From<KeyUpHandlerProp> for Listener {
    fn from(value: KeyUpHandlerProp) -> Self {
        Listener::KeyUp(value)
    }
}

impl From<InputHandlerProp> for Listener {
    fn from(value: InputHandlerProp) -> Self {
        Listener::Input(value)
    }
}

impl From<FocusHandlerProp> for Listener {
    fn from(value: FocusHandlerProp) -> Self {
        Listener::Focus(value)
    }
}

impl From<BlurHandlerProp> for Listener {
    fn from(value: BlurHandlerProp) -> Self {
        Listener::Blur(value)
    }
}

/// Registry of external listeners for the widget's notifications.
#[derive(Default)]
pub struct Listeners {
    entries: SlotMap<ListenerHandle, Listener>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    pub fn add(&mut self, listener: impl Into<Listener>) -> ListenerHandle {
        self.entries.insert(listener.into())
    }

    pub fn remove(&mut self, handle: ListenerHandle) -> bool {
        self.entries.remove(handle).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn emit_key_down(&self, event: &KeyDownEvent) {
        for listener in self.entries.values() {
            if let Listener::KeyDown(handler) = listener {
                handler.call(event);
            }
        }
    }

    pub fn emit_key_up(&self, event: &KeyUpEvent) {
        for listener in self.entries.values() {
            if let Listener::KeyUp(handler) = listener {
                handler.call(event);
            }
        }
    }

    pub fn emit_input(&self, event: &InputEvent) {
        for listener in self.entries.values() {
            if let Listener::Input(handler) = listener {
                handler.call(event);
            }
        }
    }

    pub fn emit_focus(&self, event: &FocusEvent) {
        for listener in self.entries.values() {
            if let Listener::Focus(handler) = listener {
                handler.call(event);
            }
        }
    }

    pub fn emit_blur(&self, event: &BlurEvent) {
        for listener in self.entries.values() {
            if let Listener::Blur(handler) = listener {
                handler.call(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_only_to_matching_listener_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::default();

        let keys = seen.clone();
        listeners.add(on_key_down(move |event| {
            keys.borrow_mut().push(format!("down:{}", event.key_code))
        }));
        let inputs = seen.clone();
        listeners.add(on_input(move |event| {
            inputs.borrow_mut().push(format!("input:{}", event.value))
        }));

        let meta = EventMeta { target_id: 7 };
        listeners.emit_key_down(&KeyDownEvent { meta, key_code: 65 });
        listeners.emit_input(&InputEvent {
            meta,
            value: "a".to_string(),
        });
        listeners.emit_blur(&BlurEvent { meta });

        assert_eq!(*seen.borrow(), vec!["down:65", "input:a"]);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let calls = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::default();
        let counter = calls.clone();
        let handle = listeners.add(on_focus(move |_| *counter.borrow_mut() += 1));

        let meta = EventMeta { target_id: 1 };
        listeners.emit_focus(&FocusEvent { meta });
        assert!(listeners.remove(handle));
        assert!(!listeners.remove(handle));
        listeners.emit_focus(&FocusEvent { meta });

        assert_eq!(*calls.borrow(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn handler_props_compare_by_identity() {
        let a = on_blur(|_| {});
        let b = a.clone();
        let c = on_blur(|_| {});
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
