//! Keyboard shortcut dispatch.
//!
//! A [`ShortcutSet`] maps key descriptors to action values. Each binding
//! names a key plus four modifier flags; a flag left unset means the
//! physical modifier must be *unpressed* for the binding to match, not
//! "don't care". Resolution scans bindings in registration order and
//! returns the first exact match, so at most one action fires per event
//! and registration order is the tie-break.
//!
//! While a text-entry surface has focus, every binding is suppressed
//! except those keyed on `/`, which stays live as the global
//! search-focus shortcut.
//!
//! The set is plain owned data consulted on every event; callers may
//! swap bindings at any time with [`ShortcutSet::replace`] without
//! re-registering anything upstream.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// One shortcut registration.
#[derive(Debug, Clone)]
pub struct Binding<A> {
    key: KeyCode,
    ctrl: bool,
    shift: bool,
    alt: bool,
    meta: bool,
    /// Whether the key is swallowed instead of also being forwarded to
    /// the focused editor (the default-action suppression flag).
    pub consume: bool,
    /// The action this binding resolves to.
    pub action: A,
}

impl<A> Binding<A> {
    /// Creates a binding with all modifiers required unpressed and
    /// `consume` off.
    pub const fn new(key: KeyCode, action: A) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
            consume: false,
            action,
        }
    }

    /// Requires Control to be held.
    #[must_use]
    pub const fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// Requires Shift to be held.
    #[must_use]
    pub const fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Requires Alt to be held.
    #[must_use]
    pub const fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Requires the Super/Meta key to be held.
    #[must_use]
    pub const fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Swallows the key on match.
    #[must_use]
    pub const fn consume(mut self) -> Self {
        self.consume = true;
        self
    }

    /// Exact match: key (case-insensitive for characters) and all four
    /// modifier flags.
    fn matches(&self, event: &KeyEvent) -> bool {
        if !key_eq(self.key, event.code) {
            return false;
        }
        self.ctrl == event.modifiers.contains(KeyModifiers::CONTROL)
            && self.shift == event.modifiers.contains(KeyModifiers::SHIFT)
            && self.alt == event.modifiers.contains(KeyModifiers::ALT)
            && self.meta
                == event
                    .modifiers
                    .intersects(KeyModifiers::SUPER | KeyModifiers::META)
    }
}

/// Character keys compare case-insensitively; everything else exactly.
fn key_eq(a: KeyCode, b: KeyCode) -> bool {
    match (a, b) {
        (KeyCode::Char(ca), KeyCode::Char(cb)) => {
            ca == cb || ca.to_lowercase().eq(cb.to_lowercase())
        }
        _ => a == b,
    }
}

/// An ordered set of shortcut bindings.
#[derive(Debug, Clone, Default)]
pub struct ShortcutSet<A> {
    bindings: Vec<Binding<A>>,
}

impl<A> ShortcutSet<A> {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Appends a binding; earlier bindings win ties.
    pub fn bind(&mut self, binding: Binding<A>) -> &mut Self {
        self.bindings.push(binding);
        self
    }

    /// Swaps the entire active set.
    pub fn replace(&mut self, bindings: Vec<Binding<A>>) {
        self.bindings = bindings;
    }

    /// Resolves a key event to the first matching binding, if any.
    ///
    /// `in_editor` marks events originating while a text-entry surface
    /// has focus; only `/` bindings stay live there.
    #[must_use]
    pub fn resolve(&self, event: &KeyEvent, in_editor: bool) -> Option<&Binding<A>> {
        self.bindings
            .iter()
            .filter(|binding| !in_editor || binding.key == KeyCode::Char('/'))
            .find(|binding| binding.matches(event))
    }
}
