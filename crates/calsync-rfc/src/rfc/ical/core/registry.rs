//! Type registry mapping component tags to constructors.

use std::collections::HashMap;

use super::component::Component;

/// Constructor for a specialized component kind.
pub type ComponentFactory = fn() -> Component;

/// Maps component tags to factories; unknown tags produce generic components.
///
/// Lookups are case-insensitive. The created component keeps the tag exactly
/// as it was written.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    factories: HashMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    /// Creates a registry without any specialized kinds.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers `factory` for `tag`, replacing any previous registration.
    pub fn register(&mut self, tag: &str, factory: ComponentFactory) {
        self.factories.insert(tag.to_ascii_uppercase(), factory);
    }

    #[must_use]
    pub fn is_registered(&self, tag: &str) -> bool {
        self.factories.contains_key(&tag.to_ascii_uppercase())
    }

    /// Creates a component for `tag`.
    #[must_use]
    pub fn create(&self, tag: &str) -> Component {
        match self.factories.get(&tag.to_ascii_uppercase()) {
            Some(factory) => {
                let mut component = factory();
                component.name = tag.to_string();
                component
            }
            None => Component::generic(tag),
        }
    }
}

impl Default for ComponentRegistry {
    /// Registers VCALENDAR and VEVENT.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("VCALENDAR", Component::calendar);
        registry.register("VEVENT", Component::event);
        registry
    }
}
