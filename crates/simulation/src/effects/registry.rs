use std::collections::HashMap;
use std::fmt;

use bevy::prelude::*;

use super::{BillboardEffect, EffectHandler, EffectKind, OutlineEffect, PulseEffect};
use crate::building_data::BuildingCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    AlreadyRegistered(EffectKind),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AlreadyRegistered(kind) => {
                write!(f, "An effect handler for {kind:?} is already registered")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Effect handlers keyed by kind.
#[derive(Resource, Default)]
pub struct EffectRegistry {
    handlers: HashMap<EffectKind, Box<dyn EffectHandler>>,
}

impl EffectRegistry {
    /// Every built-in kind: pulse, outline and one billboard per icon.
    pub fn with_defaults() -> Self {
        let mut handlers: HashMap<EffectKind, Box<dyn EffectHandler>> = HashMap::new();
        handlers.insert(EffectKind::Scale, Box::new(PulseEffect));
        handlers.insert(EffectKind::Outline, Box::new(OutlineEffect));
        for icon in EffectKind::BILLBOARDS {
            handlers.insert(icon, Box::new(BillboardEffect::new(icon)));
        }
        Self { handlers }
    }

    pub fn register(
        &mut self,
        kind: EffectKind,
        handler: impl EffectHandler + 'static,
    ) -> Result<(), RegistryError> {
        if self.handlers.contains_key(&kind) {
            return Err(RegistryError::AlreadyRegistered(kind));
        }
        self.handlers.insert(kind, Box::new(handler));
        Ok(())
    }

    pub fn get(&self, kind: EffectKind) -> Option<&dyn EffectHandler> {
        self.handlers.get(&kind).map(|h| h.as_ref())
    }

    pub fn contains(&self, kind: EffectKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Warn about effect kinds the catalog references but nothing handles.
    /// Returns the missing kinds.
    pub fn validate_catalog(&self, catalog: &BuildingCatalog) -> Vec<EffectKind> {
        let mut missing: Vec<EffectKind> = catalog
            .referenced_effect_kinds()
            .filter(|k| !self.contains(*k))
            .collect();
        missing.sort();
        missing.dedup();
        for kind in &missing {
            warn!("No effect handler registered for {kind:?}; statuses using it will show nothing");
        }
        missing
    }
}
