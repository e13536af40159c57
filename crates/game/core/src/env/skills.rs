//! Skill definition lookup.

use std::collections::BTreeMap;

use super::RegistryError;
use crate::skill::SkillDefinition;
use crate::state::SkillId;

/// Read-only access to registered skill definitions.
pub trait SkillOracle: Send + Sync {
    fn definition(&self, id: &SkillId) -> Option<&SkillDefinition>;

    /// All registered ids in a stable order.
    fn skill_ids(&self) -> Vec<SkillId>;

    fn contains(&self, id: &SkillId) -> bool {
        self.definition(id).is_some()
    }
}

/// Append-only table of skill definitions.
///
/// Built once at startup and then shared immutably; registration rejects
/// duplicate ids.
#[derive(Clone, Debug, Default)]
pub struct SkillRegistry {
    definitions: BTreeMap<SkillId, SkillDefinition>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a list, failing on the first duplicate.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = SkillDefinition>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, definition: SkillDefinition) -> Result<(), RegistryError> {
        if self.definitions.contains_key(&definition.id) {
            return Err(RegistryError::DuplicateSkill(definition.id));
        }
        self.definitions.insert(definition.id.clone(), definition);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.definitions.values()
    }
}

impl SkillOracle for SkillRegistry {
    fn definition(&self, id: &SkillId) -> Option<&SkillDefinition> {
        self.definitions.get(id)
    }

    fn skill_ids(&self) -> Vec<SkillId> {
        self.definitions.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::CastType;

    #[test]
    fn duplicate_registration_fails_fast() {
        let id = SkillId::new("test:blink").unwrap();
        let mut registry = SkillRegistry::new();
        registry
            .register(SkillDefinition::new(id.clone(), CastType::Instant))
            .unwrap();

        let err = registry
            .register(SkillDefinition::new(id.clone(), CastType::Passive))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateSkill(id.clone()));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.definition(&id).map(|d| d.cast_type),
            Some(CastType::Instant)
        );
    }
}
