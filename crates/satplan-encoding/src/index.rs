use std::collections::HashMap;
use std::fmt;

use satplan_core::{ActionId, FactId};

use crate::pairing::{pair, unpair};
use crate::{EncodingError, Result};

/// Something that gets one propositional variable per time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Fact(FactId),
    Action(ActionId),
    /// Helper variable of an at-most-one constraint, numbered within its step.
    Aux(u32),
}

impl Entity {
    /// Keys are residues mod 3: facts 0, actions 1, auxiliaries 2.
    fn key(self) -> u64 {
        match self {
            Entity::Fact(f) => 3 * u64::from(f.0),
            Entity::Action(a) => 3 * u64::from(a.0) + 1,
            Entity::Aux(n) => 3 * u64::from(n) + 2,
        }
    }

    fn from_key(key: u64) -> Option<Self> {
        let id = u32::try_from(key / 3).ok()?;
        Some(match key % 3 {
            0 => Entity::Fact(FactId(id)),
            1 => Entity::Action(ActionId(id)),
            _ => Entity::Aux(id),
        })
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Fact(id) => write!(f, "{id}"),
            Entity::Action(id) => write!(f, "{id}"),
            Entity::Aux(n) => write!(f, "aux{n}"),
        }
    }
}

/// A positive SAT variable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(u32);

impl VarId {
    pub fn get(self) -> u32 {
        self.0
    }

    pub fn pos(self) -> i32 {
        self.0 as i32
    }

    pub fn neg(self) -> i32 {
        -(self.0 as i32)
    }

    /// Literal asserting the variable has `value`.
    pub fn lit(self, value: bool) -> i32 {
        if value {
            self.pos()
        } else {
            self.neg()
        }
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Bijection between `(entity, step)` pairs and variable ids.
///
/// Ids are handed out by a single counter starting at 1 and never reused.
/// Each id remembers its pairing key, so the reverse lookup goes through
/// [`unpair`].
#[derive(Debug, Clone, Default)]
pub struct VariableIndex {
    ids: HashMap<u64, VarId>,
    keys: Vec<u64>,
}

impl VariableIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(entity: Entity, step: u32) -> Result<u64> {
        pair(entity.key(), u64::from(step)).ok_or(EncodingError::KeyOverflow { entity, step })
    }

    /// Id for `(entity, step)`, allocating it on first use.
    pub fn id_of(&mut self, entity: Entity, step: u32) -> Result<VarId> {
        let key = Self::key(entity, step)?;
        if let Some(&id) = self.ids.get(&key) {
            return Ok(id);
        }
        let next = i32::try_from(self.keys.len() + 1)
            .map_err(|_| EncodingError::IdSpaceExhausted)?;
        let id = VarId(next as u32);
        self.keys.push(key);
        self.ids.insert(key, id);
        Ok(id)
    }

    /// Lookup without allocation.
    pub fn get(&self, entity: Entity, step: u32) -> Option<VarId> {
        let key = Self::key(entity, step).ok()?;
        self.ids.get(&key).copied()
    }

    pub fn entity_of(&self, var: u32) -> Result<(Entity, u32)> {
        let key = var
            .checked_sub(1)
            .and_then(|slot| self.keys.get(slot as usize))
            .ok_or(EncodingError::UnknownVariable(var))?;
        let (entity_key, step) = unpair(*key);
        let entity = Entity::from_key(entity_key).ok_or(EncodingError::UnknownVariable(var))?;
        let step = u32::try_from(step).map_err(|_| EncodingError::UnknownVariable(var))?;
        Ok((entity, step))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Highest id handed out so far, 0 when empty.
    pub fn max_var(&self) -> u32 {
        self.keys.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facts_and_actions_never_share_ids() {
        let mut index = VariableIndex::new();
        let f = index.id_of(Entity::Fact(FactId(3)), 2).unwrap();
        let a = index.id_of(Entity::Action(ActionId(3)), 2).unwrap();
        assert_ne!(f, a);
        assert_eq!(f.get(), 1);
        assert_eq!(a.get(), 2);
        assert_eq!(index.entity_of(2).unwrap(), (Entity::Action(ActionId(3)), 2));

        let aux = index.id_of(Entity::Aux(3), 2).unwrap();
        assert_eq!(aux.get(), 3);
        assert_eq!(index.entity_of(3).unwrap(), (Entity::Aux(3), 2));
        assert_eq!(Entity::Aux(3).to_string(), "aux3");
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut index = VariableIndex::new();
        index.id_of(Entity::Fact(FactId(0)), 0).unwrap();
        assert_eq!(index.entity_of(0), Err(EncodingError::UnknownVariable(0)));
        assert_eq!(index.entity_of(2), Err(EncodingError::UnknownVariable(2)));
        assert_eq!(index.get(Entity::Fact(FactId(0)), 1), None);
    }

    #[test]
    fn literals_carry_polarity() {
        let mut index = VariableIndex::new();
        index.id_of(Entity::Fact(FactId(0)), 0).unwrap();
        let v = index.id_of(Entity::Fact(FactId(1)), 0).unwrap();
        assert_eq!(v.lit(true), 2);
        assert_eq!(v.lit(false), -2);
        assert_eq!(v.to_string(), "v2");
    }
}
