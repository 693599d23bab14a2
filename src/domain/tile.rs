/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

use super::entity::EntityKind;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    /// Static terrain. The name comes from the level legend.
    Solid(String),
    /// Entity spawn marker. Cleared once the entity is instantiated.
    Spawn(EntityKind),
}

impl Tile {
    /// Does this tile block entity movement?
    pub fn is_solid(&self) -> bool {
        matches!(self, Tile::Solid(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Tile::Empty)
    }

    /// Entity kind if this is an unconsumed spawn marker.
    pub fn spawn_kind(&self) -> Option<EntityKind> {
        match self {
            Tile::Spawn(kind) => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_markers_are_not_solid() {
        assert!(!Tile::Spawn(EntityKind::Enemy).is_solid());
        assert_eq!(Tile::Spawn(EntityKind::Enemy).spawn_kind(), Some(EntityKind::Enemy));
        assert!(Tile::Solid("chair".into()).is_solid());
        assert!(Tile::default().is_empty());
    }
}
