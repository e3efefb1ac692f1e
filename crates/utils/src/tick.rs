use bevy::prelude::*;

/// Session tick counter. One `App::update()` of the simulation advances it by one.
#[derive(Resource, Default, Hash, Clone, Copy, PartialEq, Eq)]
pub struct TickCount {
    pub tick: u64,
}

impl std::fmt::Display for TickCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.tick)
    }
}
