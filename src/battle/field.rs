use crate::battle::pokemon::EffectState;
use dex::Id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Battle-wide effects: at most one weather, at most one terrain, and any
/// number of pseudo-weathers such as Trick Room.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Field {
    pub weather: Option<Id>,
    pub weather_state: EffectState,
    pub terrain: Option<Id>,
    pub terrain_state: EffectState,
    pub pseudo_weather: BTreeMap<Id, EffectState>,
}

impl Field {
    pub fn new() -> Field {
        Field::default()
    }

    pub fn is_weather(&self, id: &str) -> bool {
        self.weather.as_ref().is_some_and(|w| *w == *id)
    }

    /// Replace the current weather. Setting the active weather again fails
    /// rather than refreshing its clock.
    pub fn set_weather(&mut self, id: Id, state: EffectState) -> bool {
        if self.is_weather(id.as_str()) {
            return false;
        }
        self.weather = Some(id);
        self.weather_state = state;
        true
    }

    pub fn clear_weather(&mut self) -> Option<Id> {
        self.weather_state = EffectState::default();
        self.weather.take()
    }

    pub fn is_terrain(&self, id: &str) -> bool {
        self.terrain.as_ref().is_some_and(|t| *t == *id)
    }

    pub fn set_terrain(&mut self, id: Id, state: EffectState) -> bool {
        if self.is_terrain(id.as_str()) {
            return false;
        }
        self.terrain = Some(id);
        self.terrain_state = state;
        true
    }

    pub fn clear_terrain(&mut self) -> Option<Id> {
        self.terrain_state = EffectState::default();
        self.terrain.take()
    }

    pub fn has_pseudo_weather(&self, id: &str) -> bool {
        self.pseudo_weather.contains_key(id)
    }

    pub fn add_pseudo_weather(&mut self, id: Id, state: EffectState) -> bool {
        if self.pseudo_weather.contains_key(&id) {
            return false;
        }
        self.pseudo_weather.insert(id, state);
        true
    }

    pub fn remove_pseudo_weather(&mut self, id: &str) -> Option<EffectState> {
        self.pseudo_weather.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn weather_replaces_but_never_refreshes() {
        let mut field = Field::new();
        assert!(field.set_weather(Id::new("raindance"), EffectState::new(1).with_duration(5)));
        assert!(!field.set_weather(Id::new("raindance"), EffectState::new(2).with_duration(5)));
        assert_eq!(field.weather_state.effect_order, 1);
        assert!(field.set_weather(Id::new("sunnyday"), EffectState::new(3).with_duration(5)));
        assert!(field.is_weather("sunnyday"));
        assert_eq!(field.clear_weather(), Some(Id::new("sunnyday")));
        assert!(field.weather.is_none());
    }

    #[test]
    fn pseudo_weathers_coexist() {
        let mut field = Field::new();
        field.add_pseudo_weather(Id::new("trickroom"), EffectState::new(1).with_duration(5));
        field.add_pseudo_weather(Id::new("gravity"), EffectState::new(2).with_duration(5));
        assert!(field.has_pseudo_weather("trickroom"));
        assert!(field.has_pseudo_weather("gravity"));
        assert!(field.remove_pseudo_weather("trickroom").is_some());
        assert!(!field.has_pseudo_weather("trickroom"));
    }
}
