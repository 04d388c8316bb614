use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Something the user can ask the demo to do.
///
/// The sampler consumes actions, never raw key codes, so the desktop app and
/// the headless CLI drive the same state logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Raise the train speed while held.
    Accelerate,
    /// Lower the train speed while held.
    Decelerate,
    /// Pause or resume on each press.
    TogglePause,
    /// Orbit the camera clockwise while held.
    RotateLeft,
    /// Orbit the camera counter-clockwise while held.
    RotateRight,
    /// Flip back-face culling on each press.
    ToggleCulling,
    /// Leave the frame loop after the current frame.
    Exit,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Accelerate,
        Action::Decelerate,
        Action::TogglePause,
        Action::RotateLeft,
        Action::RotateRight,
        Action::ToggleCulling,
        Action::Exit,
    ];

    /// Name used in config files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Action::Accelerate => "accelerate",
            Action::Decelerate => "decelerate",
            Action::TogglePause => "toggle_pause",
            Action::RotateLeft => "rotate_left",
            Action::RotateRight => "rotate_right",
            Action::ToggleCulling => "toggle_culling",
            Action::Exit => "exit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Action::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of actions held during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSnapshot {
    held: BTreeSet<Action>,
}

impl ActionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn press(&mut self, action: Action) {
        self.held.insert(action);
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.held.iter().copied()
    }
}

impl FromIterator<Action> for ActionSnapshot {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            held: iter.into_iter().collect(),
        }
    }
}

/// True when `action` went from released in `previous` to held in `current`.
pub fn pressed_edge(previous: &ActionSnapshot, current: &ActionSnapshot, action: Action) -> bool {
    current.is_held(action) && !previous.is_held(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for action in Action::ALL {
            assert_eq!(action.name().parse::<Action>(), Ok(action));
        }
        assert_eq!("Toggle-Pause".parse::<Action>(), Ok(Action::TogglePause));
        assert_eq!(
            "jump".parse::<Action>(),
            Err(UnknownAction("jump".to_string()))
        );
    }

    #[test]
    fn edge_only_on_transition() {
        let up = ActionSnapshot::new();
        let down: ActionSnapshot = [Action::TogglePause].into_iter().collect();
        assert!(pressed_edge(&up, &down, Action::TogglePause));
        assert!(!pressed_edge(&down, &down, Action::TogglePause));
        assert!(!pressed_edge(&down, &up, Action::TogglePause));
        assert!(!pressed_edge(&up, &up, Action::TogglePause));
    }

    #[test]
    fn edges_are_per_action() {
        let prev: ActionSnapshot = [Action::ToggleCulling].into_iter().collect();
        let curr: ActionSnapshot = [Action::ToggleCulling, Action::TogglePause]
            .into_iter()
            .collect();
        assert!(pressed_edge(&prev, &curr, Action::TogglePause));
        assert!(!pressed_edge(&prev, &curr, Action::ToggleCulling));
    }

    #[test]
    fn press_and_release() {
        let mut s = ActionSnapshot::new();
        s.press(Action::Accelerate);
        s.press(Action::Accelerate);
        assert!(s.is_held(Action::Accelerate));
        assert_eq!(s.iter().count(), 1);
        s.release(Action::Accelerate);
        assert!(s.is_empty());
    }

    #[test]
    fn snapshot_from_iter_dedups() {
        let s: ActionSnapshot = [Action::Exit, Action::Exit, Action::RotateLeft]
            .into_iter()
            .collect();
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![Action::RotateLeft, Action::Exit]);
    }
}
