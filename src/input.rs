//! Input mapping
//!
//! Host event handlers write into an [`InputState`] between frames. The frame
//! driver samples it once per frame with [`InputState::take_tick_input`].

use glam::Vec2;

use crate::consts::*;
use crate::sim::{Direction, GamePhase, SimulationWorld, TickInput};
use crate::sim::store::Entity;

/// Held-input actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ShootUp,
    ShootDown,
    ShootLeft,
    ShootRight,
}

impl Action {
    fn index(self) -> usize {
        self as usize
    }

    pub fn shoot(dir: Direction) -> Self {
        match dir {
            Direction::Up => Action::ShootUp,
            Direction::Down => Action::ShootDown,
            Direction::Left => Action::ShootLeft,
            Direction::Right => Action::ShootRight,
        }
    }
}

/// One-shot commands, consumed by the next frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    TogglePause,
    /// Pause if playing, never resumes
    Pause,
    Restart,
    Menu,
}

/// Anything that can report held actions and a pointer
pub trait InputSource {
    fn is_active(&self, action: Action) -> bool;

    /// Arena-space pointer position while the pointer is held
    fn pointer_target(&self) -> Option<Vec2>;

    /// Held movement resolved to a single axis
    fn move_direction(&self) -> Option<Direction> {
        resolve_move(
            self.is_active(Action::MoveUp),
            self.is_active(Action::MoveDown),
            self.is_active(Action::MoveLeft),
            self.is_active(Action::MoveRight),
        )
    }

    /// First held shot, checked up, down, left, right
    fn shoot_direction(&self) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|dir| self.is_active(Action::shoot(*dir)))
    }
}

/// Opposing directions cancel. With both axes held the horizontal one wins.
pub fn resolve_move(up: bool, down: bool, left: bool, right: bool) -> Option<Direction> {
    let x = i32::from(right) - i32::from(left);
    let y = i32::from(down) - i32::from(up);
    match (x, y) {
        (1, _) => Some(Direction::Right),
        (-1, _) => Some(Direction::Left),
        (_, 1) => Some(Direction::Down),
        (_, -1) => Some(Direction::Up),
        _ => None,
    }
}

/// Map a DOM-style key name to a held action.
///
/// WASD moves and IJKL shoots. Arrows move, or shoot in arrow-shoot mode.
pub fn action_for_key(key: &str, arrow_shoot_mode: bool) -> Option<Action> {
    let arrow = |mv: Action, shoot: Action| Some(if arrow_shoot_mode { shoot } else { mv });
    match key.to_ascii_lowercase().as_str() {
        "w" => Some(Action::MoveUp),
        "s" => Some(Action::MoveDown),
        "a" => Some(Action::MoveLeft),
        "d" => Some(Action::MoveRight),
        "i" => Some(Action::ShootUp),
        "k" => Some(Action::ShootDown),
        "j" => Some(Action::ShootLeft),
        "l" => Some(Action::ShootRight),
        "arrowup" => arrow(Action::MoveUp, Action::ShootUp),
        "arrowdown" => arrow(Action::MoveDown, Action::ShootDown),
        "arrowleft" => arrow(Action::MoveLeft, Action::ShootLeft),
        "arrowright" => arrow(Action::MoveRight, Action::ShootRight),
        _ => None,
    }
}

/// Map a key to a one-shot command
pub fn command_for_key(key: &str) -> Option<Command> {
    match key.to_ascii_lowercase().as_str() {
        " " | "enter" => Some(Command::Start),
        "p" | "escape" => Some(Command::TogglePause),
        "r" => Some(Command::Restart),
        "m" => Some(Command::Menu),
        _ => None,
    }
}

/// Accumulated host input between two frames
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: [bool; 8],
    pointer: Option<Vec2>,
    pointer_down: bool,
    commands: Vec<Command>,
    pub arrow_shoot_mode: bool,
}

impl InputState {
    pub fn new(arrow_shoot_mode: bool) -> Self {
        Self {
            arrow_shoot_mode,
            ..Self::default()
        }
    }

    pub fn press(&mut self, action: Action) {
        self.held[action.index()] = true;
    }

    pub fn release(&mut self, action: Action) {
        self.held[action.index()] = false;
    }

    /// Key pressed. Returns true if the key is bound.
    pub fn key_down(&mut self, key: &str) -> bool {
        if let Some(command) = command_for_key(key) {
            self.push_command(command);
            return true;
        }
        match action_for_key(key, self.arrow_shoot_mode) {
            Some(action) => {
                self.press(action);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(action) = action_for_key(key, self.arrow_shoot_mode) {
            self.release(action);
        }
    }

    pub fn pointer_moved(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
    }

    pub fn pointer_pressed(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
        self.pointer_down = true;
    }

    pub fn pointer_released(&mut self) {
        self.pointer_down = false;
    }

    pub fn push_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Drop every held action (window lost focus)
    pub fn release_all(&mut self) {
        self.held = [false; 8];
        self.pointer_down = false;
    }

    /// Sample held input and drain queued commands
    pub fn take_tick_input(&mut self) -> TickInput {
        let mut input = TickInput {
            move_dir: self.move_direction(),
            shoot_dir: self.shoot_direction(),
            aim: self.pointer_target(),
            ..Default::default()
        };
        for command in self.commands.drain(..) {
            match command {
                Command::Start => input.start = true,
                // Two toggles in one frame cancel out
                Command::TogglePause => input.pause = !input.pause,
                Command::Pause => input.auto_pause = true,
                Command::Restart => input.restart = true,
                Command::Menu => input.menu = true,
            }
        }
        input
    }
}

impl InputSource for InputState {
    fn is_active(&self, action: Action) -> bool {
        self.held[action.index()]
    }

    fn pointer_target(&self) -> Option<Vec2> {
        if self.pointer_down { self.pointer } else { None }
    }
}

/// Distance at which the autopilot backs away from an enemy
const AUTOPILOT_PANIC_RANGE: f32 = 140.0;

/// Demo AI: starts runs, shoots the nearest enemy and keeps its distance
pub fn autopilot(world: &SimulationWorld) -> TickInput {
    match world.phase() {
        GamePhase::Menu | GamePhase::GameOver => {
            return TickInput {
                start: true,
                ..Default::default()
            };
        }
        GamePhase::Paused => {
            return TickInput {
                pause: true,
                ..Default::default()
            };
        }
        GamePhase::Playing => {}
    }

    let pos = world.player.pos;
    let nearest = world
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            a.pos
                .distance_squared(pos)
                .partial_cmp(&b.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let centre = Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0);
    match nearest {
        Some(enemy) => {
            let to_enemy = enemy.pos - pos;
            let move_dir = if to_enemy.length() < AUTOPILOT_PANIC_RANGE {
                // Step off the enemy's line, back toward open space
                let away = pos - enemy.pos + (centre - pos) * 0.25;
                Direction::from_delta(away)
            } else {
                None
            };
            TickInput {
                move_dir,
                shoot_dir: Direction::from_delta(to_enemy),
                ..Default::default()
            }
        }
        None => {
            let home = centre - pos;
            TickInput {
                move_dir: if home.length() > 60.0 {
                    Direction::from_delta(home)
                } else {
                    None
                },
                ..Default::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick;
    use crate::tuning::Tuning;

    #[test]
    fn test_resolve_move() {
        assert_eq!(resolve_move(true, true, false, false), None);
        assert_eq!(resolve_move(false, false, true, true), None);
        assert_eq!(resolve_move(true, false, false, false), Some(Direction::Up));
        // Diagonal: vertical dropped
        assert_eq!(resolve_move(true, false, false, true), Some(Direction::Right));
        // Cancelled horizontal leaves vertical
        assert_eq!(resolve_move(false, true, true, true), Some(Direction::Down));
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(action_for_key("w", false), Some(Action::MoveUp));
        assert_eq!(action_for_key("W", false), Some(Action::MoveUp));
        assert_eq!(action_for_key("ArrowLeft", false), Some(Action::MoveLeft));
        assert_eq!(action_for_key("ArrowLeft", true), Some(Action::ShootLeft));
        assert_eq!(action_for_key("l", true), Some(Action::ShootRight));
        assert_eq!(action_for_key("q", false), None);
        assert_eq!(command_for_key("Escape"), Some(Command::TogglePause));
        assert_eq!(command_for_key(" "), Some(Command::Start));
    }

    #[test]
    fn test_shoot_priority() {
        let mut state = InputState::default();
        state.press(Action::ShootRight);
        state.press(Action::ShootDown);
        assert_eq!(state.shoot_direction(), Some(Direction::Down));
        state.press(Action::ShootUp);
        assert_eq!(state.shoot_direction(), Some(Direction::Up));
    }

    #[test]
    fn test_take_tick_input_drains_commands() {
        let mut state = InputState::default();
        state.key_down("d");
        state.key_down(" ");
        let input = state.take_tick_input();
        assert!(input.start);
        assert_eq!(input.move_dir, Some(Direction::Right));

        // Held keys persist, commands don't
        let input = state.take_tick_input();
        assert!(!input.start);
        assert_eq!(input.move_dir, Some(Direction::Right));

        state.key_up("d");
        assert_eq!(state.take_tick_input().move_dir, None);
    }

    #[test]
    fn test_double_toggle_cancels() {
        let mut state = InputState::default();
        state.push_command(Command::TogglePause);
        state.push_command(Command::TogglePause);
        assert!(!state.take_tick_input().pause);
    }

    #[test]
    fn test_pause_command_is_idempotent() {
        let mut state = InputState::default();
        state.push_command(Command::Pause);
        state.push_command(Command::Pause);
        let input = state.take_tick_input();
        assert!(input.auto_pause);
        assert!(!input.pause);
    }

    #[test]
    fn test_pointer_only_while_held() {
        let mut state = InputState::default();
        state.pointer_moved(Vec2::new(10.0, 10.0));
        assert_eq!(state.pointer_target(), None);
        state.pointer_pressed(Vec2::new(20.0, 30.0));
        assert_eq!(state.take_tick_input().aim, Some(Vec2::new(20.0, 30.0)));
        state.pointer_released();
        assert_eq!(state.take_tick_input().aim, None);
    }

    #[test]
    fn test_release_all() {
        let mut state = InputState::new(true);
        state.key_down("ArrowUp");
        assert_eq!(state.shoot_direction(), Some(Direction::Up));
        state.release_all();
        assert_eq!(state.shoot_direction(), None);
    }

    #[test]
    fn test_autopilot_starts_and_scores() {
        let mut world = SimulationWorld::new(77, Tuning::default());
        let input = autopilot(&world);
        assert!(input.start);

        let mut kills = 0;
        for _ in 0..1200 {
            let input = autopilot(&world);
            tick(&mut world, &input, 1.0 / 30.0);
            kills += world
                .events
                .iter()
                .filter(|e| matches!(e, crate::sim::GameEvent::EnemyKilled { .. }))
                .count();
        }
        assert!(kills > 0);
    }
}
