use std::fmt;

/// Fixed pan/tilt speed for every move; steering is bang-bang, not proportional.
pub const STEER_SPEED: f32 = 0.1;

/// A direction a discrete-move PTZ head can be told to travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

/// Steering command emitted by dead-zone classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PtzCommand {
    Stop,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::UpLeft => "up_left",
            Self::UpRight => "up_right",
            Self::DownLeft => "down_left",
            Self::DownRight => "down_right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PtzCommand {
    /// Travel direction, `None` for [`PtzCommand::Stop`].
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Stop => None,
            Self::Up => Some(Direction::Up),
            Self::Down => Some(Direction::Down),
            Self::Left => Some(Direction::Left),
            Self::Right => Some(Direction::Right),
            Self::UpLeft => Some(Direction::UpLeft),
            Self::UpRight => Some(Direction::UpRight),
            Self::DownLeft => Some(Direction::DownLeft),
            Self::DownRight => Some(Direction::DownRight),
        }
    }

    /// `(pan_speed, tilt_speed)` for continuous-speed heads.
    ///
    /// Positive pan turns left, positive tilt turns up.
    pub fn speeds(self) -> (f32, f32) {
        let s = STEER_SPEED;
        match self {
            Self::Stop => (0.0, 0.0),
            Self::Up => (0.0, s),
            Self::Down => (0.0, -s),
            Self::Left => (s, 0.0),
            Self::Right => (-s, 0.0),
            Self::UpLeft => (s, s),
            Self::UpRight => (-s, s),
            Self::DownLeft => (s, -s),
            Self::DownRight => (-s, -s),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.direction().map_or("stop", Direction::as_str)
    }
}

impl fmt::Display for PtzCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
