//! Frame-relative dead zone and the ordered rules that classify a box
//! against it.

use crate::steering::PtzCommand;
use crate::tracker::BoundingBox;

const MIN_X_DIVISOR: f32 = 9.2;
const MAX_X_DIVISOR: f32 = 1.2;
const MIN_Y_DIVISOR: f32 = 18.0;
const MAX_Y_DIVISOR: f32 = 1.6;

/// Region of the frame in which the tracked face needs no camera motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadZone {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

/// One named entry of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct ZoneRule {
    pub name: &'static str,
    pub command: PtzCommand,
    matches: fn(&DeadZone, &BoundingBox) -> bool,
}

impl ZoneRule {
    pub fn matches(&self, zone: &DeadZone, bbox: &BoundingBox) -> bool {
        (self.matches)(zone, bbox)
    }
}

fn above(z: &DeadZone, b: &BoundingBox) -> bool {
    b.top < z.min_y
}

fn below(z: &DeadZone, b: &BoundingBox) -> bool {
    b.bottom > z.max_y
}

fn left_of(z: &DeadZone, b: &BoundingBox) -> bool {
    b.left < z.min_x
}

fn right_of(z: &DeadZone, b: &BoundingBox) -> bool {
    b.right > z.max_x
}

fn above_left(z: &DeadZone, b: &BoundingBox) -> bool {
    above(z, b) && left_of(z, b)
}

fn above_right(z: &DeadZone, b: &BoundingBox) -> bool {
    above(z, b) && right_of(z, b)
}

fn below_left(z: &DeadZone, b: &BoundingBox) -> bool {
    below(z, b) && left_of(z, b)
}

fn below_right(z: &DeadZone, b: &BoundingBox) -> bool {
    below(z, b) && right_of(z, b)
}

fn inside(z: &DeadZone, b: &BoundingBox) -> bool {
    b.left > z.min_x && b.right < z.max_x && b.top > z.min_y && b.bottom < z.max_y
}

/// Evaluated top to bottom, first match wins: inside, then diagonals, then
/// single axes.
static RULES: [ZoneRule; 9] = [
    ZoneRule {
        name: "inside",
        command: PtzCommand::Stop,
        matches: inside,
    },
    ZoneRule {
        name: "above_left",
        command: PtzCommand::UpLeft,
        matches: above_left,
    },
    ZoneRule {
        name: "above_right",
        command: PtzCommand::UpRight,
        matches: above_right,
    },
    ZoneRule {
        name: "below_left",
        command: PtzCommand::DownLeft,
        matches: below_left,
    },
    ZoneRule {
        name: "below_right",
        command: PtzCommand::DownRight,
        matches: below_right,
    },
    ZoneRule {
        name: "above",
        command: PtzCommand::Up,
        matches: above,
    },
    ZoneRule {
        name: "below",
        command: PtzCommand::Down,
        matches: below,
    },
    ZoneRule {
        name: "left",
        command: PtzCommand::Left,
        matches: left_of,
    },
    ZoneRule {
        name: "right",
        command: PtzCommand::Right,
        matches: right_of,
    },
];

impl DeadZone {
    /// Dead zone of a `width x height` frame.
    pub fn for_frame(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self {
            min_x: w / MIN_X_DIVISOR,
            max_x: w / MAX_X_DIVISOR,
            min_y: h / MIN_Y_DIVISOR,
            max_y: h / MAX_Y_DIVISOR,
        }
    }

    /// The classification table in evaluation order.
    pub fn rules() -> &'static [ZoneRule] {
        &RULES
    }

    /// First matching rule for `bbox`, or `None` when the box sits exactly on
    /// a boundary without crossing it.
    pub fn classify_rule(&self, bbox: &BoundingBox) -> Option<&'static ZoneRule> {
        RULES.iter().find(|rule| rule.matches(self, bbox))
    }

    pub fn classify(&self, bbox: &BoundingBox) -> Option<PtzCommand> {
        self.classify_rule(bbox).map(|rule| rule.command)
    }
}
