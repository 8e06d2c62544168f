use crate::navigate::occupancy::OccupancyVector;
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Instruction {
    #[serde(rename = "Move forward")]
    MoveForward,
    #[serde(rename = "Turn left")]
    TurnLeft,
    #[serde(rename = "Turn right")]
    TurnRight,
    #[serde(rename = "Choose clearer side")]
    ChooseClearerSide,
    #[serde(rename = "Stop")]
    Stop,
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Instruction {
    pub const ALL: [Instruction; 5] = [
        Instruction::MoveForward,
        Instruction::TurnLeft,
        Instruction::TurnRight,
        Instruction::ChooseClearerSide,
        Instruction::Stop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Instruction::MoveForward => "Move forward",
            Instruction::TurnLeft => "Turn left",
            Instruction::TurnRight => "Turn right",
            Instruction::ChooseClearerSide => "Choose clearer side",
            Instruction::Stop => "Stop",
        }
    }

    /// Maps lane occupancy to an instruction, first matching rule wins:
    ///
    /// 1. center clear: move forward
    /// 2. only the right side blocked: turn left
    /// 3. only the left side blocked: turn right
    /// 4. both sides clear: leave the choice to the user
    /// 5. everything blocked: stop
    pub fn decide(occupancy: OccupancyVector) -> Self {
        let OccupancyVector {
            left_blocked,
            center_blocked,
            right_blocked,
        } = occupancy;

        if !center_blocked {
            return Instruction::MoveForward;
        }
        if !left_blocked && right_blocked {
            return Instruction::TurnLeft;
        }
        if left_blocked && !right_blocked {
            return Instruction::TurnRight;
        }
        if !left_blocked && !right_blocked {
            return Instruction::ChooseClearerSide;
        }
        Instruction::Stop
    }
}

pub fn decide(occupancy: OccupancyVector) -> Instruction {
    Instruction::decide(occupancy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_table_covers_every_combination() {
        let table = [
            ((false, false, false), Instruction::MoveForward),
            ((true, false, false), Instruction::MoveForward),
            ((false, false, true), Instruction::MoveForward),
            ((true, false, true), Instruction::MoveForward),
            ((false, true, true), Instruction::TurnLeft),
            ((true, true, false), Instruction::TurnRight),
            ((false, true, false), Instruction::ChooseClearerSide),
            ((true, true, true), Instruction::Stop),
        ];

        for ((left, center, right), expected) in table {
            let occupancy = OccupancyVector::new(left, center, right);
            assert_eq!(decide(occupancy), expected, "occupancy {occupancy}");
        }
    }

    #[test]
    fn renders_instruction_text() {
        let rendered: Vec<_> = Instruction::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "Move forward",
                "Turn left",
                "Turn right",
                "Choose clearer side",
                "Stop"
            ]
        );
        assert_eq!(
            serde_json::to_string(&Instruction::ChooseClearerSide).unwrap(),
            "\"Choose clearer side\""
        );
    }
}
