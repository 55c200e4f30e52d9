use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::sym::types::signal::{MuxRole, SignalSym};

/// CAN frame defined in a symbol file (`[Name]` block).
///
/// A frame may be declared over several `[Name]` blocks (one per multiplexer
/// value); all of them are merged into the same `FrameSym`.
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct FrameSym {
    /// Frame name (text between the brackets).
    pub name: String,
    /// Numeric CAN ID.
    pub id: u32,
    /// ID Format (Standard or Extended)
    pub id_format: IdFormat,
    /// Payload length in bytes (`DLC=`).
    pub byte_length: u16,
    /// `CycleTime=` in milliseconds.
    pub cycle_time: Option<u32>,
    /// Section the frame was first declared in.
    pub direction: Direction,
    /// Trailing `//` comment of the `ID=` line.
    pub comment: String,
    /// Signals in declaration order. The multiplexer selector, if any, is among them.
    pub signals: Vec<SignalSym>,
    /// Multiplexer groups, keyed by selector value.
    pub mux_groups: BTreeMap<u32, MuxGroup>,
    /// Unrecognized `Key=value` lines of the frame block.
    pub attributes: BTreeMap<String, String>,
}

impl FrameSym {
    pub fn signal_by_name(&self, name: &str) -> Option<&SignalSym> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// The selector signal created by the first `Mux=` line.
    pub fn multiplexor(&self) -> Option<&SignalSym> {
        self.signals
            .iter()
            .find(|s| s.mux_role == MuxRole::Multiplexor)
    }

    pub fn is_multiplexed(&self) -> bool {
        !self.mux_groups.is_empty()
    }

    /// Name used for the selector signal of this frame.
    pub fn multiplexor_name(&self) -> String {
        format!("{}_MUX", self.name)
    }
}

/// One claimed multiplexer value of a frame (a `Mux=` line).
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct MuxGroup {
    /// Group name given on the `Mux=` line.
    pub name: String,
    /// Line of the `Mux=` declaration that claimed the value.
    pub line: usize,
    /// Trailing comment of that `Mux=` line.
    pub comment: String,
}

#[derive(Default, Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum IdFormat {
    #[default]
    Standard,
    Extended,
}

/// Message-bearing section a frame belongs to.
#[derive(Default, Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Direction {
    Send,
    Receive,
    #[default]
    SendReceive,
}

impl Direction {
    pub fn header(&self) -> &'static str {
        match self {
            Direction::Send => "{SEND}",
            Direction::Receive => "{RECEIVE}",
            Direction::SendReceive => "{SENDRECEIVE}",
        }
    }
}
