//! DatabaseSym model (SlotMap-backed).
//!
//! In-memory result of parsing a symbol file. Frames live in a **SlotMap**
//! arena with stable [`FrameKey`]s; `frames_order` keeps declaration order,
//! which is also the order used when writing the file back.
//! Frame names are looked up case-insensitively.

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use std::collections::{BTreeMap, HashMap};

use crate::sym::types::frame::{Direction, FrameSym};

// --- Stable keys (SlotMap) ---
new_key_type! { pub struct FrameKey; }

/// In-memory representation of a symbol file.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseSym {
    // --- General information ---
    /// `FormatVersion=` header value.
    pub format_version: String,
    /// `Title=` header value (without quotes).
    pub title: String,
    /// Other `Key=value` lines found before the first section.
    pub attributes: BTreeMap<String, String>,

    // --- Main storage (stable-key map) ---
    pub frames: SlotMap<FrameKey, FrameSym>,
    pub frames_order: Vec<FrameKey>,

    /// Enums declared in the `{ENUMS}` section, by name.
    pub value_tables: BTreeMap<String, ValueTable>,

    // --- Lookups (case-normalized) ---
    pub(crate) frame_key_by_name: HashMap<String, FrameKey>, // lower(name) → FrameKey
}

impl DatabaseSym {
    // ------------- Frames ------------
    /// Returns the frame called `name`, creating it in `direction` if absent.
    pub(crate) fn add_frame_if_absent(&mut self, name: &str, direction: Direction) -> FrameKey {
        if let Some(key) = self.get_frame_key_by_name(name) {
            return key;
        }
        let key: FrameKey = self.frames.insert(FrameSym {
            name: name.to_string(),
            direction,
            ..Default::default()
        });
        self.frames_order.push(key);
        self.frame_key_by_name.insert(name.to_lowercase(), key);
        key
    }

    pub fn get_frame_key_by_name(&self, name: &str) -> Option<FrameKey> {
        self.frame_key_by_name.get(&name.to_lowercase()).copied()
    }

    pub fn get_frame_by_key(&self, key: FrameKey) -> Option<&FrameSym> {
        self.frames.get(key)
    }

    pub fn get_frame_by_key_mut(&mut self, key: FrameKey) -> Option<&mut FrameSym> {
        self.frames.get_mut(key)
    }

    /// Returns a `&FrameSym` given the name (case-insensitive).
    pub fn get_frame_by_name(&self, name: &str) -> Option<&FrameSym> {
        let key: FrameKey = self.get_frame_key_by_name(name)?;
        self.get_frame_by_key(key)
    }

    /// Returns a `&mut FrameSym` given the name (case-insensitive).
    pub fn get_frame_by_name_mut(&mut self, name: &str) -> Option<&mut FrameSym> {
        let key: FrameKey = self.get_frame_key_by_name(name)?;
        self.get_frame_by_key_mut(key)
    }

    /// Returns the first frame (in declaration order) with the given CAN ID.
    pub fn get_frame_by_id(&self, id: u32) -> Option<&FrameSym> {
        self.iter_frames().find(|f| f.id == id)
    }

    /// Iterates frames in declaration order.
    pub fn iter_frames(&self) -> impl Iterator<Item = &FrameSym> + '_ {
        self.frames_order
            .iter()
            .filter_map(move |&key| self.frames.get(key))
    }

    // ------------- Value tables ------------
    pub fn value_table(&self, name: &str) -> Option<&ValueTable> {
        self.value_tables.get(name)
    }

    /// Registers an enum. A later declaration with the same name replaces the earlier one.
    pub(crate) fn add_value_table(&mut self, table: ValueTable) {
        self.value_tables.insert(table.name.clone(), table);
    }
}

/// Named enum of a symbol file: `enum Name(0="Off", 1="On")`.
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ValueTable {
    pub name: String,
    /// `(code, label)` pairs in declaration order. Codes are unique.
    pub entries: Vec<(i64, String)>,
}

impl ValueTable {
    pub fn get(&self, code: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
