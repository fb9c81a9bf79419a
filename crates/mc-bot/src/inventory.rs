//! The bot's own inventory.
//!
//! Slots are addressed by inventory index: 0..9 hotbar, 9..36 main,
//! 36..40 armor, 40 offhand. The player's container (window 0) numbers the
//! same slots differently; see [`to_network_slot`].

use mc_protocol::{ItemStack, Slot};
use tracing::debug;

pub const HOTBAR_SIZE: usize = 9;
pub const OFFHAND: usize = 40;
pub const INVENTORY_SIZE: usize = 41;

/// Window id of the player's own container.
pub const PLAYER_WINDOW: i32 = 0;

/// Container slot of an inventory index in window 0.
pub const fn to_network_slot(index: usize) -> Option<i16> {
    match index {
        0..9 => Some(index as i16 + 36),
        9..36 => Some(index as i16),
        36..40 => Some(44 - index as i16),
        OFFHAND => Some(45),
        _ => None,
    }
}

/// Inventory index of a container slot in window 0.
pub const fn from_network_slot(slot: i16) -> Option<usize> {
    match slot {
        5..9 => Some(44 - slot as usize),
        9..36 => Some(slot as usize),
        36..45 => Some(slot as usize - 36),
        45 => Some(OFFHAND),
        _ => None,
    }
}

/// How to get an item into the main hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Already on the hotbar; change the selected slot.
    Hotbar(usize),
    /// In the main inventory; swap it with the selected hotbar slot.
    Swap { index: usize, hotbar: usize },
}

#[derive(Debug, Clone)]
pub struct Inventory {
    slots: [Option<ItemStack>; INVENTORY_SIZE],
    selected: usize,
    state_id: i32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            slots: [None; INVENTORY_SIZE],
            selected: 0,
            state_id: 0,
        }
    }
}

impl Inventory {
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// Last container state id the server sent for window 0.
    pub const fn state_id(&self) -> i32 {
        self.state_id
    }

    pub fn get(&self, index: usize) -> Option<ItemStack> {
        self.slots.get(index).copied().flatten()
    }

    pub fn set(&mut self, index: usize, stack: Option<ItemStack>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = stack;
        }
    }

    pub fn set_selected(&mut self, hotbar: usize) {
        if hotbar < HOTBAR_SIZE {
            self.selected = hotbar;
        }
    }

    pub fn main_hand(&self) -> Option<ItemStack> {
        self.get(self.selected)
    }

    pub fn off_hand(&self) -> Option<ItemStack> {
        self.get(OFFHAND)
    }

    /// A single window-0 slot update.
    pub fn apply_slot(&mut self, state_id: i32, network_slot: i16, slot: Slot) {
        self.state_id = state_id;
        if let Some(index) = from_network_slot(network_slot) {
            self.set(index, slot.stack());
        }
    }

    /// Full window-0 contents.
    ///
    /// When `complete` is false only the leading `slots` could be read; every
    /// later slot is cleared until the server updates it individually.
    pub fn apply_contents(&mut self, state_id: i32, slots: &[Slot], complete: bool) {
        self.state_id = state_id;
        for (network_slot, slot) in slots.iter().enumerate() {
            if let Some(index) = from_network_slot(network_slot as i16) {
                self.set(index, slot.stack());
            }
        }

        if complete {
            debug!(slots = slots.len(), "inventory contents");
            return;
        }

        let unread = (slots.len()..=45).filter_map(|slot| from_network_slot(slot as i16));
        for index in unread {
            self.set(index, None);
        }
        debug!(read = slots.len(), "inventory contents truncated at a slot with components");
    }

    fn holds(stack: Option<ItemStack>, item: i32) -> bool {
        stack.is_some_and(|stack| stack.item == item && stack.count > 0)
    }

    /// Whether `item` is in either hand.
    pub fn is_holding(&self, item: i32) -> bool {
        Self::holds(self.main_hand(), item) || Self::holds(self.off_hand(), item)
    }

    /// First inventory index below `scope` holding `item`.
    pub fn find(&self, item: i32, scope: usize) -> Option<usize> {
        (0..scope.min(OFFHAND)).find(|&index| Self::holds(self.get(index), item))
    }

    pub fn selection(&self, item: i32, scope: usize) -> Option<Selection> {
        let index = self.find(item, scope)?;
        Some(if index < HOTBAR_SIZE {
            Selection::Hotbar(index)
        } else {
            Selection::Swap {
                index,
                hotbar: self.selected,
            }
        })
    }

    /// Mirror a selection locally until the server confirms it.
    pub fn apply(&mut self, selection: Selection) {
        match selection {
            Selection::Hotbar(hotbar) => self.set_selected(hotbar),
            Selection::Swap { index, hotbar } => self.slots.swap(index, hotbar),
        }
    }
}
