//! The bot's player, driven by the aura through [`PlayerControl`].
//!
//! Actions become serverbound packets queued in an outbox; the connection
//! loop drains it after each tick.

use bonemeal_aura::{Interaction, PlayerControl, Rotation, Vec3};
use mc_protocol::Position;
use mc_protocol::clientbound::{PlayerPosition, RelativeFlags};
use mc_protocol::serverbound::{
    ClickMode, ContainerClick, Hand, MovePlayerPosRot, MovePlayerRot, Serverbound,
    SetCarriedItem, Swing, UseItemOn,
};
use tracing::debug;

use crate::inventory::{Inventory, PLAYER_WINDOW, Selection, to_network_slot};

pub const EYE_HEIGHT: f64 = 1.62;

#[derive(Debug)]
pub struct Player {
    /// Feet position.
    pub position: Vec3,
    pub rotation: Rotation,
    pub on_ground: bool,
    pub inventory: Inventory,
    bone_meal_item: Option<i32>,
    item_use_cooldown: u32,
    sequence: i32,
    outbox: Vec<Serverbound>,
}

impl Player {
    pub fn new(bone_meal_item: Option<i32>) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Rotation::default(),
            on_ground: true,
            inventory: Inventory::default(),
            bone_meal_item,
            item_use_cooldown: 0,
            sequence: 0,
            outbox: Vec::new(),
        }
    }

    /// Advance per-tick timers.
    pub fn tick(&mut self) {
        self.item_use_cooldown = self.item_use_cooldown.saturating_sub(1);
    }

    pub fn queue(&mut self, packet: impl Into<Serverbound>) {
        self.outbox.push(packet.into());
    }

    pub fn drain_outbox(&mut self) -> Vec<Serverbound> {
        std::mem::take(&mut self.outbox)
    }

    /// Apply a server teleport and queue the confirmation position.
    pub fn teleport(&mut self, teleport: &PlayerPosition) {
        let relative = teleport.relative;
        let axis = |flag, current: f64, value: f64| {
            if relative.contains(flag) { current + value } else { value }
        };

        self.position = Vec3::new(
            axis(RelativeFlags::X, self.position.x, teleport.x),
            axis(RelativeFlags::Y, self.position.y, teleport.y),
            axis(RelativeFlags::Z, self.position.z, teleport.z),
        );
        self.rotation = Rotation {
            yaw: axis(RelativeFlags::YAW, self.rotation.yaw.into(), teleport.yaw.into()) as f32,
            pitch: axis(RelativeFlags::PITCH, self.rotation.pitch.into(), teleport.pitch.into())
                as f32,
        };

        self.queue(MovePlayerPosRot {
            x: self.position.x,
            y: self.position.y,
            z: self.position.z,
            yaw: self.rotation.yaw,
            pitch: self.rotation.pitch,
            on_ground: self.on_ground,
        });
    }

    fn holds_in(&self, hand: Hand) -> bool {
        let stack = match hand {
            Hand::MainHand => self.inventory.main_hand(),
            Hand::OffHand => self.inventory.off_hand(),
        };
        stack.is_some_and(|stack| Some(stack.item) == self.bone_meal_item)
    }
}

impl PlayerControl for Player {
    fn eye_position(&self) -> Vec3 {
        self.position + Vec3::new(0.0, EYE_HEIGHT, 0.0)
    }

    fn item_use_cooldown(&self) -> u32 {
        self.item_use_cooldown
    }

    fn set_item_use_cooldown(&mut self, ticks: u32) {
        self.item_use_cooldown = ticks;
    }

    fn is_holding_bone_meal(&self) -> bool {
        self.bone_meal_item
            .is_some_and(|item| self.inventory.is_holding(item))
    }

    fn select_item(&mut self, scope: usize) {
        let Some(item) = self.bone_meal_item else {
            return;
        };
        let Some(selection) = self.inventory.selection(item, scope) else {
            return;
        };
        debug!(?selection, "selecting bone meal");

        match selection {
            Selection::Hotbar(hotbar) => self.queue(SetCarriedItem {
                slot: hotbar as i16,
            }),
            Selection::Swap { index, hotbar } => {
                let Some(slot) = to_network_slot(index) else {
                    return;
                };
                self.queue(ContainerClick {
                    window_id: PLAYER_WINDOW,
                    state_id: self.inventory.state_id(),
                    slot,
                    button: hotbar as i8,
                    mode: ClickMode::Swap,
                });
            }
        }
        self.inventory.apply(selection);
    }

    fn face_toward(&mut self, target: Vec3) {
        self.rotation = Rotation::toward(self.eye_position(), target);
        self.queue(MovePlayerRot {
            yaw: self.rotation.yaw,
            pitch: self.rotation.pitch,
            on_ground: self.on_ground,
        });
    }

    fn use_item_on(&mut self, interaction: Interaction) {
        let hand = if self.holds_in(Hand::MainHand) {
            Hand::MainHand
        } else {
            Hand::OffHand
        };
        let pos = interaction.pos;
        let hit = interaction.hit;
        self.sequence += 1;

        self.queue(UseItemOn {
            hand,
            position: Position::new(pos.x, pos.y, pos.z),
            face: i32::from(interaction.face.id()),
            cursor: [
                (hit.x - f64::from(pos.x)) as f32,
                (hit.y - f64::from(pos.y)) as f32,
                (hit.z - f64::from(pos.z)) as f32,
            ],
            inside_block: false,
            world_border_hit: false,
            sequence: self.sequence,
        });
    }

    fn swing_hand(&mut self) {
        self.queue(Swing {
            hand: Hand::MainHand,
        });
    }
}
