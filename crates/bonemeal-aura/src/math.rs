//! Block lattice and continuous-space primitives.

use core::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A point in continuous world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn distance_sq(self, other: Self) -> f64 {
        let d = other - self;
        d.x * d.x + d.y * d.y + d.z * d.z
    }

    /// Point `t` of the way from `self` to `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// A unit cell of the block grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell containing `point`.
    #[must_use]
    pub fn containing(point: Vec3) -> Self {
        Self::new(
            point.x.floor() as i32,
            point.y.floor() as i32,
            point.z.floor() as i32,
        )
    }

    #[must_use]
    pub fn center(self) -> Vec3 {
        Vec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }

    /// Squared distance from the center of this cell to `point`.
    #[must_use]
    pub fn distance_sq_to(self, point: Vec3) -> f64 {
        self.center().distance_sq(point)
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Every cell in the cube `self ± radius`, bounds inclusive.
    pub fn cube(self, radius: i32) -> impl Iterator<Item = BlockPos> {
        (-radius..=radius).flat_map(move |dx| {
            (-radius..=radius).flat_map(move |dy| {
                (-radius..=radius).map(move |dz| self.offset(dx, dy, dz))
            })
        })
    }
}

/// One of the six faces of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Face {
    Down = 0,
    Up = 1,
    North = 2,
    South = 3,
    West = 4,
    East = 5,
}

impl Face {
    /// All faces, in the order interaction attempts try them.
    pub const ALL: [Face; 6] = [
        Face::Down,
        Face::Up,
        Face::North,
        Face::South,
        Face::West,
        Face::East,
    ];

    /// Outward unit normal.
    #[must_use]
    pub const fn normal(self) -> (i32, i32, i32) {
        match self {
            Self::Down => (0, -1, 0),
            Self::Up => (0, 1, 0),
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::West => (-1, 0, 0),
            Self::East => (1, 0, 0),
        }
    }

    /// Midpoint of this face on the cell at `pos`.
    #[must_use]
    pub fn midpoint(self, pos: BlockPos) -> Vec3 {
        let (nx, ny, nz) = self.normal();
        pos.center() + Vec3::new(f64::from(nx), f64::from(ny), f64::from(nz)) * 0.5
    }

    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }
}

/// Look direction in degrees, Minecraft convention (yaw 0 faces +Z, pitch 90 faces down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Rotation {
    /// Rotation that points from `eye` at `target`.
    #[must_use]
    pub fn toward(eye: Vec3, target: Vec3) -> Self {
        let d = target - eye;
        let horizontal = d.x.hypot(d.z);

        let yaw = d.z.atan2(d.x).to_degrees() - 90.0;
        let pitch = -d.y.atan2(horizontal).to_degrees();

        Self {
            yaw: wrap_degrees(yaw) as f32,
            pitch: pitch as f32,
        }
    }
}

/// Wraps an angle into `[-180, 180)`.
#[must_use]
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn containing_floors_negative_coordinates() {
        assert_eq!(
            BlockPos::containing(Vec3::new(-0.5, 64.9, 3.0)),
            BlockPos::new(-1, 64, 3)
        );
    }

    #[test]
    fn distance_is_measured_from_center() {
        let pos = BlockPos::new(0, 0, 0);
        assert_eq!(pos.distance_sq_to(Vec3::new(0.5, 0.5, 0.5)), 0.0);
        assert_eq!(pos.distance_sq_to(Vec3::new(0.5, 2.5, 0.5)), 4.0);
    }

    #[test]
    fn cube_is_inclusive() {
        let cells: Vec<_> = BlockPos::new(10, 10, 10).cube(1).collect();
        assert_eq!(cells.len(), 27);
        assert!(cells.contains(&BlockPos::new(9, 9, 9)));
        assert!(cells.contains(&BlockPos::new(11, 11, 11)));
    }

    #[test]
    fn face_order_matches_wire_ids() {
        for (index, face) in Face::ALL.iter().enumerate() {
            assert_eq!(face.id() as usize, index);
        }
    }

    #[test]
    fn face_midpoints_sit_on_the_boundary() {
        let pos = BlockPos::new(2, 5, -3);
        assert_eq!(Face::Up.midpoint(pos), Vec3::new(2.5, 6.0, -2.5));
        assert_eq!(Face::West.midpoint(pos), Vec3::new(2.0, 5.5, -2.5));
        assert_eq!(Face::North.midpoint(pos), Vec3::new(2.5, 5.5, -3.0));
    }

    #[test]
    fn rotation_follows_minecraft_convention() {
        let eye = Vec3::ZERO;

        let south = Rotation::toward(eye, Vec3::new(0.0, 0.0, 1.0));
        assert!(close(south.yaw, 0.0));
        assert!(close(south.pitch, 0.0));

        let west = Rotation::toward(eye, Vec3::new(-1.0, 0.0, 0.0));
        assert!(close(west.yaw, 90.0));

        let north = Rotation::toward(eye, Vec3::new(0.0, 0.0, -1.0));
        assert!(close(north.yaw, -180.0));

        let down = Rotation::toward(eye, Vec3::new(0.0, -1.0, 0.0));
        assert!(close(down.pitch, 90.0));
    }

    #[test]
    fn wrap_degrees_range() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), -180.0);
        assert_eq!(wrap_degrees(45.0), 45.0);
    }
}
