use std::ops::Sub;

/*
Requirements for Memory Compatibility with WGPU:
   1. Standard layout (like C structs).
   2. Can be safely cast to [f32; N] or bytes.
*/

#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vec3([f32; 3]);

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3([x, y, z])
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x() * other.x() + self.y() * other.y() + self.z() * other.z()
    }

    pub fn cross(&self, other: &Self) -> Self {
        Vec3([
            self.y() * other.z() - self.z() * other.y(),
            self.z() * other.x() - self.x() * other.z(),
            self.x() * other.y() - self.y() * other.x(),
        ])
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Returns the unit vector in the same direction, or zero for a zero vector.
    pub fn normalize(&self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return Self([0.0, 0.0, 0.0]);
        }

        Self([self.x() / length, self.y() / length, self.z() / length])
    }

    pub fn x(&self) -> f32 {
        self.0[0]
    }
    pub fn y(&self) -> f32 {
        self.0[1]
    }
    pub fn z(&self) -> f32 {
        self.0[2]
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self([
            self.x() - other.x(),
            self.y() - other.y(),
            self.z() - other.z(),
        ])
    }
}
