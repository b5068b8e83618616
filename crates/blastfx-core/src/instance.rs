//! Destination buffers for spawned effect instances
//!
//! A freshly spawned instance is a zero-initialized byte buffer sized by its
//! class description. The interpreter populates it through the typed,
//! bounds-checked accessors here; the effect composition layer reads the
//! fields back out through the matching getters when it constructs the live
//! object.

use crate::identity::ResourceHandle;
use crate::math::Vec3;
use crate::schema::ClassDesc;

/// Field storage for one spawned instance
///
/// All accessors take byte offsets produced by the compiler from the class
/// schema. An out-of-range offset can only come from a compiler/schema
/// mismatch and panics rather than corrupting adjacent fields.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceData {
    bytes: Vec<u8>,
}

impl InstanceData {
    /// Allocate a zeroed buffer for one instance of `class`
    pub fn for_class(class: &ClassDesc) -> Self {
        Self {
            bytes: vec![0; class.size() as usize],
        }
    }

    /// Buffer size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for zero-sized classes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write a little-endian i32 at `offset`
    pub fn write_i32(&mut self, offset: u16, value: i32) {
        self.put(offset, &value.to_le_bytes());
    }

    /// Write a little-endian f32 at `offset`
    pub fn write_f32(&mut self, offset: u16, value: f32) {
        self.put(offset, &value.to_le_bytes());
    }

    /// Write a single byte at `offset`
    pub fn write_u8(&mut self, offset: u16, value: u8) {
        self.put(offset, &[value]);
    }

    /// Write three little-endian f32 components at `offset`
    pub fn write_vec3(&mut self, offset: u16, value: Vec3) {
        self.write_f32(offset, value.x);
        self.write_f32(offset + 4, value.y);
        self.write_f32(offset + 8, value.z);
    }

    /// Write a resource handle (raw u64) at `offset`
    pub fn write_handle(&mut self, offset: u16, handle: ResourceHandle) {
        self.put(offset, &handle.raw().to_le_bytes());
    }

    /// Read back an i32 from `offset`
    pub fn read_i32(&self, offset: u16) -> i32 {
        i32::from_le_bytes(self.get(offset))
    }

    /// Read back an f32 from `offset`
    pub fn read_f32(&self, offset: u16) -> f32 {
        f32::from_le_bytes(self.get(offset))
    }

    /// Read back a byte from `offset`
    pub fn read_u8(&self, offset: u16) -> u8 {
        self.bytes[offset as usize]
    }

    /// Read back a vector from `offset`
    pub fn read_vec3(&self, offset: u16) -> Vec3 {
        Vec3::new(
            self.read_f32(offset),
            self.read_f32(offset + 4),
            self.read_f32(offset + 8),
        )
    }

    /// Read back a resource handle from `offset`
    pub fn read_handle(&self, offset: u16) -> ResourceHandle {
        ResourceHandle::from_raw(u64::from_le_bytes(self.get(offset)))
    }

    fn put(&mut self, offset: u16, raw: &[u8]) {
        let start = offset as usize;
        self.bytes[start..start + raw.len()].copy_from_slice(raw);
    }

    fn get<const N: usize>(&self, offset: u16) -> [u8; N] {
        let start = offset as usize;
        let mut raw = [0u8; N];
        raw.copy_from_slice(&self.bytes[start..start + N]);
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ClassDesc, ScalarKind, TypeDesc};

    #[test]
    fn test_roundtrip() {
        let class = ClassDesc::builder("t")
            .float("a")
            .field("b", TypeDesc::Scalar(ScalarKind::Int))
            .field("c", TypeDesc::Scalar(ScalarKind::Byte))
            .build();
        let mut data = InstanceData::for_class(&class);

        data.write_f32(0, 1.25);
        data.write_i32(4, -7);
        data.write_u8(8, 200);

        assert_eq!(data.read_f32(0), 1.25);
        assert_eq!(data.read_i32(4), -7);
        assert_eq!(data.read_u8(8), 200);
    }

    #[test]
    fn test_zero_initialized() {
        let class = ClassDesc::builder("t").float("a").float("b").build();
        let data = InstanceData::for_class(&class);
        assert_eq!(data.read_f32(0), 0.0);
        assert_eq!(data.read_f32(4), 0.0);
    }

    #[test]
    fn test_vec3_layout() {
        let class = ClassDesc::builder("t").float("pad").float("x").float("y").float("z").build();
        let mut data = InstanceData::for_class(&class);
        data.write_vec3(4, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(data.read_f32(4), 1.0);
        assert_eq!(data.read_f32(8), 2.0);
        assert_eq!(data.read_f32(12), 3.0);
        assert_eq!(data.read_vec3(4), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_offset_panics() {
        let class = ClassDesc::builder("t").float("a").build();
        let mut data = InstanceData::for_class(&class);
        data.write_f32(4, 1.0);
    }
}
