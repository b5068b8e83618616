//! Bytecode interpreter
//!
//! Replays one compiled opcode stream against a single destination instance.
//! Runs on the explosion hot path, potentially hundreds of times per event:
//! no allocation, no blocking, fixed-size local state only.

use crate::identity::ResourceHandle;
use crate::instance::InstanceData;
use crate::math::Vec3;
use crate::opcode::{Cursor, OpCode};
use crate::rng::EffectRng;

/// Number of scratch registers available to one execution
pub const SCRATCH_SLOTS: usize = 16;

/// Execute a compiled program against one destination instance
///
/// `damage` is the scaled explosion damage, `spawn_index` the index of this
/// instance within its spawn kind, and `dir` the explosion direction.
/// Scratch registers are zero-initialized; reading a register that was never
/// YANKed is legal and yields 0.
///
/// Execution is deterministic except for RAND and always runs to the END
/// opcode. Panics on an unrecognized opcode tag (see [`Cursor::next_op`]).
pub fn execute(
    code: &[u8],
    damage: f32,
    spawn_index: i32,
    dir: Vec3,
    instance: &mut InstanceData,
    rng: &mut EffectRng,
) {
    let mut cur = Cursor::new(code);
    let mut val = 0.0f32;
    let mut ptr = ResourceHandle::NONE;
    let mut scratch = [0.0f32; SCRATCH_SLOTS];

    loop {
        match cur.next_op() {
            OpCode::End => return,
            OpCode::Add => val += cur.read_f32(),
            OpCode::Rand => val += rng.next_f32() * cur.read_f32(),
            OpCode::Damage => val += damage * cur.read_f32(),
            OpCode::Index => val += spawn_index as f32 * cur.read_f32(),
            OpCode::Sawtooth => {
                // floating modulo
                let m = cur.read_f32();
                val -= m * safe_div(val, m).floor();
            }
            OpCode::Discrete => {
                let m = cur.read_f32();
                val = m * safe_div(val, m).floor();
            }
            OpCode::Sine => {
                let m = cur.read_f32();
                val = m * val.sin();
            }
            OpCode::Pow => {
                let e = cur.read_f32();
                val = val.powf(e);
            }
            OpCode::Yank => {
                scratch[cur.read_i32() as usize] = val;
                val = 0.0;
            }
            OpCode::Multiply => val *= scratch[cur.read_i32() as usize],
            OpCode::AddBuff => val += scratch[cur.read_i32() as usize],
            OpCode::PowBuff => {
                let e = scratch[cur.read_i32() as usize];
                val = val.powf(e);
            }
            OpCode::StoreI => {
                instance.write_i32(cur.read_u16(), val as i32);
                val = 0.0;
            }
            OpCode::StoreF => {
                instance.write_f32(cur.read_u16(), val);
                val = 0.0;
            }
            OpCode::StoreC => {
                instance.write_u8(cur.read_u16(), val as i32 as u8);
                val = 0.0;
            }
            OpCode::Dir => instance.write_vec3(cur.read_u16(), dir),
            OpCode::LoadP => ptr = ResourceHandle::from_raw(cur.read_u64()),
            OpCode::StoreP => {
                instance.write_handle(cur.read_u16(), ptr);
                ptr = ResourceHandle::NONE;
            }
        }
    }
}

/// Divide, treating a zero divisor as a zero quotient
fn safe_div(num: f32, den: f32) -> f32 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::CodeStream;
    use crate::schema::ClassDesc;

    fn float_class(fields: &[&str]) -> std::sync::Arc<ClassDesc> {
        let mut b = ClassDesc::builder("test");
        for f in fields {
            b = b.float(*f);
        }
        b.build()
    }

    fn run(code: Vec<u8>, damage: f32, index: i32, instance: &mut InstanceData) {
        let mut rng = EffectRng::new(7);
        execute(&code, damage, index, Vec3::ZERO, instance, &mut rng);
    }

    #[test]
    fn test_add_and_store() {
        let class = float_class(&["a"]);
        let mut inst = InstanceData::for_class(&class);
        let mut code = CodeStream::new();
        code.op_f32(OpCode::Add, 1.5);
        code.op_store(OpCode::StoreF, 0);

        run(code.finish(), 0.0, 0, &mut inst);
        assert_eq!(inst.read_f32(0), 1.5);
    }

    #[test]
    fn test_store_resets_accumulator() {
        // every scalar store zeroes val, so a chained follow-up store
        // writes 0, not a stale value
        use crate::schema::{ScalarKind, TypeDesc};
        let class = ClassDesc::builder("t")
            .float("a") // 0
            .int("b") // 4
            .field("c", TypeDesc::Scalar(ScalarKind::Byte)) // 8
            .float("d") // 9
            .int("e") // 13
            .field("f", TypeDesc::Scalar(ScalarKind::Byte)) // 17
            .build();
        let mut inst = InstanceData::for_class(&class);
        let mut code = CodeStream::new();
        code.op_f32(OpCode::Add, 3.0);
        code.op_store(OpCode::StoreF, 0);
        code.op_store(OpCode::StoreI, 4); // STOREF reset val
        code.op_f32(OpCode::Add, 4.6);
        code.op_store(OpCode::StoreI, 13);
        code.op_store(OpCode::StoreC, 8); // STOREI reset val
        code.op_f32(OpCode::Add, 200.0);
        code.op_store(OpCode::StoreC, 17);
        code.op_store(OpCode::StoreF, 9); // STOREC reset val

        run(code.finish(), 0.0, 0, &mut inst);
        assert_eq!(inst.read_f32(0), 3.0);
        assert_eq!(inst.read_i32(4), 0);
        assert_eq!(inst.read_i32(13), 4);
        assert_eq!(inst.read_u8(8), 0);
        assert_eq!(inst.read_u8(17), 200);
        assert_eq!(inst.read_f32(9), 0.0);
    }

    #[test]
    fn test_damage_and_index_inputs() {
        let class = float_class(&["a"]);
        let mut code = CodeStream::new();
        code.op_f32(OpCode::Damage, 2.0);
        code.op_f32(OpCode::Index, 10.0);
        code.op_store(OpCode::StoreF, 0);
        let bytes = code.finish();

        let mut inst = InstanceData::for_class(&class);
        run(bytes.clone(), 5.0, 3, &mut inst);
        assert_eq!(inst.read_f32(0), 5.0 * 2.0 + 3.0 * 10.0);
    }

    #[test]
    fn test_rand_stays_in_interval() {
        let class = float_class(&["a"]);
        let mut code = CodeStream::new();
        code.op_f32(OpCode::Damage, 2.0);
        code.op_f32(OpCode::Rand, 0.5);
        code.op_store(OpCode::StoreF, 0);
        let bytes = code.finish();

        let mut rng = EffectRng::new(99);
        for _ in 0..1000 {
            let mut inst = InstanceData::for_class(&class);
            execute(&bytes, 10.0, 0, Vec3::ZERO, &mut inst, &mut rng);
            let v = inst.read_f32(0);
            assert!((20.0..20.5).contains(&v), "value {v} escaped [20, 20.5)");
        }
    }

    #[test]
    fn test_yank_zeroes_accumulator() {
        // y0 copies val into register 0 and resets val, so x0 multiplies
        // the now-zero accumulator
        let class = float_class(&["a"]);
        let mut code = CodeStream::new();
        code.op_f32(OpCode::Add, 16.0);
        code.op_reg(OpCode::Yank, 0);
        code.op_reg(OpCode::Multiply, 0);
        code.op_store(OpCode::StoreF, 0);

        let mut inst = InstanceData::for_class(&class);
        run(code.finish(), 0.0, 0, &mut inst);
        assert_eq!(inst.read_f32(0), 0.0);
    }

    #[test]
    fn test_register_readback() {
        // 8 y0 2 a0 x0 -> (2 + 8) * 8 = 80
        let class = float_class(&["a"]);
        let mut code = CodeStream::new();
        code.op_f32(OpCode::Add, 8.0);
        code.op_reg(OpCode::Yank, 0);
        code.op_f32(OpCode::Add, 2.0);
        code.op_reg(OpCode::AddBuff, 0);
        code.op_reg(OpCode::Multiply, 0);
        code.op_store(OpCode::StoreF, 0);

        let mut inst = InstanceData::for_class(&class);
        run(code.finish(), 0.0, 0, &mut inst);
        assert_eq!(inst.read_f32(0), 80.0);
    }

    #[test]
    fn test_sawtooth_and_discrete() {
        let class = float_class(&["a", "b"]);
        let mut code = CodeStream::new();
        code.op_f32(OpCode::Add, 7.5);
        code.op_f32(OpCode::Sawtooth, 2.0);
        code.op_store(OpCode::StoreF, 0);
        code.op_f32(OpCode::Add, 7.5);
        code.op_f32(OpCode::Discrete, 2.0);
        code.op_store(OpCode::StoreF, 4);

        let mut inst = InstanceData::for_class(&class);
        run(code.finish(), 0.0, 0, &mut inst);
        assert_eq!(inst.read_f32(0), 1.5);
        assert_eq!(inst.read_f32(4), 6.0);
    }

    #[test]
    fn test_zero_operand_modulo_is_safe() {
        let class = float_class(&["a", "b"]);
        let mut code = CodeStream::new();
        code.op_f32(OpCode::Add, 7.5);
        code.op_f32(OpCode::Sawtooth, 0.0);
        code.op_store(OpCode::StoreF, 0);
        code.op_f32(OpCode::Add, 7.5);
        code.op_f32(OpCode::Discrete, 0.0);
        code.op_store(OpCode::StoreF, 4);

        let mut inst = InstanceData::for_class(&class);
        run(code.finish(), 0.0, 0, &mut inst);
        assert!(inst.read_f32(0).is_finite());
        assert!(inst.read_f32(4).is_finite());
        assert_eq!(inst.read_f32(4), 0.0);
    }

    #[test]
    fn test_dir_write() {
        let class = float_class(&["x", "y", "z"]);
        let mut code = CodeStream::new();
        code.op_store(OpCode::Dir, 0);
        let bytes = code.finish();

        let mut inst = InstanceData::for_class(&class);
        let mut rng = EffectRng::new(1);
        let dir = Vec3::new(0.0, 1.0, -0.5);
        execute(&bytes, 0.0, 0, dir, &mut inst, &mut rng);
        assert_eq!(inst.read_vec3(0), dir);
    }

    #[test]
    fn test_loadp_storep() {
        let class = ClassDesc::builder("t")
            .field("tex", crate::schema::TypeDesc::Resource(crate::schema::ResourceKind::AtlasTexture))
            .build();
        let mut code = CodeStream::new();
        code.op_loadp(ResourceHandle::from_raw(42));
        code.op_store(OpCode::StoreP, 0);

        let mut inst = InstanceData::for_class(&class);
        run(code.finish(), 0.0, 0, &mut inst);
        assert_eq!(inst.read_handle(0), ResourceHandle::from_raw(42));
    }

    #[test]
    fn test_store_int_and_byte_truncation() {
        let class = ClassDesc::builder("t")
            .int("i")
            .field("c", crate::schema::TypeDesc::Scalar(crate::schema::ScalarKind::Byte))
            .build();
        let mut code = CodeStream::new();
        code.op_f32(OpCode::Add, 3.9);
        code.op_store(OpCode::StoreI, 0);
        code.op_f32(OpCode::Add, 260.0);
        code.op_store(OpCode::StoreC, 4);

        let mut inst = InstanceData::for_class(&class);
        run(code.finish(), 0.0, 0, &mut inst);
        assert_eq!(inst.read_i32(0), 3);
        assert_eq!(inst.read_u8(4), (260i32 as u8));
    }
}
