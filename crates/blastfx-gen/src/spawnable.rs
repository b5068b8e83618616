//! Built-in spawnable effect classes
//!
//! Reflection tables for the stock particle kinds, built once at handler
//! construction. Field offsets are assigned in declaration order; the
//! composition layer reads populated instances back through the same
//! schema.

use crate::alias::ClassRegistry;
use blastfx_core::{ClassDesc, ResourceKind, ScalarKind, TypeDesc};

/// Register the stock spawnable classes
pub fn register_builtin(registry: &mut ClassRegistry) {
    let float3 = ClassDesc::builder("float3")
        .float("x")
        .float("y")
        .float("z")
        .build();

    // common base: every spawnable has a position and a velocity
    let spawnable = ClassDesc::builder("spawnable")
        .field("pos", TypeDesc::Composite(float3.clone()))
        .field("speed", TypeDesc::Composite(float3.clone()))
        .build();

    registry.register(float3.clone());
    registry.register(spawnable.clone());

    registry.register(
        ClassDesc::builder("heatcloud")
            .extends(&spawnable)
            .float("heat")
            .float("max_heat")
            .float("heat_falloff")
            .float("size")
            .float("size_growth")
            .field("texture", TypeDesc::Resource(ResourceKind::AtlasTexture))
            .build(),
    );

    registry.register(
        ClassDesc::builder("smoke")
            .extends(&spawnable)
            .float("size")
            .float("start_size")
            .float("size_expansion")
            .float("age_speed")
            .int("ttl")
            .field("color_map", TypeDesc::Resource(ResourceKind::ColorMap))
            .field("texture", TypeDesc::Resource(ResourceKind::AtlasTexture))
            .build(),
    );

    registry.register(
        ClassDesc::builder("dirt")
            .extends(&spawnable)
            .float("size")
            .float("size_expansion")
            .float("slowdown")
            .float("alpha")
            .float("alpha_falloff")
            .field("color", TypeDesc::Composite(float3.clone()))
            .field("texture", TypeDesc::Resource(ResourceKind::AtlasTexture))
            .build(),
    );

    registry.register(
        ClassDesc::builder("bubble")
            .extends(&spawnable)
            .float("size")
            .float("size_expansion")
            .float("alpha")
            .int("ttl")
            .build(),
    );

    registry.register(
        ClassDesc::builder("spike")
            .extends(&spawnable)
            .float("length")
            .float("width")
            .float("alpha")
            .float("alpha_decay")
            .field(
                "color",
                TypeDesc::FixedArray {
                    elem: Box::new(TypeDesc::Scalar(ScalarKind::Byte)),
                    count: 4,
                },
            )
            .build(),
    );

    registry.register(
        ClassDesc::builder("seismic")
            .extends(&spawnable)
            .float("size")
            .float("fade")
            .int("ttl")
            .field(
                "texture",
                TypeDesc::Resource(ResourceKind::GroundFxTexture),
            )
            .build(),
    );

    // one-shot spawner: fires a nested generator after a delay
    registry.register(
        ClassDesc::builder("explospawner")
            .extends(&spawnable)
            .int("delay")
            .field("generator", TypeDesc::Resource(ResourceKind::Generator))
            .build(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registration() {
        let mut reg = ClassRegistry::new();
        register_builtin(&mut reg);

        let heatcloud = reg.get("heatcloud").unwrap();
        // base fields come first: pos at 0, speed at 12
        assert_eq!(heatcloud.find_member("pos").unwrap().offset, 0);
        assert_eq!(heatcloud.find_member("speed").unwrap().offset, 12);
        assert_eq!(heatcloud.find_member("heat").unwrap().offset, 24);
        assert!(heatcloud.find_member("texture").is_some());

        let spike = reg.get("spike").unwrap();
        let color = spike.find_member("color").unwrap();
        assert_eq!(color.ty.size(), 4);
    }
}
