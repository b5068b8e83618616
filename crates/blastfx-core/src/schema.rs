//! Reflected schema model for spawnable effect types
//!
//! Each spawnable type registers a `ClassDesc` once, describing its
//! configurable fields as (name, byte offset, type) triples. The schema
//! navigator walks these descriptions to turn per-field expression text into
//! bytecode, and the resulting offsets stay valid for every instance of the
//! class for the lifetime of the compiled program.

use std::sync::Arc;

/// Scalar field kinds and their storage widths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// 32-bit signed integer
    Int,
    /// 32-bit IEEE float
    Float,
    /// Single byte
    Byte,
    /// Boolean, stored as a 32-bit integer
    Bool,
    /// 64-bit float; reflected but not compilable as an expression target
    Double,
}

impl ScalarKind {
    /// Storage size in bytes
    pub fn size(self) -> u16 {
        match self {
            ScalarKind::Int | ScalarKind::Float | ScalarKind::Bool => 4,
            ScalarKind::Byte => 1,
            ScalarKind::Double => 8,
        }
    }

    /// Human-readable name for diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Byte => "byte",
            ScalarKind::Bool => "bool",
            ScalarKind::Double => "double",
        }
    }
}

/// Opaque resource-handle field kinds
///
/// These fields hold references to externally registered, shared resources
/// rather than inline data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A region of the projectile texture atlas
    AtlasTexture,
    /// A region of the ground-effect texture atlas
    GroundFxTexture,
    /// A color gradient built from a definition string
    ColorMap,
    /// A nested explosion generator, loaded by tag
    Generator,
}

impl ResourceKind {
    /// Human-readable name for diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::AtlasTexture => "texture",
            ResourceKind::GroundFxTexture => "ground-fx texture",
            ResourceKind::ColorMap => "color map",
            ResourceKind::Generator => "generator",
        }
    }
}

/// The closed set of reflected field types
#[derive(Debug, Clone)]
pub enum TypeDesc {
    /// A scalar leaf
    Scalar(ScalarKind),
    /// A nested object described by its own class
    Composite(Arc<ClassDesc>),
    /// A fixed-size array of a uniform element type
    FixedArray { elem: Box<TypeDesc>, count: u16 },
    /// An opaque resource handle
    Resource(ResourceKind),
}

impl TypeDesc {
    /// Storage size in bytes
    pub fn size(&self) -> u16 {
        match self {
            TypeDesc::Scalar(kind) => kind.size(),
            TypeDesc::Composite(class) => class.size(),
            TypeDesc::FixedArray { elem, count } => elem.size() * count,
            // handles are stored as raw u64 values
            TypeDesc::Resource(_) => 8,
        }
    }
}

/// One reflected field of a class
#[derive(Debug, Clone)]
pub struct MemberDesc {
    /// Field name as referenced from definition scripts
    pub name: String,
    /// Byte offset from the start of the instance
    pub offset: u16,
    /// Field type
    pub ty: TypeDesc,
    /// Whether definition scripts may populate this field
    pub configurable: bool,
}

/// Reflected description of one spawnable type
///
/// Immutable once built; shared via `Arc` between the class registry and
/// every compiled program that targets the class.
#[derive(Debug)]
pub struct ClassDesc {
    name: String,
    base: Option<Arc<ClassDesc>>,
    members: Vec<MemberDesc>,
    size: u16,
}

impl ClassDesc {
    /// Start building a class description
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            base: None,
            members: Vec::new(),
            cursor: 0,
        }
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base class, if any
    pub fn base(&self) -> Option<&Arc<ClassDesc>> {
        self.base.as_ref()
    }

    /// Members declared directly on this class (not its ancestors)
    pub fn own_members(&self) -> &[MemberDesc] {
        &self.members
    }

    /// Total instance size in bytes, including ancestor fields
    pub fn size(&self) -> u16 {
        self.size
    }

    /// Find a member by name, searching this class and then its ancestors
    ///
    /// Offsets are absolute within the instance, so a member found on a base
    /// class needs no further adjustment.
    pub fn find_member(&self, name: &str) -> Option<&MemberDesc> {
        let mut class = Some(self);
        while let Some(c) = class {
            if let Some(m) = c.members.iter().find(|m| m.name == name) {
                return Some(m);
            }
            class = c.base.as_deref();
        }
        None
    }
}

/// Builder assigning packed byte offsets in declaration order
pub struct ClassBuilder {
    name: String,
    base: Option<Arc<ClassDesc>>,
    members: Vec<MemberDesc>,
    cursor: u16,
}

impl ClassBuilder {
    /// Inherit the fields of a base class; must precede field declarations
    pub fn extends(mut self, base: &Arc<ClassDesc>) -> Self {
        debug_assert!(self.members.is_empty(), "extends must be set before fields");
        self.cursor = base.size();
        self.base = Some(base.clone());
        self
    }

    /// Declare a configurable field
    pub fn field(mut self, name: impl Into<String>, ty: TypeDesc) -> Self {
        let size = ty.size();
        self.members.push(MemberDesc {
            name: name.into(),
            offset: self.cursor,
            ty,
            configurable: true,
        });
        self.cursor += size;
        self
    }

    /// Declare a field that definition scripts may not populate
    pub fn hidden(mut self, name: impl Into<String>, ty: TypeDesc) -> Self {
        let size = ty.size();
        self.members.push(MemberDesc {
            name: name.into(),
            offset: self.cursor,
            ty,
            configurable: false,
        });
        self.cursor += size;
        self
    }

    /// Shorthand for a configurable float field
    pub fn float(self, name: impl Into<String>) -> Self {
        self.field(name, TypeDesc::Scalar(ScalarKind::Float))
    }

    /// Shorthand for a configurable int field
    pub fn int(self, name: impl Into<String>) -> Self {
        self.field(name, TypeDesc::Scalar(ScalarKind::Int))
    }

    /// Finish the class description
    pub fn build(self) -> Arc<ClassDesc> {
        Arc::new(ClassDesc {
            name: self.name,
            base: self.base,
            members: self.members,
            size: self.cursor,
        })
    }
}
