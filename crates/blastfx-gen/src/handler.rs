//! Explosion generator handler
//!
//! Owns the definition tables, the class and resource registries, and the
//! program cache. `load` compiles a definition once per tag; `explosion`
//! replays the cached programs to populate freshly spawned instances.
//!
//! Compilation and cache mutation (load/reload/unload) belong to a single
//! control thread. Compiled data sits behind `Arc`, so an in-flight
//! `explosion` holds its program alive even while the cache is reloaded
//! underneath it.

use crate::alias::{AliasList, ClassRegistry};
use crate::error::{Error, Result};
use crate::program::{CompiledSpawn, ExplosionData, GroundFlashInfo};
use crate::resources::{HandleSpace, ResourceBank};
use crate::spawnable::register_builtin;
use blastfx_core::{
    compile_scalar, execute, ClassDesc, CodeStream, EffectRng, ExplosionId, GeneratorId,
    InstanceData, OpCode, ResourceHandle, ResourceKind, SpawnFlags, TypeDesc, Vec3,
};
use blastfx_script::{AliasDefs, ExplosionDefs, SpawnDef};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A loaded (possibly nested) generator registration
#[derive(Debug, Clone)]
pub struct LoadedGenerator {
    /// The tag it was loaded from
    pub tag: String,
    /// The cache entry it executes, or a reserved identifier
    pub explosion_id: ExplosionId,
    /// Handle stored into instances that reference this generator
    pub handle: ResourceHandle,
}

/// Inputs for one explosion event
#[derive(Debug, Clone)]
pub struct ExplosionParams {
    /// World position of the explosion
    pub pos: Vec3,
    /// Direction vector passed to DIR stores
    pub dir: Vec3,
    /// Scaled damage input
    pub damage: f32,
    /// Blast radius
    pub radius: f32,
    /// Terrain height under the explosion
    pub ground_height: f32,
    /// Whether a unit was hit
    pub hit_unit: bool,
}

/// One populated instance, ready for the composition layer
///
/// The composition layer constructs the live effect object from the class
/// schema and the populated field buffer, with (position, owner) context.
#[derive(Debug, Clone)]
pub struct SpawnedInstance {
    /// The spawnable class this instance belongs to
    pub class: Arc<ClassDesc>,
    /// Populated field storage
    pub data: InstanceData,
}

/// Everything one explosion event produced
#[derive(Debug, Clone, Default)]
pub struct ExplosionOutcome {
    /// Populated instances, grouped by definition order
    pub spawned: Vec<SpawnedInstance>,
    /// Ground flash to display, if the explosion qualifies
    pub ground_flash: Option<GroundFlashInfo>,
    /// Run the non-custom fallback composition as well
    pub use_default: bool,
}

impl Default for ExplosionParams {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            dir: Vec3::new(0.0, 1.0, 0.0),
            damage: 0.0,
            radius: 0.0,
            ground_height: 0.0,
            hit_unit: false,
        }
    }
}

/// Registry and program cache for custom explosion generators
#[derive(Debug)]
pub struct ExplosionGenHandler {
    classes: ClassRegistry,
    projectile_aliases: AliasList,
    generator_aliases: AliasList,
    defs: ExplosionDefs,
    resources: ResourceBank,
    ids: IndexMap<String, u32>,
    data: Vec<Arc<ExplosionData>>,
    generators: IndexMap<GeneratorId, LoadedGenerator>,
    next_generator: u32,
    rng: EffectRng,
}

impl ExplosionGenHandler {
    /// Create a handler over parsed definition and alias tables
    pub fn new(defs: ExplosionDefs, aliases: AliasDefs, resources: ResourceBank, seed: u64) -> Self {
        let mut classes = ClassRegistry::new();
        register_builtin(&mut classes);

        let mut projectile_aliases = AliasList::new();
        projectile_aliases.load(aliases.projectiles);
        let mut generator_aliases = AliasList::new();
        generator_aliases.load(aliases.generators);

        Self {
            classes,
            projectile_aliases,
            generator_aliases,
            defs,
            resources,
            ids: IndexMap::new(),
            data: Vec::new(),
            generators: IndexMap::new(),
            next_generator: 0,
            rng: EffectRng::new(seed),
        }
    }

    /// Register an additional spawnable class
    pub fn register_class(&mut self, class: Arc<ClassDesc>) {
        self.classes.register(class);
    }

    /// Swap in re-parsed definition tables (used before `reload`)
    pub fn set_defs(&mut self, defs: ExplosionDefs) {
        self.defs = defs;
    }

    /// Resource registries (for engine-side registration)
    pub fn resources_mut(&mut self) -> &mut ResourceBank {
        &mut self.resources
    }

    /// Identifier already assigned to `tag`, if it is cached
    pub fn cached_id(&self, tag: &str) -> Option<ExplosionId> {
        self.ids.get(tag).map(|&i| ExplosionId::new(i))
    }

    /// Compiled data for an ordinary identifier, if cached
    pub fn cached_data(&self, id: ExplosionId) -> Option<&Arc<ExplosionData>> {
        self.data.get(id.raw() as usize)
    }

    /// A loaded generator registration
    pub fn generator(&self, id: GeneratorId) -> Option<&LoadedGenerator> {
        self.generators.get(&id)
    }

    /// Find a generator registration by its stored handle
    pub fn generator_by_handle(&self, handle: ResourceHandle) -> Option<&LoadedGenerator> {
        self.generators.values().find(|g| g.handle == handle)
    }

    /// Compile the definition for `tag`, or return its cached identifier
    ///
    /// Idempotent per tag. Schema problems (unknown class, unknown or
    /// non-configurable field, unsupported field type, missing resource)
    /// skip the offending spawn kind or field and continue; a missing
    /// definition table yields `ExplosionId::INVALID`.
    pub fn load(&mut self, tag: &str) -> ExplosionId {
        if let Some(&index) = self.ids.get(tag) {
            return ExplosionId::new(index);
        }

        let Some(def) = self.defs.get(tag).cloned() else {
            warn!(tag, "no definition table for explosion tag");
            return ExplosionId::INVALID;
        };

        let mut spawns = Vec::new();
        for spawn_def in &def.spawns {
            match self.compile_spawn(tag, spawn_def) {
                Some(spawn) => spawns.push(spawn),
                None => continue,
            }
        }

        let ground_flash = def
            .groundflash
            .as_ref()
            .filter(|gf| gf.ttl > 0)
            .map(|gf| GroundFlashInfo {
                flash_size: gf.flash_size,
                flash_alpha: gf.flash_alpha,
                circle_growth: gf.circle_growth,
                circle_alpha: gf.circle_alpha,
                ttl: gf.ttl,
                color: gf.color,
                flags: SpawnFlags::GROUND | gf.flags(),
            });

        self.data.push(Arc::new(ExplosionData {
            spawns,
            ground_flash,
            use_default: def.use_default_explosions,
        }));
        let index = (self.data.len() - 1) as u32;
        self.ids.insert(tag.to_string(), index);
        ExplosionId::new(index)
    }

    fn compile_spawn(&mut self, tag: &str, spawn_def: &SpawnDef) -> Option<CompiledSpawn> {
        let class_name = self.projectile_aliases.resolve(spawn_def.class_name());
        let Some(class) = self.classes.get(&class_name).cloned() else {
            warn!(tag, class = %spawn_def.class_name(), "unknown spawnable class");
            return None;
        };

        let mut code = CodeStream::new();
        let mut spawn_gens = Vec::new();

        for (field, script) in &spawn_def.properties {
            let Some(member) = class.find_member(field) else {
                warn!(tag, class = %class_name, field, "unknown field");
                continue;
            };
            if !member.configurable {
                warn!(tag, class = %class_name, field, "field is not configurable");
                continue;
            }

            // compile into a scratch stream so a failed field emits nothing
            let mut field_code = CodeStream::new();
            let offset = member.offset;
            let ty = member.ty.clone();
            match self.compile_field(&mut spawn_gens, &mut field_code, offset, &ty, script) {
                Ok(()) => code.append(field_code),
                Err(err) => warn!(tag, class = %class_name, field, %err, "skipping property"),
            }
        }

        Some(CompiledSpawn {
            class,
            code: code.finish(),
            count: spawn_def.count,
            flags: spawn_def.flags(),
            spawn_gens,
        })
    }

    /// Schema navigator: compile one field expression by type
    fn compile_field(
        &mut self,
        spawn_gens: &mut Vec<GeneratorId>,
        code: &mut CodeStream,
        offset: u16,
        ty: &TypeDesc,
        script: &str,
    ) -> Result<()> {
        // keyword escape hatch, checked before any type dispatch
        let head = script.split(';').next().unwrap_or("");
        if head == "dir" {
            code.op_store(OpCode::Dir, offset);
            return Ok(());
        }

        match ty {
            TypeDesc::Scalar(kind) => compile_scalar(code, offset, *kind, script)?,
            TypeDesc::Composite(class) => {
                let mut parts = script.split(',');
                let mut current = Some(class.clone());
                'classes: while let Some(c) = current {
                    for member in c.own_members() {
                        let Some(part) = parts.next() else {
                            // expression exhausted: remaining members get
                            // no instructions
                            break 'classes;
                        };
                        self.compile_field(spawn_gens, code, offset + member.offset, &member.ty, part)?;
                    }
                    current = c.base().cloned();
                }
            }
            TypeDesc::FixedArray { elem, count } => {
                let mut parts = script.split(',');
                for i in 0..*count {
                    let Some(part) = parts.next() else { break };
                    self.compile_field(spawn_gens, code, offset + i * elem.size(), elem, part)?;
                }
            }
            TypeDesc::Resource(kind) => {
                let name = head;
                let handle = match kind {
                    ResourceKind::AtlasTexture => {
                        self.resources.atlas.texture(name).ok_or_else(|| {
                            Error::MissingResource {
                                kind: "texture",
                                name: name.to_string(),
                            }
                        })?
                    }
                    ResourceKind::GroundFxTexture => {
                        self.resources.ground_fx.texture(name).ok_or_else(|| {
                            Error::MissingResource {
                                kind: "ground-fx texture",
                                name: name.to_string(),
                            }
                        })?
                    }
                    ResourceKind::ColorMap => self.resources.color_maps.load(name)?,
                    ResourceKind::Generator => {
                        let gen_id = self.load_generator(name)?;
                        spawn_gens.push(gen_id);
                        self.generators[&gen_id].handle
                    }
                };
                code.op_loadp(handle);
                code.op_store(OpCode::StoreP, offset);
            }
        }
        Ok(())
    }

    /// Load a nested generator by name
    ///
    /// `custom:tag` loads `tag` as a custom definition; a name resolving to
    /// `standard` (or `std`) routes to the fallback generator. A bare
    /// `custom` registers a one-shot spawner resolved at execution time.
    pub fn load_generator(&mut self, name: &str) -> Result<GeneratorId> {
        let (prefix, postfix) = match name.find(':') {
            Some(sep) => (&name[..sep], &name[sep + 1..]),
            None => (name, ""),
        };
        let resolved = self.generator_aliases.resolve(prefix);

        let explosion_id = match resolved.as_str() {
            "custom" => {
                if postfix.is_empty() {
                    ExplosionId::SPAWNER
                } else {
                    let id = self.load(postfix);
                    if !id.is_valid() {
                        return Err(Error::UnknownGenerator(name.to_string()));
                    }
                    id
                }
            }
            "std" | "standard" => ExplosionId::STANDARD,
            _ => return Err(Error::UnknownGenerator(name.to_string())),
        };

        self.next_generator += 1;
        let id = GeneratorId(self.next_generator);
        let handle = HandleSpace::Generator.handle(u64::from(self.next_generator));
        self.generators.insert(
            id,
            LoadedGenerator {
                tag: name.to_string(),
                explosion_id,
                handle,
            },
        );
        Ok(id)
    }

    /// Drop a generator registration
    pub fn unload_generator(&mut self, id: GeneratorId) {
        self.generators.shift_remove(&id);
    }

    /// Recompile cached definitions from the current definition tables
    ///
    /// `None` reloads every cached tag; `Some(tag)` reloads one. In both
    /// cases externally visible identifiers are preserved, and a failed
    /// recompile rolls back to the previous compiled data for that tag.
    pub fn reload(&mut self, tag: Option<&str>) {
        match tag {
            None => {
                let tags: Vec<String> = self.ids.keys().cloned().collect();
                for t in tags {
                    self.reload_tag(&t);
                }
            }
            Some(t) => self.reload_tag(t),
        }
    }

    fn reload_tag(&mut self, tag: &str) {
        let Some(&index) = self.ids.get(tag) else {
            warn!(tag, "reload requested for tag that was never loaded");
            return;
        };
        let index = index as usize;
        let last = self.data.len() - 1;

        // the last element fills the vacated slot; remember whose it is so
        // its identifier can be fixed up after the swap
        let old = self.data[index].clone();
        let tail = self.data[last].clone();
        self.ids.shift_remove(tag);
        let tail_tag: Option<String> = self
            .ids
            .iter()
            .find(|(_, &v)| v as usize == last)
            .map(|(k, _)| k.clone());
        self.data.swap(index, last);
        self.data.pop();

        info!(tag, id = index, "reloading explosion definition");

        let new_id = self.load(tag);
        if !new_id.is_valid() {
            error!(tag, id = index, "reload failed, keeping previous compiled data");
            self.data.push(tail);
            if let Some(tail_tag) = &tail_tag {
                self.ids.insert(tail_tag.clone(), (self.data.len() - 1) as u32);
            }
            self.data[index] = old;
            self.ids.insert(tag.to_string(), index as u32);
            return;
        }

        // restore index stability: new data takes the original slot, the
        // displaced tail entry returns to the end
        let new_index = new_id.raw() as usize;
        self.data.swap(index, new_index);
        if index != new_index {
            if let Some(tail_tag) = &tail_tag {
                self.ids.insert(tail_tag.clone(), new_index as u32);
            }
        }
        self.ids.insert(tag.to_string(), index as u32);

        // the replaced program's nested dependents are released only after
        // a successful reload, so rollback keeps them alive
        for gen_id in old.spawns.iter().flat_map(|s| s.spawn_gens.iter().copied()) {
            self.unload_generator(gen_id);
        }
    }

    /// Release all nested-generator dependents
    ///
    /// Compiled opcode streams stay cached for reuse until `clear_cache`.
    pub fn unload(&mut self) {
        let gen_ids: Vec<GeneratorId> = self
            .data
            .iter()
            .flat_map(|d| d.spawns.iter())
            .flat_map(|s| s.spawn_gens.iter().copied())
            .collect();
        for id in gen_ids {
            self.unload_generator(id);
        }
    }

    /// Drop every cached program and identifier
    pub fn clear_cache(&mut self) {
        self.ids.clear();
        self.data.clear();
    }

    /// Run one explosion event
    ///
    /// Classifies the explosion by height/altitude, gates each spawn kind on
    /// the derived flags, and runs the interpreter once per spawned
    /// instance. Returns `None` for an invalid or unknown identifier.
    pub fn explosion(&mut self, id: ExplosionId, params: &ExplosionParams) -> Option<ExplosionOutcome> {
        if id == ExplosionId::STANDARD {
            // not a custom explosion: defer entirely to the fallback
            return Some(ExplosionOutcome {
                use_default: true,
                ..ExplosionOutcome::default()
            });
        }
        if id == ExplosionId::INVALID {
            return None;
        }
        let index = if id == ExplosionId::SPAWNER {
            // one-shot spawner instances execute the last-compiled entry
            self.data.len().checked_sub(1)?
        } else {
            id.raw() as usize
        };
        let data = self.data.get(index)?.clone();

        let altitude = params.pos.y - params.ground_height;
        let mut flags = SpawnFlags::from_height(params.pos.y, altitude);
        flags |= if params.hit_unit {
            SpawnFlags::UNIT
        } else {
            SpawnFlags::NO_UNIT
        };

        let mut spawned = Vec::new();
        for spawn in &data.spawns {
            if !spawn.flags.intersects(flags) {
                continue;
            }
            for spawn_index in 0..spawn.count {
                let mut instance = InstanceData::for_class(&spawn.class);
                execute(
                    &spawn.code,
                    params.damage,
                    spawn_index as i32,
                    params.dir,
                    &mut instance,
                    &mut self.rng,
                );
                spawned.push(SpawnedInstance {
                    class: spawn.class.clone(),
                    data: instance,
                });
            }
        }

        let ground_flash = data
            .ground_flash
            .as_ref()
            .filter(|gf| flags.contains(SpawnFlags::GROUND) && gf.ttl > 0 && gf.flash_size > 1.0)
            .cloned();

        Some(ExplosionOutcome {
            spawned,
            ground_flash,
            use_default: data.use_default,
        })
    }
}
