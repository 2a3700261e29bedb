//! WGSL shader programs.
//!
//! Shader sources are parsed and validated on the CPU with naga before any GPU
//! object is created, so that compile and link problems surface as a
//! [`ShaderError`] carrying a readable log. The reflected [`ProgramLayout`]
//! answers the questions a demo usually asks a program: where a uniform lives,
//! which location an attribute uses and what the bind group layouts look like.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::{render::mk_render_pipeline, texture::Texture};

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("Failure in compiling {stage} shader. Error log:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("Failure in linking program. Error log:\n{0}")]
    Link(String),
    #[error("No uniform named '{0}'.")]
    UnknownUniform(String),
    #[error("Value of {actual} bytes does not fit uniform '{name}' of {expected} bytes.")]
    UniformSize {
        name: String,
        expected: u32,
        actual: usize,
    },
    #[error("Uniforms of program {expected} used with program {actual}.")]
    ProgramMismatch { expected: u64, actual: u64 },
    #[error("Missing resource '{name}' for group {group}, binding {binding}.")]
    MissingResource {
        name: String,
        group: u32,
        binding: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    pub fn visibility(self) -> wgpu::ShaderStages {
        match self {
            ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
            ShaderStage::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// A parsed and validated shader stage.
#[derive(Debug)]
pub struct CompiledStage {
    stage: ShaderStage,
    source: String,
    module: naga::Module,
    entry_point: String,
}

impl CompiledStage {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    fn entry(&self) -> Option<&naga::EntryPoint> {
        self.module
            .entry_points
            .iter()
            .find(|ep| ep.name == self.entry_point)
    }
}

/// Parses and validates `source`, which must declare an entry point for
/// `stage`. The first matching entry point is used.
pub fn compile_stage(source: &str, stage: ShaderStage) -> Result<CompiledStage, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage,
        log: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage,
            log: e.to_string(),
        })?;

    let entry_point = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage.naga())
        .map(|ep| ep.name.clone())
        .ok_or_else(|| ShaderError::Compile {
            stage,
            log: format!("no @{} entry point declared", stage),
        })?;

    log::info!("Compiling {} shader successful.", stage);
    Ok(CompiledStage {
        stage,
        source: source.to_string(),
        module,
        entry_point,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformMember {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

/// A `var<uniform>` declaration, backed by one uniform buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformVariable {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub size: u32,
    pub members: Vec<UniformMember>,
    pub visibility: wgpu::ShaderStages,
}

/// A texture or sampler binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBinding {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub ty: wgpu::BindingType,
    pub visibility: wgpu::ShaderStages,
}

/// Byte range inside one of a program's uniform buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation {
    /// Index into [`ProgramLayout::uniforms`].
    pub uniform: usize,
    pub offset: u32,
    pub size: u32,
}

/// Everything the linked program exposes to the outside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramLayout {
    pub uniforms: Vec<UniformVariable>,
    pub resources: Vec<ResourceBinding>,
    /// Vertex inputs by location.
    pub attributes: BTreeMap<u32, String>,
}

impl ProgramLayout {
    /// Resolves `name` as `var`, `var.member` or a member name that is unique
    /// among all uniform variables.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        if let Some((var, member)) = name.split_once('.') {
            let (index, uniform) = self.uniform_by_name(var)?;
            let member = uniform.members.iter().find(|m| m.name == member)?;
            return Some(UniformLocation {
                uniform: index,
                offset: member.offset,
                size: member.size,
            });
        }

        if let Some((index, uniform)) = self.uniform_by_name(name) {
            return Some(UniformLocation {
                uniform: index,
                offset: 0,
                size: uniform.size,
            });
        }

        let mut found = self.uniforms.iter().enumerate().flat_map(|(index, uniform)| {
            uniform
                .members
                .iter()
                .filter(|m| m.name == name)
                .map(move |m| UniformLocation {
                    uniform: index,
                    offset: m.offset,
                    size: m.size,
                })
        });
        let location = found.next()?;
        match found.next() {
            Some(_) => None,
            None => Some(location),
        }
    }

    fn uniform_by_name(&self, name: &str) -> Option<(usize, &UniformVariable)> {
        self.uniforms.iter().enumerate().find(|(_, u)| u.name == name)
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .find(|(_, attribute)| attribute.as_str() == name)
            .map(|(location, _)| *location)
    }

    /// Highest bind group index used, if any.
    pub fn group_count(&self) -> u32 {
        self.uniforms
            .iter()
            .map(|u| u.group + 1)
            .chain(self.resources.iter().map(|r| r.group + 1))
            .max()
            .unwrap_or(0)
    }

    /// Layout entries of `group`, sorted by binding.
    pub fn group_entries(&self, group: u32) -> Vec<wgpu::BindGroupLayoutEntry> {
        let mut entries: Vec<_> = self
            .uniforms
            .iter()
            .filter(|u| u.group == group)
            .map(|u| wgpu::BindGroupLayoutEntry {
                binding: u.binding,
                visibility: u.visibility,
                ty: uniform_binding_type(u.size),
                count: None,
            })
            .chain(
                self.resources
                    .iter()
                    .filter(|r| r.group == group)
                    .map(|r| wgpu::BindGroupLayoutEntry {
                        binding: r.binding,
                        visibility: r.visibility,
                        ty: r.ty,
                        count: None,
                    }),
            )
            .collect();
        entries.sort_by_key(|e| e.binding);
        entries
    }
}

fn uniform_binding_type(size: u32) -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: wgpu::BufferSize::new(size as u64),
    }
}

fn resource_binding_type(inner: &naga::TypeInner) -> Option<wgpu::BindingType> {
    match *inner {
        naga::TypeInner::Image {
            dim,
            arrayed,
            ref class,
        } => {
            let view_dimension = match (dim, arrayed) {
                (naga::ImageDimension::D1, _) => wgpu::TextureViewDimension::D1,
                (naga::ImageDimension::D2, false) => wgpu::TextureViewDimension::D2,
                (naga::ImageDimension::D2, true) => wgpu::TextureViewDimension::D2Array,
                (naga::ImageDimension::D3, _) => wgpu::TextureViewDimension::D3,
                (naga::ImageDimension::Cube, false) => wgpu::TextureViewDimension::Cube,
                (naga::ImageDimension::Cube, true) => wgpu::TextureViewDimension::CubeArray,
            };
            let (sample_type, multisampled) = match *class {
                naga::ImageClass::Sampled { kind, multi } => {
                    let sample_type = match kind {
                        naga::ScalarKind::Sint => wgpu::TextureSampleType::Sint,
                        naga::ScalarKind::Uint => wgpu::TextureSampleType::Uint,
                        _ => wgpu::TextureSampleType::Float { filterable: !multi },
                    };
                    (sample_type, multi)
                }
                naga::ImageClass::Depth { multi } => (wgpu::TextureSampleType::Depth, multi),
                _ => return None,
            };
            Some(wgpu::BindingType::Texture {
                sample_type,
                view_dimension,
                multisampled,
            })
        }
        naga::TypeInner::Sampler { comparison } => Some(wgpu::BindingType::Sampler(if comparison {
            wgpu::SamplerBindingType::Comparison
        } else {
            wgpu::SamplerBindingType::Filtering
        })),
        _ => None,
    }
}

fn reflect_uniforms(stage: &CompiledStage) -> Vec<UniformVariable> {
    let module = &stage.module;
    let ctx = module.to_ctx();
    module
        .global_variables
        .iter()
        .filter(|(_, var)| var.space == naga::AddressSpace::Uniform)
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            let ty = &module.types[var.ty];
            let members = match ty.inner {
                naga::TypeInner::Struct { ref members, .. } => members
                    .iter()
                    .map(|m| UniformMember {
                        name: m.name.clone().unwrap_or_default(),
                        offset: m.offset,
                        size: module.types[m.ty].inner.size(ctx),
                    })
                    .collect(),
                _ => Vec::new(),
            };
            Some(UniformVariable {
                name: var.name.clone().unwrap_or_default(),
                group: binding.group,
                binding: binding.binding,
                size: ty.inner.size(ctx),
                members,
                visibility: stage.stage.visibility(),
            })
        })
        .collect()
}

fn reflect_resources(stage: &CompiledStage) -> Vec<ResourceBinding> {
    let module = &stage.module;
    module
        .global_variables
        .iter()
        .filter(|(_, var)| var.space == naga::AddressSpace::Handle)
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            let ty = resource_binding_type(&module.types[var.ty].inner)?;
            Some(ResourceBinding {
                name: var.name.clone().unwrap_or_default(),
                group: binding.group,
                binding: binding.binding,
                ty,
                visibility: stage.stage.visibility(),
            })
        })
        .collect()
}

/// Collects `(location, name)` pairs of a value that is either bound directly
/// or a struct whose members carry the bindings.
fn collect_locations(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeMap<u32, String>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location, name.unwrap_or_default().to_string());
        }
        Some(_) => {}
        None => {
            if let naga::TypeInner::Struct { ref members, .. } = module.types[ty].inner {
                for member in members {
                    collect_locations(
                        module,
                        member.name.as_deref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                    );
                }
            }
        }
    }
}

fn stage_inputs(stage: &CompiledStage) -> BTreeMap<u32, String> {
    let mut inputs = BTreeMap::new();
    if let Some(entry) = stage.entry() {
        for argument in &entry.function.arguments {
            collect_locations(
                &stage.module,
                argument.name.as_deref(),
                argument.ty,
                argument.binding.as_ref(),
                &mut inputs,
            );
        }
    }
    inputs
}

fn stage_outputs(stage: &CompiledStage) -> BTreeMap<u32, String> {
    let mut outputs = BTreeMap::new();
    if let Some(result) = stage.entry().and_then(|e| e.function.result.as_ref()) {
        collect_locations(
            &stage.module,
            None,
            result.ty,
            result.binding.as_ref(),
            &mut outputs,
        );
    }
    outputs
}

/// Checks that the stages fit together and merges their reflection.
///
/// `attributes` pins vertex inputs to locations, the way a demo binds
/// attribute names before linking. WGSL fixes locations in the source, so a
/// mismatch is reported instead of rebinding.
pub fn link(
    vertex: &CompiledStage,
    fragment: Option<&CompiledStage>,
    attributes: &[(u32, &str)],
) -> Result<ProgramLayout, ShaderError> {
    if vertex.stage != ShaderStage::Vertex {
        return Err(ShaderError::Link(format!(
            "expected a vertex stage, got a {} stage",
            vertex.stage
        )));
    }

    let mut uniforms = reflect_uniforms(vertex);
    let mut resources = reflect_resources(vertex);

    if let Some(fragment) = fragment {
        if fragment.stage != ShaderStage::Fragment {
            return Err(ShaderError::Link(format!(
                "expected a fragment stage, got a {} stage",
                fragment.stage
            )));
        }

        let written = stage_outputs(vertex);
        for (location, name) in stage_inputs(fragment) {
            if !written.contains_key(&location) {
                return Err(ShaderError::Link(format!(
                    "fragment input '{}' at location {} is not written by the vertex shader",
                    name, location
                )));
            }
        }

        for uniform in reflect_uniforms(fragment) {
            match uniforms
                .iter_mut()
                .find(|u| u.group == uniform.group && u.binding == uniform.binding)
            {
                Some(existing) => {
                    if existing.name != uniform.name || existing.size != uniform.size {
                        return Err(ShaderError::Link(format!(
                            "uniform '{}' and '{}' disagree at group {}, binding {}",
                            existing.name, uniform.name, uniform.group, uniform.binding
                        )));
                    }
                    existing.visibility |= uniform.visibility;
                }
                None => uniforms.push(uniform),
            }
        }

        for resource in reflect_resources(fragment) {
            match resources
                .iter_mut()
                .find(|r| r.group == resource.group && r.binding == resource.binding)
            {
                Some(existing) => {
                    if existing.ty != resource.ty {
                        return Err(ShaderError::Link(format!(
                            "resource '{}' and '{}' disagree at group {}, binding {}",
                            existing.name, resource.name, resource.group, resource.binding
                        )));
                    }
                    existing.visibility |= resource.visibility;
                }
                None => resources.push(resource),
            }
        }
    }

    for uniform in &uniforms {
        if let Some(resource) = resources
            .iter()
            .find(|r| r.group == uniform.group && r.binding == uniform.binding)
        {
            return Err(ShaderError::Link(format!(
                "uniform '{}' and resource '{}' share group {}, binding {}",
                uniform.name, resource.name, uniform.group, uniform.binding
            )));
        }
    }

    let inputs = stage_inputs(vertex);
    for &(location, name) in attributes {
        if inputs.get(&location).map(String::as_str) != Some(name) {
            let declared = inputs
                .iter()
                .find(|(_, input)| input.as_str() == name)
                .map(|(l, _)| l.to_string())
                .unwrap_or_else(|| "nowhere".to_string());
            return Err(ShaderError::Link(format!(
                "attribute '{}' requested at location {} but declared at {}",
                name, location, declared
            )));
        }
    }

    log::info!("Linking program successful.");
    Ok(ProgramLayout {
        uniforms,
        resources,
        attributes: inputs,
    })
}

/// Fixed-function state of a render pipeline built from a [`ShaderProgram`].
#[derive(Debug, Clone)]
pub struct PipelineConfig<'a> {
    pub label: Option<&'a str>,
    pub color_format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
    pub vertex_layouts: &'a [wgpu::VertexBufferLayout<'a>],
    pub topology: wgpu::PrimitiveTopology,
    pub strip_index_format: Option<wgpu::IndexFormat>,
    pub cull_mode: Option<wgpu::Face>,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub depth_write: bool,
    pub depth_compare: wgpu::CompareFunction,
}

impl<'a> PipelineConfig<'a> {
    /// Opaque triangles, back face culling and a standard depth test.
    pub fn new(
        color_format: wgpu::TextureFormat,
        vertex_layouts: &'a [wgpu::VertexBufferLayout<'a>],
    ) -> Self {
        Self {
            label: None,
            color_format,
            blend: Some(wgpu::BlendState::REPLACE),
            vertex_layouts,
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            cull_mode: Some(wgpu::Face::Back),
            depth_format: Some(Texture::DEPTH_FORMAT),
            depth_write: true,
            depth_compare: wgpu::CompareFunction::Less,
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_topology(
        mut self,
        topology: wgpu::PrimitiveTopology,
        strip_index_format: Option<wgpu::IndexFormat>,
    ) -> Self {
        self.topology = topology;
        self.strip_index_format = strip_index_format;
        self
    }

    pub fn with_blend(mut self, blend: Option<wgpu::BlendState>) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_cull_mode(mut self, cull_mode: Option<wgpu::Face>) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    pub fn with_depth(
        mut self,
        format: Option<wgpu::TextureFormat>,
        write: bool,
        compare: wgpu::CompareFunction,
    ) -> Self {
        self.depth_format = format;
        self.depth_write = write;
        self.depth_compare = compare;
        self
    }
}

static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(1);

/// A linked vertex + fragment program.
#[derive(Debug)]
pub struct ShaderProgram {
    id: u64,
    layout: ProgramLayout,
    vertex_entry: String,
    fragment_entry: Option<String>,
    vertex: wgpu::ShaderModule,
    fragment: Option<wgpu::ShaderModule>,
    bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    pipeline_layout: wgpu::PipelineLayout,
}

impl ShaderProgram {
    pub fn new(device: &wgpu::Device, vertex: &str, fragment: &str) -> Result<Self, ShaderError> {
        Self::with_attributes(device, vertex, Some(fragment), &[])
    }

    pub fn with_attributes(
        device: &wgpu::Device,
        vertex: &str,
        fragment: Option<&str>,
        attributes: &[(u32, &str)],
    ) -> Result<Self, ShaderError> {
        let vertex = compile_stage(vertex, ShaderStage::Vertex)?;
        let fragment = fragment
            .map(|source| compile_stage(source, ShaderStage::Fragment))
            .transpose()?;
        let layout = link(&vertex, fragment.as_ref(), attributes)?;

        let create_module = |stage: &CompiledStage| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage.stage {
                    ShaderStage::Vertex => "Vertex Shader",
                    ShaderStage::Fragment => "Fragment Shader",
                }),
                source: wgpu::ShaderSource::Wgsl(stage.source.as_str().into()),
            })
        };
        let vertex_module = create_module(&vertex);
        let fragment_module = fragment.as_ref().map(create_module);

        let bind_group_layouts: Vec<_> = (0..layout.group_count())
            .map(|group| {
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    entries: &layout.group_entries(group),
                    label: Some("program_bind_group_layout"),
                })
            })
            .collect();
        let layout_refs: Vec<_> = bind_group_layouts.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Program Pipeline Layout"),
            bind_group_layouts: &layout_refs,
            push_constant_ranges: &[],
        });

        Ok(Self {
            id: NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed),
            layout,
            vertex_entry: vertex.entry_point,
            fragment_entry: fragment.map(|f| f.entry_point),
            vertex: vertex_module,
            fragment: fragment_module,
            bind_group_layouts,
            pipeline_layout,
        })
    }

    /// Unique per program, used to cache lookups against it.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn layout(&self) -> &ProgramLayout {
        &self.layout
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.layout.uniform_location(name)
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.layout.attribute_location(name)
    }

    pub fn bind_group_layout(&self, group: u32) -> Option<&wgpu::BindGroupLayout> {
        self.bind_group_layouts.get(group as usize)
    }

    pub fn bind_group_layouts(&self) -> &[wgpu::BindGroupLayout] {
        &self.bind_group_layouts
    }

    pub fn pipeline(&self, device: &wgpu::Device, config: &PipelineConfig) -> wgpu::RenderPipeline {
        mk_render_pipeline(
            device,
            &self.pipeline_layout,
            (&self.vertex, self.vertex_entry.as_str()),
            self.fragment.as_ref().zip(self.fragment_entry.as_deref()),
            config,
        )
    }
}
