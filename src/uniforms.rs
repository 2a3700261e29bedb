//! Uniform storage for a [`ShaderProgram`] and typed uniform binders.
//!
//! Every `var<uniform>` of a program gets a CPU shadow copy and a GPU buffer.
//! Values are written into the shadow by location and uploaded in one go with
//! [`ProgramUniforms::flush`].

use bytemuck::Pod;

use crate::{
    math::{Matrix4, Vector2, Vector3, Vector4},
    shader::{ShaderError, ShaderProgram, UniformLocation},
};

/// A value with the same memory layout as its WGSL counterpart.
pub trait UniformValue: Pod {
    fn bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl UniformValue for f32 {}
impl UniformValue for i32 {}
impl UniformValue for u32 {}
impl UniformValue for Vector2 {}
impl UniformValue for Vector3 {}
impl UniformValue for Vector4 {}
impl UniformValue for Matrix4 {}

#[derive(Debug)]
struct UniformSlot {
    name: String,
    group: u32,
    binding: u32,
    shadow: Vec<u8>,
    buffer: wgpu::Buffer,
    dirty: bool,
}

/// Copies `bytes` into `shadow` at `location`, checking both the declared
/// size and the actual slot bounds.
fn write_shadow(
    name: &str,
    shadow: &mut [u8],
    location: UniformLocation,
    bytes: &[u8],
) -> Result<(), ShaderError> {
    let size_error = || ShaderError::UniformSize {
        name: name.to_string(),
        expected: location.size,
        actual: bytes.len(),
    };
    if bytes.len() > location.size as usize {
        return Err(size_error());
    }
    let start = location.offset as usize;
    start
        .checked_add(bytes.len())
        .and_then(|end| shadow.get_mut(start..end))
        .ok_or_else(size_error)?
        .copy_from_slice(bytes);
    Ok(())
}

#[derive(Debug)]
pub struct ProgramUniforms {
    program_id: u64,
    slots: Vec<UniformSlot>,
}

impl ProgramUniforms {
    pub fn new(device: &wgpu::Device, program: &ShaderProgram) -> Self {
        let slots = program
            .layout()
            .uniforms
            .iter()
            .map(|uniform| {
                // buffer copies work in multiples of 4 bytes
                let size = (uniform.size as u64).div_ceil(wgpu::COPY_BUFFER_ALIGNMENT)
                    * wgpu::COPY_BUFFER_ALIGNMENT;
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(uniform.name.as_str()),
                    size,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                UniformSlot {
                    name: uniform.name.clone(),
                    group: uniform.group,
                    binding: uniform.binding,
                    shadow: vec![0; size as usize],
                    buffer,
                    dirty: true,
                }
            })
            .collect();
        Self {
            program_id: program.id(),
            slots,
        }
    }

    /// Id of the program these uniforms were created for.
    pub fn program_id(&self) -> u64 {
        self.program_id
    }

    /// Fails unless these uniforms belong to `program`.
    pub fn check_program(&self, program: &ShaderProgram) -> Result<(), ShaderError> {
        if self.program_id != program.id() {
            return Err(ShaderError::ProgramMismatch {
                expected: self.program_id,
                actual: program.id(),
            });
        }
        Ok(())
    }

    /// Copies `bytes` to `location`. Shorter values leave the rest untouched.
    pub fn set_bytes(&mut self, location: UniformLocation, bytes: &[u8]) -> Result<(), ShaderError> {
        let slot = self
            .slots
            .get_mut(location.uniform)
            .ok_or_else(|| ShaderError::UnknownUniform(format!("#{}", location.uniform)))?;
        write_shadow(&slot.name, &mut slot.shadow, location, bytes)?;
        slot.dirty = true;
        Ok(())
    }

    pub fn set<T: UniformValue>(&mut self, location: UniformLocation, value: &T) -> Result<(), ShaderError> {
        self.set_bytes(location, value.bytes())
    }

    /// Looks `name` up in `program` and writes `value` there.
    pub fn set_named<T: UniformValue>(
        &mut self,
        program: &ShaderProgram,
        name: &str,
        value: &T,
    ) -> Result<(), ShaderError> {
        self.check_program(program)?;
        let location = program
            .uniform_location(name)
            .ok_or_else(|| ShaderError::UnknownUniform(name.to_string()))?;
        self.set(location, value)
    }

    /// Uploads every uniform written since the last flush.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        for slot in self.slots.iter_mut().filter(|s| s.dirty) {
            queue.write_buffer(&slot.buffer, 0, &slot.shadow);
            slot.dirty = false;
        }
    }

    pub fn buffer(&self, uniform: usize) -> Option<&wgpu::Buffer> {
        self.slots.get(uniform).map(|s| &s.buffer)
    }

    /// Builds the bind group for `group`. Uniform buffers are filled in
    /// automatically; textures and samplers must be supplied in `resources`.
    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        program: &ShaderProgram,
        group: u32,
        resources: &[wgpu::BindGroupEntry],
    ) -> Result<wgpu::BindGroup, ShaderError> {
        let layout = program
            .bind_group_layout(group)
            .ok_or_else(|| ShaderError::MissingResource {
                name: "<bind group layout>".to_string(),
                group,
                binding: 0,
            })?;

        for resource in program.layout().resources.iter().filter(|r| r.group == group) {
            if !resources.iter().any(|e| e.binding == resource.binding) {
                return Err(ShaderError::MissingResource {
                    name: resource.name.clone(),
                    group,
                    binding: resource.binding,
                });
            }
        }

        let mut entries: Vec<wgpu::BindGroupEntry> = self
            .slots
            .iter()
            .filter(|s| s.group == group)
            .map(|s| wgpu::BindGroupEntry {
                binding: s.binding,
                resource: s.buffer.as_entire_binding(),
            })
            .collect();
        entries.extend(resources.iter().cloned());

        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &entries,
            label: Some("program_bind_group"),
        }))
    }
}

/// A named uniform with a value, written into [`ProgramUniforms`] on
/// [`bind_state`](Self::bind_state). The location is resolved once per
/// program.
#[derive(Debug, Clone)]
pub struct Uniform<T: UniformValue> {
    name: String,
    value: T,
    location: Option<(u64, UniformLocation)>,
}

pub type UniformFloatBinder = Uniform<f32>;
pub type UniformVec2Binder = Uniform<Vector2>;
pub type UniformVec3Binder = Uniform<Vector3>;
pub type UniformVec4Binder = Uniform<Vector4>;
pub type UniformMat4Binder = Uniform<Matrix4>;

impl<T: UniformValue> Uniform<T> {
    pub fn new(name: &str, value: T) -> Self {
        Self {
            name: name.to_string(),
            value,
            location: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    fn location(&mut self, program: &ShaderProgram) -> Result<UniformLocation, ShaderError> {
        match self.location {
            Some((id, location)) if id == program.id() => Ok(location),
            _ => {
                let location = program
                    .uniform_location(&self.name)
                    .ok_or_else(|| ShaderError::UnknownUniform(self.name.clone()))?;
                self.location = Some((program.id(), location));
                Ok(location)
            }
        }
    }

    pub fn bind_state(
        &mut self,
        program: &ShaderProgram,
        uniforms: &mut ProgramUniforms,
    ) -> Result<(), ShaderError> {
        uniforms.check_program(program)?;
        let location = self.location(program)?;
        uniforms.set(location, &self.value)
    }
}
