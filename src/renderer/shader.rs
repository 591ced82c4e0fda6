//! 着色器程序
//!
//! 从两个 WGSL 源文件构建：逐行读取源码，用 naga 解析和验证每个阶段，
//! 反射出 uniform 表并把两个阶段链接起来，然后创建 wgpu 着色器模块、
//! bind group layout 和 uniform 缓冲。
//!
//! uniform 按名字设置，每次调用都重新查表。uniform 缓冲中的成员通过
//! `queue.write_buffer` 写入，在下一次提交时生效；纹理 uniform 的值是
//! 纹理单元号，绘制时从绑定状态中取对应单元上的纹理。

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use tracing::{debug, error, info};

use crate::core::error::{AssetError, GraphicsError, Result, UniformError};
use crate::gfx::{BindingState, GpuContext};
use crate::renderer::resource::{GpuResource, ResourceId};
use crate::renderer::uniform::{
    BindingKey, BindingKind, UniformTable, UniformValue, UniformWrite,
};

/// 着色器程序
pub struct ShaderProgram {
    id: ResourceId,
    vertex_module: wgpu::ShaderModule,
    fragment_module: wgpu::ShaderModule,
    vertex_entry: String,
    fragment_entry: String,
    uniforms: UniformTable,
    bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_buffers: HashMap<BindingKey, wgpu::Buffer>,
    /// 纹理绑定 → 纹理单元，未设置的纹理使用单元 0
    texture_units: RefCell<HashMap<BindingKey, u32>>,
}

impl ShaderProgram {
    /// 读取、编译并链接两个阶段
    pub fn new(
        ctx: &GpuContext,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();
        let id = ResourceId::allocate();

        // 1. 读取源码
        let vertex_source = read_shader_source(vertex_path)?;
        let fragment_source = read_shader_source(fragment_path)?;

        // 2. 编译两个阶段
        let vertex = compile_stage(&vertex_source, naga::ShaderStage::Vertex, vertex_path)?;
        let fragment =
            compile_stage(&fragment_source, naga::ShaderStage::Fragment, fragment_path)?;

        // 3. 反射并链接 uniform
        let uniforms = UniformTable::reflect(&vertex.module, wgpu::ShaderStages::VERTEX)?
            .link(UniformTable::reflect(
                &fragment.module,
                wgpu::ShaderStages::FRAGMENT,
            )?)
            .map_err(|e| {
                error!(program = id.raw(), "Shader link failed: {}", e);
                e
            })?;

        // 4. 创建着色器模块
        let vertex_module = create_module(ctx, id, "Vertex", vertex_source)?;
        let fragment_module = create_module(ctx, id, "Fragment", fragment_source)?;

        // 5. 按组创建 bind group layout
        let bind_group_layouts = (0..uniforms.group_count())
            .map(|group| {
                let entries: Vec<_> = uniforms.group(group).map(|b| b.layout_entry()).collect();
                ctx.checked("create_bind_group_layout", || {
                    ctx.device
                        .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                            label: Some(&format!("Program {} Group {}", id, group)),
                            entries: &entries,
                        })
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let pipeline_layout = ctx.checked("create_pipeline_layout", || {
            let layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(&format!("Program {} Layout", id)),
                    bind_group_layouts: &layouts,
                    push_constant_ranges: &[],
                })
        })?;

        // 6. 为每个 uniform 块创建缓冲（初始内容为零）
        let mut uniform_buffers = HashMap::new();
        for binding in uniforms.bindings() {
            if let BindingKind::UniformBlock { size } = binding.kind {
                let buffer = ctx.checked("create_uniform_buffer", || {
                    ctx.device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some(&format!("Program {} {}", id, binding.name)),
                        size,
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    })
                })?;
                uniform_buffers.insert((binding.group, binding.binding), buffer);
            }
        }

        info!(
            program = id.raw(),
            vertex = %vertex_path.display(),
            fragment = %fragment_path.display(),
            bindings = uniforms.bindings().count(),
            "Shader program linked"
        );

        Ok(Self {
            id,
            vertex_module,
            fragment_module,
            vertex_entry: vertex.entry_point,
            fragment_entry: fragment.entry_point,
            uniforms,
            bind_group_layouts,
            pipeline_layout,
            uniform_buffers,
            texture_units: RefCell::new(HashMap::new()),
        })
    }

    pub fn bind<'a>(&'a self, state: &mut BindingState<'a>) -> bool {
        state.program.bind(self)
    }

    pub fn unbind(state: &mut BindingState<'_>) -> bool {
        state.program.unbind()
    }

    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    pub fn set_uniform_1i<'a>(
        &'a self,
        ctx: &GpuContext,
        state: &mut BindingState<'a>,
        name: &str,
        value: i32,
    ) -> Result<()> {
        self.set_uniform(ctx, state, name, UniformValue::Int(value))
    }

    pub fn set_uniform_1f<'a>(
        &'a self,
        ctx: &GpuContext,
        state: &mut BindingState<'a>,
        name: &str,
        value: f32,
    ) -> Result<()> {
        self.set_uniform(ctx, state, name, UniformValue::Float(value))
    }

    pub fn set_uniform_2f<'a>(
        &'a self,
        ctx: &GpuContext,
        state: &mut BindingState<'a>,
        name: &str,
        v0: f32,
        v1: f32,
    ) -> Result<()> {
        self.set_uniform(ctx, state, name, UniformValue::Vec2([v0, v1]))
    }

    pub fn set_uniform_3f<'a>(
        &'a self,
        ctx: &GpuContext,
        state: &mut BindingState<'a>,
        name: &str,
        v0: f32,
        v1: f32,
        v2: f32,
    ) -> Result<()> {
        self.set_uniform(ctx, state, name, UniformValue::Vec3([v0, v1, v2]))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_uniform_4f<'a>(
        &'a self,
        ctx: &GpuContext,
        state: &mut BindingState<'a>,
        name: &str,
        v0: f32,
        v1: f32,
        v2: f32,
        v3: f32,
    ) -> Result<()> {
        self.set_uniform(ctx, state, name, UniformValue::Vec4([v0, v1, v2, v3]))
    }

    /// `set_uniform_4f` 的向量形式
    pub fn set_uniform_4fv<'a>(
        &'a self,
        ctx: &GpuContext,
        state: &mut BindingState<'a>,
        name: &str,
        value: [f32; 4],
    ) -> Result<()> {
        self.set_uniform(ctx, state, name, UniformValue::Vec4(value))
    }

    /// 设置 4×4 矩阵（列主序）
    pub fn set_uniform_matrix4f<'a>(
        &'a self,
        ctx: &GpuContext,
        state: &mut BindingState<'a>,
        name: &str,
        value: [[f32; 4]; 4],
    ) -> Result<()> {
        self.set_uniform(ctx, state, name, UniformValue::Mat4(value))
    }

    fn set_uniform<'a>(
        &'a self,
        ctx: &GpuContext,
        state: &mut BindingState<'a>,
        name: &str,
        value: UniformValue,
    ) -> Result<()> {
        self.bind(state);

        match self.uniforms.resolve(name, &value, ctx.diagnostics())? {
            UniformWrite::Buffer { block, offset } => {
                let Some(buffer) = self.uniform_buffers.get(&block) else {
                    return ctx
                        .diagnostics()
                        .report(UniformError::NotFound(name.to_string()));
                };
                ctx.checked("set_uniform", || {
                    ctx.queue
                        .write_buffer(buffer, offset as wgpu::BufferAddress, value.bytes())
                })
            }
            UniformWrite::TextureUnit { texture, unit } => {
                self.texture_units.borrow_mut().insert(texture, unit);
                Ok(())
            }
            UniformWrite::Skip => Ok(()),
        }
    }

    /// 创建渲染管线：三角形列表，alpha 混合，无深度，无剔除
    pub(crate) fn create_pipeline(
        &self,
        device: &wgpu::Device,
        vertex_layout: wgpu::VertexBufferLayout<'_>,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("Program {} Pipeline", self.id)),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.vertex_module,
                entry_point: &self.vertex_entry,
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.fragment_module,
                entry_point: &self.fragment_entry,
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    /// 用当前 uniform 缓冲和纹理单元上的纹理创建这次绘制的 bind group
    pub(crate) fn create_bind_groups(
        &self,
        device: &wgpu::Device,
        state: &BindingState<'_>,
    ) -> Result<Vec<wgpu::BindGroup>> {
        let units = self.texture_units.borrow();
        let unit_of = |key: &BindingKey| units.get(key).copied().unwrap_or(0);

        let mut groups = Vec::with_capacity(self.bind_group_layouts.len());
        for (group, layout) in (0u32..).zip(&self.bind_group_layouts) {
            // 组内的采样器取自组内第一个纹理
            let group_texture = self
                .uniforms
                .group(group)
                .find(|b| b.kind == BindingKind::Texture)
                .map(|b| (b.group, b.binding));

            let mut entries = Vec::new();
            for binding in self.uniforms.group(group) {
                let key = (binding.group, binding.binding);
                let resource = match binding.kind {
                    BindingKind::UniformBlock { .. } => self
                        .uniform_buffers
                        .get(&key)
                        .ok_or_else(|| UniformError::NotFound(binding.name.clone()))?
                        .as_entire_binding(),
                    BindingKind::Texture => {
                        let texture = state
                            .texture(unit_of(&key))
                            .ok_or(GraphicsError::NothingBound("texture"))?;
                        wgpu::BindingResource::TextureView(texture.view())
                    }
                    BindingKind::Sampler => {
                        let texture_key = group_texture.ok_or_else(|| {
                            GraphicsError::ShaderLink(format!(
                                "sampler '{}' has no texture in group {}",
                                binding.name, group
                            ))
                        })?;
                        let texture = state
                            .texture(unit_of(&texture_key))
                            .ok_or(GraphicsError::NothingBound("texture"))?;
                        wgpu::BindingResource::Sampler(texture.sampler())
                    }
                };
                entries.push(wgpu::BindGroupEntry {
                    binding: binding.binding,
                    resource,
                });
            }

            groups.push(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("Program {} Group {}", self.id, group)),
                layout,
                entries: &entries,
            }));
        }

        Ok(groups)
    }
}

impl GpuResource for ShaderProgram {
    fn id(&self) -> ResourceId {
        self.id
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        for buffer in self.uniform_buffers.values() {
            buffer.destroy();
        }
        debug!(id = self.id.raw(), "Shader program released");
    }
}

/// 逐行读取着色器源码，统一换行为 `\n`
pub fn read_shader_source(path: &Path) -> Result<String> {
    let read_error = |source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| {
        error!(path = %path.display(), "Failed to open shader source: {}", e);
        read_error(e)
    })?;

    let mut source = String::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(read_error)?;
        source.push_str(line.trim_end_matches('\r'));
        source.push('\n');
    }
    Ok(source)
}

/// 编译结果
struct CompiledStage {
    module: naga::Module,
    entry_point: String,
}

/// 解析并验证一个阶段，取出该阶段的入口函数
fn compile_stage(source: &str, stage: naga::ShaderStage, path: &Path) -> Result<CompiledStage> {
    let label = stage_label(stage);
    let fail = |message: String| {
        error!(stage = label, path = %path.display(), "Shader compilation failed:\n{}", message);
        GraphicsError::ShaderCompilation {
            stage: label,
            message,
        }
    };

    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| fail(e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| fail(e.emit_to_string(source)))?;

    let entry_point = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage)
        .map(|ep| ep.name.clone())
        .ok_or_else(|| fail(format!("no {} entry point", label)))?;

    debug!(stage = label, entry = %entry_point, "Shader stage compiled");

    Ok(CompiledStage {
        module,
        entry_point,
    })
}

fn stage_label(stage: naga::ShaderStage) -> &'static str {
    match stage {
        naga::ShaderStage::Vertex => "vertex",
        naga::ShaderStage::Fragment => "fragment",
        naga::ShaderStage::Compute => "compute",
    }
}

fn create_module(
    ctx: &GpuContext,
    id: ResourceId,
    stage: &str,
    source: String,
) -> Result<wgpu::ShaderModule> {
    ctx.checked("create_shader_module", || {
        ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("Program {} {}", id, stage)),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    })
}
