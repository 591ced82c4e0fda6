//! Uniform 反射
//!
//! 用 naga 解析 WGSL 模块，收集着色器声明的资源绑定：
//!
//! - `var<uniform>` 结构体：每个成员按名字登记为一个可设置的 uniform
//!   （所在绑定、字节偏移、类型）
//! - 纹理：按变量名登记为采样器 uniform，值是纹理单元号
//! - 采样器：随同组内的纹理一起提供
//!
//! 顶点和片元两个阶段各自反射后再链接成一张表。

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::num::NonZeroU64;

use naga::{ScalarKind, TypeInner, VectorSize};

use crate::core::diagnostics::Diagnostics;
use crate::core::error::{FlightHeadingError, GraphicsError, Result, UniformError};
use crate::gfx::MAX_TEXTURE_UNITS;

/// uniform 结构体成员的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    /// 其它类型，可以被反射但不能通过 `set_uniform_*` 设置
    Unsupported,
}

impl UniformKind {
    /// 值的字节大小，不支持的类型为 0
    pub fn size(self) -> u64 {
        match self {
            UniformKind::Int | UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Mat4 => 64,
            UniformKind::Unsupported => 0,
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UniformKind::Int => "i32",
            UniformKind::Float => "f32",
            UniformKind::Vec2 => "vec2<f32>",
            UniformKind::Vec3 => "vec3<f32>",
            UniformKind::Vec4 => "vec4<f32>",
            UniformKind::Mat4 => "mat4x4<f32>",
            UniformKind::Unsupported => "an unsupported type",
        };
        f.write_str(name)
    }
}

/// 要写入的 uniform 值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// 按 WGSL uniform 内存布局的字节表示
    pub fn bytes(&self) -> &[u8] {
        match self {
            UniformValue::Int(v) => bytemuck::bytes_of(v),
            UniformValue::Float(v) => bytemuck::bytes_of(v),
            UniformValue::Vec2(v) => bytemuck::bytes_of(v),
            UniformValue::Vec3(v) => bytemuck::bytes_of(v),
            UniformValue::Vec4(v) => bytemuck::bytes_of(v),
            UniformValue::Mat4(v) => bytemuck::bytes_of(v),
        }
    }
}

/// 绑定位置（group, binding）
pub type BindingKey = (u32, u32);

/// 绑定的资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// uniform 缓冲，大小为结构体跨度
    UniformBlock { size: u64 },
    /// 二维浮点纹理
    Texture,
    /// 过滤采样器
    Sampler,
}

/// 一个反射得到的资源绑定
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedBinding {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub kind: BindingKind,
    pub visibility: wgpu::ShaderStages,
}

impl ReflectedBinding {
    /// 对应的 bind group layout 条目
    pub fn layout_entry(&self) -> wgpu::BindGroupLayoutEntry {
        let ty = match self.kind {
            BindingKind::UniformBlock { size } => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size),
            },
            BindingKind::Texture => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            BindingKind::Sampler => {
                wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
            }
        };
        wgpu::BindGroupLayoutEntry {
            binding: self.binding,
            visibility: self.visibility,
            ty,
            count: None,
        }
    }
}

/// 按名字查询到的 uniform 位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformLocation {
    /// uniform 缓冲中的一个成员
    Member {
        block: BindingKey,
        offset: u32,
        kind: UniformKind,
    },
    /// 纹理采样器，值为纹理单元
    Sampler { texture: BindingKey },
}

/// 着色器程序的 uniform 表
#[derive(Debug, Clone, Default)]
pub struct UniformTable {
    bindings: BTreeMap<BindingKey, ReflectedBinding>,
    locations: HashMap<String, UniformLocation>,
}

impl UniformTable {
    /// 反射一个已验证的着色器模块
    pub fn reflect(module: &naga::Module, stage: wgpu::ShaderStages) -> Result<Self> {
        let mut table = Self::default();

        for (_, var) in module.global_variables.iter() {
            let Some(binding) = &var.binding else {
                continue;
            };
            let key = (binding.group, binding.binding);
            let name = var.name.clone().unwrap_or_default();
            let ty = &module.types[var.ty].inner;

            let kind = match (var.space, ty) {
                (naga::AddressSpace::Uniform, TypeInner::Struct { members, span }) => {
                    for member in members {
                        let Some(member_name) = &member.name else {
                            continue;
                        };
                        table.locations.insert(
                            member_name.clone(),
                            UniformLocation::Member {
                                block: key,
                                offset: member.offset,
                                kind: member_kind(&module.types[member.ty].inner),
                            },
                        );
                    }
                    BindingKind::UniformBlock { size: align_to_16(*span as u64) }
                }
                // 非结构体的 uniform 变量，整个缓冲就是这一个值
                (naga::AddressSpace::Uniform, inner) if member_kind(inner).size() > 0 => {
                    let kind = member_kind(inner);
                    table.locations.insert(
                        name.clone(),
                        UniformLocation::Member {
                            block: key,
                            offset: 0,
                            kind,
                        },
                    );
                    BindingKind::UniformBlock { size: align_to_16(kind.size()) }
                }
                (naga::AddressSpace::Handle, TypeInner::Image { .. }) => {
                    table
                        .locations
                        .insert(name.clone(), UniformLocation::Sampler { texture: key });
                    BindingKind::Texture
                }
                (naga::AddressSpace::Handle, TypeInner::Sampler { .. }) => BindingKind::Sampler,
                _ => {
                    return Err(GraphicsError::ShaderLink(format!(
                        "binding '{}' at group {} binding {} has an unsupported type",
                        name, key.0, key.1
                    ))
                    .into())
                }
            };

            table.bindings.insert(
                key,
                ReflectedBinding {
                    name,
                    group: key.0,
                    binding: key.1,
                    kind,
                    visibility: stage,
                },
            );
        }

        Ok(table)
    }

    /// 链接另一个阶段的表
    ///
    /// 同一位置在两个阶段中必须声明为同名同类型，可见性取并集。
    pub fn link(mut self, other: UniformTable) -> Result<Self> {
        for (key, binding) in other.bindings {
            match self.bindings.get_mut(&key) {
                Some(existing) => {
                    if existing.name != binding.name || existing.kind != binding.kind {
                        return Err(GraphicsError::ShaderLink(format!(
                            "group {} binding {} is declared differently in each stage ('{}' vs '{}')",
                            key.0, key.1, existing.name, binding.name
                        ))
                        .into());
                    }
                    existing.visibility |= binding.visibility;
                }
                None => {
                    self.bindings.insert(key, binding);
                }
            }
        }

        for (name, location) in other.locations {
            match self.locations.get(&name) {
                Some(existing) if *existing != location => {
                    return Err(GraphicsError::ShaderLink(format!(
                        "uniform '{}' is declared differently in each stage",
                        name
                    ))
                    .into());
                }
                _ => {
                    self.locations.insert(name, location);
                }
            }
        }

        Ok(self)
    }

    /// 按名字查找 uniform
    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied()
    }

    /// 所有绑定，按 (group, binding) 排序
    pub fn bindings(&self) -> impl Iterator<Item = &ReflectedBinding> {
        self.bindings.values()
    }

    /// 某个组内的绑定
    pub fn group(&self, group: u32) -> impl Iterator<Item = &ReflectedBinding> {
        self.bindings.range((group, 0)..=(group, u32::MAX)).map(|(_, b)| b)
    }

    /// 需要的 bind group 数量（最大组号 + 1）
    pub fn group_count(&self) -> u32 {
        self.bindings.keys().last().map_or(0, |(group, _)| group + 1)
    }

    /// 检查要写入的值和声明类型是否一致
    pub fn check_value(name: &str, expected: UniformKind, value: &UniformValue) -> Result<()> {
        if expected == value.kind() {
            Ok(())
        } else {
            Err(UniformError::TypeMismatch {
                name: name.to_string(),
                expected: expected.to_string(),
                found: value.kind().to_string(),
            }
            .into())
        }
    }

    /// 解析一次按名字的写入
    ///
    /// 找不到名字、类型不符、纹理单元越界都交给诊断策略：
    /// fail-fast 下返回错误，否则返回 `UniformWrite::Skip`。
    pub fn resolve(
        &self,
        name: &str,
        value: &UniformValue,
        diagnostics: &Diagnostics,
    ) -> Result<UniformWrite> {
        let skip = |err: FlightHeadingError| {
            diagnostics.report(err).map(|()| UniformWrite::Skip)
        };

        match self.location(name) {
            None => skip(UniformError::NotFound(name.to_string()).into()),
            Some(UniformLocation::Member {
                block,
                offset,
                kind,
            }) => match Self::check_value(name, kind, value) {
                Ok(()) => Ok(UniformWrite::Buffer { block, offset }),
                Err(e) => skip(e),
            },
            Some(UniformLocation::Sampler { texture }) => match *value {
                UniformValue::Int(unit) => match u32::try_from(unit) {
                    Ok(unit) if (unit as usize) < MAX_TEXTURE_UNITS => {
                        Ok(UniformWrite::TextureUnit { texture, unit })
                    }
                    _ => skip(GraphicsError::InvalidTextureUnit(unit as u32).into()),
                },
                ref other => skip(
                    UniformError::TypeMismatch {
                        name: name.to_string(),
                        expected: "a texture unit (i32)".to_string(),
                        found: other.kind().to_string(),
                    }
                    .into(),
                ),
            },
        }
    }
}

/// 一次 uniform 写入的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformWrite {
    /// 写入某个 uniform 缓冲的偏移处
    Buffer { block: BindingKey, offset: u32 },
    /// 纹理 uniform 改用另一个纹理单元
    TextureUnit { texture: BindingKey, unit: u32 },
    /// 错误已经上报，跳过这次写入
    Skip,
}

fn member_kind(inner: &TypeInner) -> UniformKind {
    match inner {
        TypeInner::Scalar(scalar) if scalar.width == 4 => match scalar.kind {
            ScalarKind::Sint => UniformKind::Int,
            ScalarKind::Float => UniformKind::Float,
            _ => UniformKind::Unsupported,
        },
        TypeInner::Vector { size, scalar }
            if scalar.kind == ScalarKind::Float && scalar.width == 4 =>
        {
            match size {
                VectorSize::Bi => UniformKind::Vec2,
                VectorSize::Tri => UniformKind::Vec3,
                VectorSize::Quad => UniformKind::Vec4,
            }
        }
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            scalar,
        } if scalar.kind == ScalarKind::Float && scalar.width == 4 => UniformKind::Mat4,
        _ => UniformKind::Unsupported,
    }
}

fn align_to_16(size: u64) -> u64 {
    (size + 15) & !15
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::DiagnosticPolicy;

    const VERTEX: &str = include_str!("../../res/shaders/DrawRect.vert");
    const FRAGMENT: &str = include_str!("../../res/shaders/DrawRect.frag");

    fn reflect(source: &str, stage: wgpu::ShaderStages) -> UniformTable {
        let module = naga::front::wgsl::parse_str(source).unwrap();
        UniformTable::reflect(&module, stage).unwrap()
    }

    fn draw_rect_table() -> UniformTable {
        reflect(VERTEX, wgpu::ShaderStages::VERTEX)
            .link(reflect(FRAGMENT, wgpu::ShaderStages::FRAGMENT))
            .unwrap()
    }

    #[test]
    fn test_draw_rect_uniforms() {
        let table = draw_rect_table();

        assert_eq!(
            table.location("modelMat"),
            Some(UniformLocation::Member {
                block: (0, 0),
                offset: 0,
                kind: UniformKind::Mat4,
            })
        );
        assert_eq!(
            table.location("rectTexture"),
            Some(UniformLocation::Sampler { texture: (1, 0) })
        );
        assert_eq!(table.location("doesNotExist"), None);
        assert_eq!(table.group_count(), 2);
    }

    #[test]
    fn test_draw_rect_bindings() {
        let table = draw_rect_table();
        let bindings: Vec<_> = table.bindings().collect();

        assert_eq!(bindings.len(), 3);
        assert_eq!(bindings[0].kind, BindingKind::UniformBlock { size: 64 });
        assert_eq!(bindings[0].visibility, wgpu::ShaderStages::VERTEX);
        assert_eq!(bindings[1].kind, BindingKind::Texture);
        assert_eq!(bindings[2].kind, BindingKind::Sampler);
        assert_eq!(bindings[2].visibility, wgpu::ShaderStages::FRAGMENT);
        assert_eq!(table.group(1).count(), 2);
    }

    #[test]
    fn test_member_offsets_and_kinds() {
        let table = reflect(
            r#"
            struct Params {
                tint: vec4<f32>,
                scale: f32,
                mode: i32,
                offset: vec2<f32>,
            };
            @group(0) @binding(0) var<uniform> params: Params;

            @vertex
            fn vs_main() -> @builtin(position) vec4<f32> {
                return params.tint * params.scale + vec4<f32>(params.offset, f32(params.mode), 0.0);
            }
            "#,
            wgpu::ShaderStages::VERTEX,
        );

        let offset_of = |name: &str| match table.location(name) {
            Some(UniformLocation::Member { offset, kind, .. }) => (offset, kind),
            other => panic!("unexpected location {:?}", other),
        };

        assert_eq!(offset_of("tint"), (0, UniformKind::Vec4));
        assert_eq!(offset_of("scale"), (16, UniformKind::Float));
        assert_eq!(offset_of("mode"), (20, UniformKind::Int));
        assert_eq!(offset_of("offset"), (24, UniformKind::Vec2));
    }

    #[test]
    fn test_bare_uniform_variable() {
        let table = reflect(
            r#"
            @group(0) @binding(0) var<uniform> tint: vec4<f32>;

            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return tint;
            }
            "#,
            wgpu::ShaderStages::FRAGMENT,
        );

        assert_eq!(
            table.location("tint"),
            Some(UniformLocation::Member {
                block: (0, 0),
                offset: 0,
                kind: UniformKind::Vec4,
            })
        );
        assert_eq!(
            table.bindings().next().map(|b| b.kind),
            Some(BindingKind::UniformBlock { size: 16 })
        );
    }

    #[test]
    fn test_visibility_is_merged() {
        let shared = r#"
            struct U { color: vec4<f32>, };
            @group(0) @binding(0) var<uniform> u: U;
        "#;
        let vertex = format!(
            "{shared}\n@vertex fn vs_main() -> @builtin(position) vec4<f32> {{ return u.color; }}"
        );
        let fragment = format!(
            "{shared}\n@fragment fn fs_main() -> @location(0) vec4<f32> {{ return u.color; }}"
        );

        let table = reflect(&vertex, wgpu::ShaderStages::VERTEX)
            .link(reflect(&fragment, wgpu::ShaderStages::FRAGMENT))
            .unwrap();

        let binding = table.bindings().next().unwrap();
        assert_eq!(binding.visibility, wgpu::ShaderStages::VERTEX_FRAGMENT);
    }

    #[test]
    fn test_conflicting_stages_fail_to_link() {
        let vertex = r#"
            struct U { color: vec4<f32>, };
            @group(0) @binding(0) var<uniform> u: U;
            @vertex fn vs_main() -> @builtin(position) vec4<f32> { return u.color; }
        "#;
        let fragment = r#"
            @group(0) @binding(0) var tex: texture_2d<f32>;
            @group(0) @binding(1) var samp: sampler;
            @fragment fn fs_main() -> @location(0) vec4<f32> {
                return textureSample(tex, samp, vec2<f32>(0.0, 0.0));
            }
        "#;

        let result = reflect(vertex, wgpu::ShaderStages::VERTEX)
            .link(reflect(fragment, wgpu::ShaderStages::FRAGMENT));
        assert!(result.is_err());
    }

    #[test]
    fn test_value_type_check() {
        let mat = UniformValue::Mat4([[0.0; 4]; 4]);
        assert!(UniformTable::check_value("modelMat", UniformKind::Mat4, &mat).is_ok());
        assert!(UniformTable::check_value("modelMat", UniformKind::Float, &mat).is_err());
        assert_eq!(mat.bytes().len(), 64);
        assert_eq!(UniformValue::Vec3([1.0, 2.0, 3.0]).bytes().len(), 12);
        assert_eq!(UniformValue::Int(7).bytes(), &7i32.to_ne_bytes());
    }

    fn diagnostics(policy: DiagnosticPolicy) -> Diagnostics {
        Diagnostics::new(policy, false)
    }

    #[test]
    fn test_resolve_member_and_sampler() {
        let table = draw_rect_table();
        let strict = diagnostics(DiagnosticPolicy::FailFast);

        let write = table
            .resolve("modelMat", &UniformValue::Mat4([[0.0; 4]; 4]), &strict)
            .unwrap();
        assert_eq!(write, UniformWrite::Buffer { block: (0, 0), offset: 0 });

        let write = table
            .resolve("rectTexture", &UniformValue::Int(15), &strict)
            .unwrap();
        assert_eq!(write, UniformWrite::TextureUnit { texture: (1, 0), unit: 15 });
    }

    #[test]
    fn test_resolve_unknown_name() {
        let table = draw_rect_table();
        let value = UniformValue::Float(1.0);

        let result = table.resolve("missing", &value, &diagnostics(DiagnosticPolicy::FailFast));
        assert!(matches!(
            result,
            Err(FlightHeadingError::Uniform(UniformError::NotFound(ref name))) if name == "missing"
        ));

        let result = table.resolve("missing", &value, &diagnostics(DiagnosticPolicy::LogAndContinue));
        assert_eq!(result.unwrap(), UniformWrite::Skip);
    }

    #[test]
    fn test_resolve_wrong_value_type() {
        let table = draw_rect_table();
        let strict = diagnostics(DiagnosticPolicy::FailFast);
        let lenient = diagnostics(DiagnosticPolicy::LogAndContinue);

        let vec = UniformValue::Vec4([1.0; 4]);
        assert!(matches!(
            table.resolve("modelMat", &vec, &strict),
            Err(FlightHeadingError::Uniform(UniformError::TypeMismatch { .. }))
        ));
        assert_eq!(table.resolve("modelMat", &vec, &lenient).unwrap(), UniformWrite::Skip);

        let float = UniformValue::Float(0.0);
        assert!(matches!(
            table.resolve("rectTexture", &float, &strict),
            Err(FlightHeadingError::Uniform(UniformError::TypeMismatch { .. }))
        ));
        assert_eq!(table.resolve("rectTexture", &float, &lenient).unwrap(), UniformWrite::Skip);
    }

    #[test]
    fn test_resolve_texture_unit_out_of_range() {
        let table = draw_rect_table();
        let strict = diagnostics(DiagnosticPolicy::FailFast);
        let lenient = diagnostics(DiagnosticPolicy::LogAndContinue);

        for unit in [16, -1] {
            let value = UniformValue::Int(unit);
            assert!(matches!(
                table.resolve("rectTexture", &value, &strict),
                Err(FlightHeadingError::Graphics(GraphicsError::InvalidTextureUnit(_)))
            ));
            assert_eq!(
                table.resolve("rectTexture", &value, &lenient).unwrap(),
                UniformWrite::Skip
            );
        }
    }
}
