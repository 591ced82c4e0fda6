//! 纹理
//!
//! 图像文件在主机端用 `image` 解码，按通道数选择上传格式，在 CPU 上生成完整
//! 的 mip 链后逐级上传。解码后的像素一直保留到纹理被 drop。

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Pixel};
use tracing::{debug, error, info};

use crate::core::error::{AssetError, Result};
use crate::gfx::{BindingState, GpuContext};
use crate::renderer::resource::{GpuResource, ResourceId};

/// 纹理坐标超出 [0,1] 时的寻址方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

impl From<WrapMode> for wgpu::AddressMode {
    fn from(mode: WrapMode) -> Self {
        match mode {
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

/// 纹理加载选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureOptions {
    /// 上下翻转，使第一行对应纹理坐标 v = 0（图像底部）
    pub flip_vertically: bool,
    /// 颜色纹理按 sRGB 采样
    pub srgb: bool,
    pub wrap: WrapMode,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            flip_vertically: true,
            srgb: true,
            wrap: WrapMode::Repeat,
        }
    }
}

/// 一级 mip 的像素
#[derive(Debug, Clone)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// 解码后的主机端图像
#[derive(Debug, Clone)]
pub struct TextureImage {
    /// 源图像的通道数（1、3 或 4）
    channels: u8,
    format: wgpu::TextureFormat,
    /// 上传时每像素字节数
    texel_size: u32,
    /// 第 0 级是原始尺寸
    levels: Vec<MipLevel>,
}

impl TextureImage {
    /// 读取并解码图像文件
    pub fn load(path: &Path, options: &TextureOptions) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| {
            error!(path = %path.display(), "Failed to read texture: {}", source);
            AssetError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let image = image::load_from_memory(&bytes).map_err(|e| {
            error!(path = %path.display(), "Failed to decode texture: {}", e);
            AssetError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        Self::from_image(image, path, options)
    }

    /// 从已解码的图像构建
    pub fn from_image(image: DynamicImage, path: &Path, options: &TextureOptions) -> Result<Self> {
        let channels = image.color().channel_count();
        let image = if options.flip_vertically {
            image.flipv()
        } else {
            image
        };

        let (format, texel_size, levels) = match channels {
            1 => (wgpu::TextureFormat::R8Unorm, 1, mip_chain(image.to_luma8())),
            // RGB 没有对应的 wgpu 格式，扩展为 RGBA 上传
            3 | 4 => {
                let format = if options.srgb {
                    wgpu::TextureFormat::Rgba8UnormSrgb
                } else {
                    wgpu::TextureFormat::Rgba8Unorm
                };
                (format, 4, mip_chain(image.to_rgba8()))
            }
            _ => {
                error!(path = %path.display(), channels, "Unsupported texture channel count");
                return Err(AssetError::UnsupportedChannels {
                    path: path.to_path_buf(),
                    channels,
                }
                .into());
            }
        };

        Ok(Self {
            channels,
            format,
            texel_size,
            levels,
        })
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn levels(&self) -> &[MipLevel] {
        &self.levels
    }
}

/// 完整 mip 链的级数
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// 逐级减半直到 1×1
fn mip_chain<P>(base: ImageBuffer<P, Vec<u8>>) -> Vec<MipLevel>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let count = mip_level_count(base.width(), base.height());
    let mut levels = Vec::with_capacity(count as usize);
    let mut current = base;

    for level in 0..count {
        if level > 0 {
            let width = (current.width() / 2).max(1);
            let height = (current.height() / 2).max(1);
            current = imageops::resize(&current, width, height, FilterType::Triangle);
        }
        levels.push(MipLevel {
            width: current.width(),
            height: current.height(),
            pixels: current.as_raw().clone(),
        });
    }

    levels
}

/// GPU 纹理
pub struct Texture {
    id: ResourceId,
    path: PathBuf,
    image: TextureImage,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl Texture {
    /// 解码图像文件并上传到 GPU
    pub fn new(ctx: &GpuContext, path: impl AsRef<Path>, options: TextureOptions) -> Result<Self> {
        let path = path.as_ref();
        let id = ResourceId::allocate();
        let image = TextureImage::load(path, &options)?;

        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };

        let texture = ctx.checked("create_texture", || {
            ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(&format!("Texture {} {}", id, path.display())),
                size,
                mip_level_count: image.levels().len() as u32,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: image.format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            })
        })?;

        for (mip_level, level) in (0u32..).zip(image.levels()) {
            ctx.checked("write_texture", || {
                ctx.queue.write_texture(
                    wgpu::ImageCopyTexture {
                        texture: &texture,
                        mip_level,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    &level.pixels,
                    wgpu::ImageDataLayout {
                        offset: 0,
                        bytes_per_row: Some(level.width * image.texel_size),
                        rows_per_image: Some(level.height),
                    },
                    wgpu::Extent3d {
                        width: level.width,
                        height: level.height,
                        depth_or_array_layers: 1,
                    },
                )
            })?;
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = ctx.checked("create_sampler", || {
            ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(&format!("Texture {} Sampler", id)),
                address_mode_u: options.wrap.into(),
                address_mode_v: options.wrap.into(),
                address_mode_w: options.wrap.into(),
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            })
        })?;

        info!(
            id = id.raw(),
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            channels = image.channels(),
            mip_levels = image.levels().len(),
            "Texture loaded"
        );

        Ok(Self {
            id,
            path: path.to_path_buf(),
            image,
            texture,
            view,
            sampler,
        })
    }

    /// 绑定到纹理单元 `slot`
    pub fn bind<'a>(&'a self, state: &mut BindingState<'a>, slot: u32) -> Result<bool> {
        state.bind_texture(slot, self)
    }

    pub fn unbind(state: &mut BindingState<'_>, slot: u32) -> Result<bool> {
        state.unbind_texture(slot)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// 源图像的通道数
    pub fn channels(&self) -> u8 {
        self.image.channels()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub(crate) fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

impl GpuResource for Texture {
    fn id(&self) -> ResourceId {
        self.id
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.texture.destroy();
        debug!(id = self.id.raw(), path = %self.path.display(), "Texture released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FlightHeadingError;
    use image::{GrayAlphaImage, GrayImage, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("flight_heading_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_rgba_dimensions_and_format() {
        let path = temp_path("rgba.png");
        RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let image = TextureImage::load(&path, &TextureOptions::default()).unwrap();
        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
        assert_eq!(image.channels(), 4);
        assert_eq!(image.format(), wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(image.levels()[0].pixels.len(), 3 * 2 * 4);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_rgb_is_expanded_to_rgba() {
        let path = temp_path("rgb.png");
        RgbImage::from_pixel(2, 2, Rgb([1, 2, 3])).save(&path).unwrap();

        let options = TextureOptions {
            srgb: false,
            ..Default::default()
        };
        let image = TextureImage::load(&path, &options).unwrap();
        assert_eq!(image.channels(), 3);
        assert_eq!(image.format(), wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(&image.levels()[0].pixels[..4], &[1, 2, 3, 255]);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_single_channel() {
        let path = temp_path("gray.png");
        GrayImage::from_pixel(4, 4, image::Luma([128])).save(&path).unwrap();

        let image = TextureImage::load(&path, &TextureOptions::default()).unwrap();
        assert_eq!(image.channels(), 1);
        assert_eq!(image.format(), wgpu::TextureFormat::R8Unorm);
        assert_eq!(image.levels()[0].pixels.len(), 16);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_two_channels_rejected() {
        let path = temp_path("gray_alpha.png");
        GrayAlphaImage::from_pixel(2, 2, LumaA([1, 2])).save(&path).unwrap();

        let result = TextureImage::load(&path, &TextureOptions::default());
        assert!(matches!(
            result,
            Err(FlightHeadingError::Asset(AssetError::UnsupportedChannels { channels: 2, .. }))
        ));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_flip_vertically() {
        let mut source = RgbaImage::new(1, 2);
        source.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        source.put_pixel(0, 1, Rgba([0, 0, 255, 255]));

        let flipped = TextureImage::from_image(
            DynamicImage::ImageRgba8(source.clone()),
            Path::new("memory"),
            &TextureOptions::default(),
        )
        .unwrap();
        assert_eq!(&flipped.levels()[0].pixels[..4], &[0, 0, 255, 255]);

        let unflipped = TextureImage::from_image(
            DynamicImage::ImageRgba8(source),
            Path::new("memory"),
            &TextureOptions {
                flip_vertically: false,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(&unflipped.levels()[0].pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_mip_chain() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(3, 2), 2);
        assert_eq!(mip_level_count(256, 64), 9);

        let image = TextureImage::from_image(
            DynamicImage::ImageRgba8(RgbaImage::new(8, 2)),
            Path::new("memory"),
            &TextureOptions::default(),
        )
        .unwrap();
        let sizes: Vec<_> = image.levels().iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn test_missing_and_corrupt_files() {
        let missing = TextureImage::load(Path::new("res/textures/Missing.png"), &TextureOptions::default());
        assert!(matches!(
            missing,
            Err(FlightHeadingError::Asset(AssetError::Read { .. }))
        ));

        let path = temp_path("corrupt.png");
        std::fs::write(&path, b"not an image").unwrap();
        let corrupt = TextureImage::load(&path, &TextureOptions::default());
        assert!(matches!(
            corrupt,
            Err(FlightHeadingError::Asset(AssetError::Decode { .. }))
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_bundled_compass_textures() {
        for name in ["CompassBackground.png", "CompassForeground.png"] {
            let path = Path::new("res/textures").join(name);
            let image = TextureImage::load(&path, &TextureOptions::default()).unwrap();
            assert_eq!((image.width(), image.height()), (256, 256));
            assert_eq!(image.channels(), 4);
            assert_eq!(image.levels().len(), 9);
        }
    }

    #[test]
    fn test_wrap_mode_conversion() {
        assert_eq!(wgpu::AddressMode::from(WrapMode::Repeat), wgpu::AddressMode::Repeat);
        assert_eq!(
            wgpu::AddressMode::from(WrapMode::MirroredRepeat),
            wgpu::AddressMode::MirrorRepeat
        );
    }
}
