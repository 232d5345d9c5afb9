//! Display textures: histogram and transfer function.

use volray_core::{Histogram, TransferFunction};

/// Texel width of the transfer function lookup texture.
pub const TRANSFER_TEXTURE_WIDTH: u32 = 256;

/// A single-channel 1-row texture holding normalized histogram bin heights,
/// intended for display by an external UI panel.
pub struct HistogramTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
}

impl HistogramTexture {
    /// Creates a histogram texture with one texel per bin.
    #[must_use]
    pub fn new(device: &wgpu::Device, bin_count: usize) -> Self {
        let width = bin_count.max(1) as u32;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("histogram texture"),
            size: wgpu::Extent3d {
                width,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
        }
    }

    /// Uploads peak-normalized bin heights from a histogram.
    ///
    /// The histogram must have the bin count the texture was created with.
    pub fn update(&self, queue: &wgpu::Queue, histogram: &Histogram) {
        let mut heights = histogram.normalized();
        heights.resize(self.width as usize, 0.0);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&heights),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: self.width,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Returns the texture.
    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Returns the texture view.
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Returns the texel width (bin count).
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }
}

/// An RGBA8 1-row lookup texture mirroring the current transfer function.
pub struct TransferFunctionTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl TransferFunctionTexture {
    /// Creates the lookup texture with a linear sampler.
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("transfer function texture"),
            size: wgpu::Extent3d {
                width: TRANSFER_TEXTURE_WIDTH,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("transfer function sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads a transfer function; `None` uploads the passthrough mapping.
    pub fn update(&self, queue: &wgpu::Queue, transfer: Option<&TransferFunction>) {
        let passthrough;
        let transfer = match transfer {
            Some(tf) => tf,
            None => {
                passthrough = TransferFunction::passthrough();
                &passthrough
            }
        };
        let texels = transfer.to_rgba8(TRANSFER_TEXTURE_WIDTH as usize);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &texels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * TRANSFER_TEXTURE_WIDTH),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: TRANSFER_TEXTURE_WIDTH,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Returns the texture.
    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Returns the texture view.
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Returns the sampler.
    #[must_use]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}
