use crate::RenderError;
use crate::mesh::{self, CubeVertex, OverlayVertex, TrackVertex};
use crate::shaders::{ShaderPass, ShaderSources};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use ringtrain_assets::TextureImage;
use ringtrain_kernel::{FrameTransforms, Track};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.5,
    b: 0.0,
    a: 1.0,
};

const CUBE_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4,
    6 => Float32x4,
    7 => Float32x4,
];
const TRACK_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];
const OVERLAY_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    tint: [f32; 4],
}

/// Run `create` inside a validation error scope. A captured error is logged
/// and the created object discarded.
fn captured<T>(device: &wgpu::Device, what: &str, create: impl FnOnce() -> T) -> Option<T> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(device.pop_error_scope()) {
        None => Some(value),
        Some(err) => {
            tracing::error!("{what} failed, pass disabled: {err}");
            None
        }
    }
}

struct PipelineSpec<'a> {
    label: &'static str,
    pass: ShaderPass,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    cull_mode: Option<wgpu::Face>,
    blend: wgpu::BlendState,
    depth_test: bool,
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    spec: PipelineSpec<'_>,
) -> Option<wgpu::RenderPipeline> {
    // Every pass shares the depth attachment; the overlay just ignores it.
    let depth_stencil = if spec.depth_test {
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }
    } else {
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: Default::default(),
            bias: Default::default(),
        }
    };

    captured(device, spec.label, || {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(spec.label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some(spec.pass.vertex_entry()),
                compilation_options: Default::default(),
                buffers: spec.buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(spec.pass.fragment_entry()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(spec.blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: spec.cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    })
}

fn compile_shader(
    device: &wgpu::Device,
    sources: &ShaderSources,
    pass: ShaderPass,
) -> Option<wgpu::ShaderModule> {
    let label = format!("{}_shader", pass.file_stem());
    captured(device, &label, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label.as_str()),
            source: wgpu::ShaderSource::Wgsl(sources.get(pass).into()),
        })
    })
}

/// wgpu scene renderer: track disc, textured car cubes, corner overlay.
///
/// Cube culling is chosen per draw from two prebuilt pipelines, so the track
/// and overlay are never culled. A pass whose shader failed to build stays
/// `None` and is skipped every frame.
pub struct WgpuRenderer {
    track_pipeline: Option<wgpu::RenderPipeline>,
    cube_pipeline: Option<wgpu::RenderPipeline>,
    cube_culled_pipeline: Option<wgpu::RenderPipeline>,
    overlay_pipeline: Option<wgpu::RenderPipeline>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    track_vertex_buffer: wgpu::Buffer,
    track_vertex_count: u32,
    overlay_vertex_buffer: wgpu::Buffer,
    overlay_vertex_count: u32,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        shaders: &ShaderSources,
        texture: &TextureImage,
        track: &Track,
        max_cars: usize,
    ) -> Result<Self, RenderError> {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let texture_view = upload_texture(device, queue, texture)?;
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture_bind_group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let track_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("track_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("textured_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        // Track pipeline
        let track_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TrackVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &TRACK_ATTRIBUTES,
        }];
        let track_pipeline = compile_shader(device, shaders, ShaderPass::Track).and_then(|module| {
            build_pipeline(
                device,
                &track_layout,
                &module,
                surface_format,
                PipelineSpec {
                    label: "track_pipeline",
                    pass: ShaderPass::Track,
                    buffers: &track_buffers,
                    cull_mode: None,
                    blend: wgpu::BlendState::REPLACE,
                    depth_test: true,
                },
            )
        });

        // Cube pipelines, one per culling state
        let cube_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<CubeVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &CUBE_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<InstanceData>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &INSTANCE_ATTRIBUTES,
            },
        ];
        let cube_module = compile_shader(device, shaders, ShaderPass::Cube);
        let cube_spec = |label, cull_mode| PipelineSpec {
            label,
            pass: ShaderPass::Cube,
            buffers: &cube_buffers,
            cull_mode,
            blend: wgpu::BlendState::REPLACE,
            depth_test: true,
        };
        let cube_pipeline = cube_module.as_ref().and_then(|module| {
            build_pipeline(
                device,
                &textured_layout,
                module,
                surface_format,
                cube_spec("cube_pipeline", None),
            )
        });
        let cube_culled_pipeline = cube_module.as_ref().and_then(|module| {
            build_pipeline(
                device,
                &textured_layout,
                module,
                surface_format,
                cube_spec("cube_culled_pipeline", Some(wgpu::Face::Back)),
            )
        });

        // Overlay pipeline
        let overlay_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OverlayVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &OVERLAY_ATTRIBUTES,
        }];
        let overlay_pipeline =
            compile_shader(device, shaders, ShaderPass::Overlay).and_then(|module| {
                build_pipeline(
                    device,
                    &textured_layout,
                    &module,
                    surface_format,
                    PipelineSpec {
                        label: "overlay_pipeline",
                        pass: ShaderPass::Overlay,
                        buffers: &overlay_buffers,
                        cull_mode: None,
                        blend: wgpu::BlendState::ALPHA_BLENDING,
                        depth_test: false,
                    },
                )
            });

        // Meshes
        let (cube_verts, cube_indices) = mesh::cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let track_verts = mesh::track_mesh(track);
        let track_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("track_vertex_buffer"),
            contents: bytemuck::cast_slice(&track_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let overlay_verts = mesh::overlay_quad();
        let overlay_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("overlay_vertex_buffer"),
            contents: bytemuck::cast_slice(&overlay_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let max_instances = max_cars.max(1) as u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let renderer = Self {
            track_pipeline,
            cube_pipeline,
            cube_culled_pipeline,
            overlay_pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count: cube_indices.len() as u32,
            track_vertex_buffer,
            track_vertex_count: track_verts.len() as u32,
            overlay_vertex_buffer,
            overlay_vertex_count: overlay_verts.len() as u32,
            instance_buffer,
            max_instances,
            depth_texture: Self::create_depth_texture(device, width, height),
            surface_format,
        };
        for pass in ShaderPass::ALL {
            tracing::debug!(?pass, enabled = renderer.pass_enabled(pass), "render pass");
        }
        Ok(renderer)
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Whether the pass built successfully. The cube pass counts as enabled
    /// only if both of its culling variants did.
    pub fn pass_enabled(&self, pass: ShaderPass) -> bool {
        match pass {
            ShaderPass::Track => self.track_pipeline.is_some(),
            ShaderPass::Cube => {
                self.cube_pipeline.is_some() && self.cube_culled_pipeline.is_some()
            }
            ShaderPass::Overlay => self.overlay_pipeline.is_some(),
        }
    }

    /// Render one frame: track, cars, then the overlay on top.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: &FrameTransforms,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: frame.view_projection().to_cols_array_2d(),
            }),
        );

        let scale = Mat4::from_scale(Vec3::splat(frame.car_size));
        let count = frame.models.len();
        let instances: Vec<InstanceData> = frame
            .models
            .iter()
            .take(self.max_instances as usize)
            .enumerate()
            .map(|(i, model)| {
                let cols = (*model * scale).to_cols_array_2d();
                InstanceData {
                    model_0: cols[0],
                    model_1: cols[1],
                    model_2: cols[2],
                    model_3: cols[3],
                    tint: mesh::car_tint(i, count),
                }
            })
            .collect();

        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if let Some(pipeline) = &self.track_pipeline {
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.track_vertex_buffer.slice(..));
                pass.draw(0..self.track_vertex_count, 0..1);
            }

            let cube_pipeline = if frame.culling_enabled {
                &self.cube_culled_pipeline
            } else {
                &self.cube_pipeline
            };
            if let Some(pipeline) = cube_pipeline {
                if !instances.is_empty() {
                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                    pass.set_bind_group(1, &self.texture_bind_group, &[]);
                    pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
                    pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                    pass.set_index_buffer(
                        self.cube_index_buffer.slice(..),
                        wgpu::IndexFormat::Uint16,
                    );
                    pass.draw_indexed(0..self.cube_index_count, 0, 0..instances.len() as u32);
                }
            }

            if let Some(pipeline) = &self.overlay_pipeline {
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_bind_group(1, &self.texture_bind_group, &[]);
                pass.set_vertex_buffer(0, self.overlay_vertex_buffer.slice(..));
                pass.draw(0..self.overlay_vertex_count, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// Upload decoded RGBA8 pixels as an sRGB texture without mipmaps.
fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &TextureImage,
) -> Result<wgpu::TextureView, RenderError> {
    check_texture(image, device.limits().max_texture_dimension_2d)?;

    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(image.label.as_str()),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.bytes_per_row()),
            rows_per_image: Some(image.height),
        },
        size,
    );
    Ok(texture.create_view(&Default::default()))
}

fn check_texture(image: &TextureImage, max_dimension: u32) -> Result<(), RenderError> {
    if image.width > max_dimension || image.height > max_dimension {
        return Err(RenderError::TextureTooLarge {
            label: image.label.clone(),
            width: image.width,
            height: image.height,
            max: max_dimension,
        });
    }
    let expected = image.width as usize * image.height as usize * 4;
    if image.rgba.len() != expected {
        return Err(RenderError::TextureData {
            label: image.label.clone(),
            expected,
            actual: image.rgba.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32, len: usize) -> TextureImage {
        TextureImage {
            label: "test".into(),
            width,
            height,
            rgba: vec![0; len],
        }
    }

    #[test]
    fn texture_within_limits_passes() {
        assert!(check_texture(&image(4, 2, 32), 8192).is_ok());
    }

    #[test]
    fn oversized_texture_rejected() {
        let err = check_texture(&image(9000, 1, 36000), 8192).unwrap_err();
        assert!(matches!(err, RenderError::TextureTooLarge { max: 8192, .. }));
    }

    #[test]
    fn short_pixel_data_rejected() {
        let err = check_texture(&image(4, 4, 10), 8192).unwrap_err();
        assert!(matches!(
            err,
            RenderError::TextureData {
                expected: 64,
                actual: 10,
                ..
            }
        ));
    }

    #[test]
    fn gpu_structs_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 64);
        assert_eq!(std::mem::size_of::<InstanceData>(), 80);
        assert_eq!(std::mem::size_of::<CubeVertex>(), 32);
    }
}
