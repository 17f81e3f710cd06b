#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use std::borrow::Cow;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use gpu::RenderFrame;
    use scene::mesh::Icosphere;

    /// Subdivision level of the stage icosphere. High enough that the
    /// wireframe reads as a dense lattice; the line list at this level is
    /// ~120k segments, well inside what a single draw handles.
    const MESH_SUBDIVISIONS: u32 = 6;

    #[derive(Debug)]
    pub struct GpuContext {
        pub _instance: &'static ::wgpu::Instance,
        pub surface: ::wgpu::Surface<'static>,
        pub device: ::wgpu::Device,
        pub queue: ::wgpu::Queue,
        pub config: ::wgpu::SurfaceConfiguration,
        pub _canvas: web_sys::HtmlCanvasElement,
        pub clear_color: ::wgpu::Color,
        pub pipeline: ::wgpu::RenderPipeline,
        pub globals_buffer: ::wgpu::Buffer,
        pub globals_bind_group: ::wgpu::BindGroup,
        pub vertex_buffer: ::wgpu::Buffer,
        pub index_buffer: ::wgpu::Buffer,
        pub index_count: u32,
    }

    const WIRE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    frequency: f32,
    amplitude: f32,
    density: f32,
    strength: f32,
    color_mix: f32,
    opacity: f32,
    viewport: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

fn hash_u32(x_in: u32) -> u32 {
    // 32-bit integer mix (non-linear) to avoid visible correlation patterns.
    var x = x_in;
    x ^= x >> 16u;
    x *= 0x7feb352du;
    x ^= x >> 15u;
    x *= 0x846ca68bu;
    x ^= x >> 16u;
    return x;
}

fn hash01(x: u32) -> f32 {
    return f32(hash_u32(x)) / 4294967295.0;
}

fn lattice(p: vec3<i32>) -> f32 {
    let ux = bitcast<u32>(p.x) * 0x9e3779b9u;
    let uy = bitcast<u32>(p.y) * 0x85ebca6bu;
    let uz = bitcast<u32>(p.z) * 0xc2b2ae35u;
    return hash01(ux ^ uy ^ uz) * 2.0 - 1.0;
}

// Trilinear value noise in [-1, 1] with smoothstep weights.
fn value_noise(p: vec3<f32>) -> f32 {
    let i = vec3<i32>(floor(p));
    let f = fract(p);
    let w = f * f * (3.0 - 2.0 * f);

    let c000 = lattice(i + vec3<i32>(0, 0, 0));
    let c100 = lattice(i + vec3<i32>(1, 0, 0));
    let c010 = lattice(i + vec3<i32>(0, 1, 0));
    let c110 = lattice(i + vec3<i32>(1, 1, 0));
    let c001 = lattice(i + vec3<i32>(0, 0, 1));
    let c101 = lattice(i + vec3<i32>(1, 0, 1));
    let c011 = lattice(i + vec3<i32>(0, 1, 1));
    let c111 = lattice(i + vec3<i32>(1, 1, 1));

    let x00 = mix(c000, c100, w.x);
    let x10 = mix(c010, c110, w.x);
    let x01 = mix(c001, c101, w.x);
    let x11 = mix(c011, c111, w.x);
    let y0 = mix(x00, x10, w.y);
    let y1 = mix(x01, x11, w.y);
    return mix(y0, y1, w.z);
}

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) displacement: f32,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VsOut {
    // Unit sphere: the vertex position doubles as the surface normal.
    let n = position;
    let probe = position * globals.frequency + n * globals.density;
    let d = value_noise(probe) * globals.amplitude * 0.25 * globals.strength;
    let displaced = position + n * d;

    let world = globals.model * vec4<f32>(displaced, 1.0);
    return VsOut(globals.view_proj * world, d);
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let cool = vec3<f32>(0.84, 0.80, 1.0);
    let deep = vec3<f32>(0.36, 0.05, 0.65);

    // Displaced regions pull toward the cool tone; calm regions keep the
    // deep tone weighted by the color-mix uniform.
    let agitation = clamp(abs(in.displacement) * 2.0, 0.0, 1.0);
    let color = mix(cool, deep, globals.color_mix * (1.0 - agitation));

    // Additive target: premultiply by opacity so alpha carries the weight.
    return vec4<f32>(color * globals.opacity, globals.opacity);
}
"#;

    /// CPU mirror of the WGSL `Globals` struct. Field order and padding
    /// must match the shader layout exactly.
    #[repr(C)]
    #[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct Globals {
        view_proj: [[f32; 4]; 4],
        model: [[f32; 4]; 4],
        frequency: f32,
        amplitude: f32,
        density: f32,
        strength: f32,
        color_mix: f32,
        opacity: f32,
        viewport: [f32; 2],
    }

    #[repr(C)]
    #[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct Vertex {
        position: [f32; 3],
    }

    pub async fn init_gpu_from_canvas_id(canvas_id: &str) -> Result<GpuContext, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("document missing"))?;
        let canvas_elem = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str("canvas missing"))?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;

        let width = canvas_elem.width();
        let height = canvas_elem.height();

        // IMPORTANT: `wgpu::Surface` must not outlive its `wgpu::Instance`.
        // To avoid UB, we leak the instance for the lifetime of the app.
        //
        // Prefer WebGPU when available, but allow WebGL as a fallback.
        let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
            &::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            },
        )));

        let surface = instance
            .create_surface(::wgpu::SurfaceTarget::Canvas(canvas_elem.clone()))
            .map_err(|e| JsValue::from_str(&format!("surface error: {e}")))?;

        let adapter = instance
            .request_adapter(&::wgpu::RequestAdapterOptions {
                power_preference: ::wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("adapter error: {e}")))?;

        let (device, queue) = adapter
            .request_device(&::wgpu::DeviceDescriptor {
                label: Some("stage-device"),
                required_features: ::wgpu::Features::empty(),
                required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("device error: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .cloned()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = ::wgpu::SurfaceConfiguration {
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            desired_maximum_frame_latency: 2,
            present_mode: ::wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some("stage-wire-shader"),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(WIRE_SHADER)),
        });

        let mesh = Icosphere::generate(MESH_SUBDIVISIONS);
        let vertices: Vec<Vertex> = mesh
            .vertices
            .iter()
            .map(|&position| Vertex { position })
            .collect();
        let indices = mesh.line_indices();

        let vertex_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("stage-wire-vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: ::wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("stage-wire-indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: ::wgpu::BufferUsages::INDEX,
        });

        let globals_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("stage-globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group_layout =
            device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("stage-globals-bgl"),
                entries: &[::wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: ::wgpu::BindingType::Buffer {
                        ty: ::wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let globals_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("stage-globals-bg"),
            layout: &globals_bind_group_layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("stage-wire-pipeline-layout"),
            bind_group_layouts: &[&globals_bind_group_layout],
            immediate_size: 0,
        });

        // Additive-blended line list; no depth buffer. Additive output is
        // order-independent, so the wire renders correctly without one.
        let pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some("stage-wire-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: ::wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[::wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as ::wgpu::BufferAddress,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: &[::wgpu::VertexAttribute {
                        format: ::wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    }],
                }],
            },
            fragment: Some(::wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(::wgpu::BlendState {
                        color: ::wgpu::BlendComponent {
                            src_factor: ::wgpu::BlendFactor::One,
                            dst_factor: ::wgpu::BlendFactor::One,
                            operation: ::wgpu::BlendOperation::Add,
                        },
                        alpha: ::wgpu::BlendComponent {
                            src_factor: ::wgpu::BlendFactor::One,
                            dst_factor: ::wgpu::BlendFactor::One,
                            operation: ::wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology: ::wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: ::wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: ::wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(GpuContext {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            _canvas: canvas_elem,
            clear_color: ::wgpu::Color {
                r: 0.008,
                g: 0.004,
                b: 0.016,
                a: 1.0,
            },
            pipeline,
            globals_buffer,
            globals_bind_group,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        })
    }

    pub fn resize_gpu(ctx: &mut GpuContext, width: u32, height: u32) {
        ctx.config.width = width.max(1);
        ctx.config.height = height.max(1);
        ctx.surface.configure(&ctx.device, &ctx.config);
    }

    pub fn render_stage(ctx: &GpuContext, frame: &RenderFrame) -> Result<(), JsValue> {
        let surface_frame = ctx
            .surface
            .get_current_texture()
            .map_err(|e| JsValue::from_str(&format!("surface acquire failed: {e}")))?;
        let view = surface_frame
            .texture
            .create_view(&::wgpu::TextureViewDescriptor::default());

        let globals = Globals {
            view_proj: frame.view_proj,
            model: frame.model,
            frequency: frame.uniforms[0],
            amplitude: frame.uniforms[1],
            density: frame.uniforms[2],
            strength: frame.uniforms[3],
            color_mix: frame.uniforms[4],
            opacity: frame.uniforms[5],
            viewport: frame.viewport,
        };
        ctx.queue
            .write_buffer(&ctx.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let mut encoder = ctx
            .device
            .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                label: Some("stage-encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                label: Some("stage-wire-pass"),
                color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: ::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(ctx.clear_color),
                        store: ::wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&ctx.pipeline);
            rpass.set_bind_group(0, &ctx.globals_bind_group, &[]);
            rpass.set_vertex_buffer(0, ctx.vertex_buffer.slice(..));
            rpass.set_index_buffer(ctx.index_buffer.slice(..), ::wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..ctx.index_count, 0, 0..1);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        surface_frame.present();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use wasm_bindgen::prelude::JsValue;

    use gpu::RenderFrame;

    #[derive(Debug, Default)]
    pub struct GpuContext;

    pub async fn init_gpu_from_canvas_id(_canvas_id: &str) -> Result<GpuContext, JsValue> {
        Err(JsValue::from_str(
            "gpu initialization is only available on wasm32 targets",
        ))
    }

    pub fn resize_gpu(_ctx: &mut GpuContext, _width: u32, _height: u32) {}

    pub fn render_stage(_ctx: &GpuContext, _frame: &RenderFrame) -> Result<(), JsValue> {
        Err(JsValue::from_str(
            "gpu rendering is only available on wasm32 targets",
        ))
    }
}

pub use imp::{GpuContext, init_gpu_from_canvas_id, render_stage, resize_gpu};
