// Floating islands demo: click an island and the camera flies there.
// Left-drag orbits, the wheel zooms, keys 1-4 jump to islands, F3 shows frame stats.
//
// Usage: isle-hop [scene.toml]

use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use bevy_ecs::prelude::*;
use glam::{Mat4, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wgpu::util::DeviceExt;
use winit::{
    event::{ElementState, Event as WinitEvent, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use isle_hop::engine::config::SceneConfig;
use isle_hop::engine::hud::{FrameStats, Hud, IslandLabel, NavigationStatus};
use isle_hop::engine::input::InputState;
use isle_hop::engine::mesh::{GpuVertex, RenderMesh};
use isle_hop::engine::picking::IslandPicker;
use isle_hop::engine::systems::{SceneClock, float_system, island_offsets};
use isle_hop::engine::{CameraRig, Float, Island, OrbitCamera, Transform, WaypointNavigator};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const ISLAND_KEYS: [KeyCode; 4] = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4];

// ============================================================================
// INSTANCE DATA (per-island)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceData {
    offset: [f32; 3],
    _padding: f32,  // Align to 16 bytes
}

impl InstanceData {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

// ============================================================================
// UNIFORM DATA
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
}

impl Uniforms {
    fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_dir: Vec3::new(0.4, 1.0, 0.3).normalize().extend(0.0).to_array(),
        }
    }
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Index range of one island inside the shared index buffer.
struct IslandDraw {
    indices: Range<u32>,
    waypoint: usize,
}

struct State {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    depth_view: wgpu::TextureView,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    islands: Vec<IslandDraw>,
    triangle_count: usize,

    // Scene
    scene: SceneConfig,
    world: World,
    schedule: Schedule,
    started: Instant,

    // Camera & navigation
    camera: OrbitCamera,
    navigator: WaypointNavigator,
    picker: IslandPicker,
    input: InputState,

    hud: Hud,
    fps: u32,
    frame_time_avg_ms: f32,
}

impl State {
    async fn new(window: Arc<Window>, scene: SceneConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or("no suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Island Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader_islands.wgsl").into()),
        });

        let camera = OrbitCamera::new(scene.overview_eye, scene.overview_target);
        let aspect = config.width as f32 / config.height as f32;
        let uniforms = Uniforms::new(camera.view_projection(aspect));

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("uniform_bind_group_layout"),
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Island Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GpuVertex::desc(), InstanceData::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        // Build every island into one shared vertex/index buffer
        let (mesh, islands) = build_scene_mesh(&scene);
        let triangle_count = mesh.index_count() / 3;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Island Vertex Buffer"),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Island Index Buffer"),
            contents: mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Island Instance Buffer"),
            size: (islands.len().max(1) * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut world = World::new();
        world.insert_resource(SceneClock::default());
        spawn_islands(&mut world, &scene);
        let mut schedule = Schedule::default();
        schedule.add_systems(float_system);

        let hud = Hud::new(&window, &device, surface_format);
        let navigator = WaypointNavigator::new(scene.waypoint_table());
        let picker = scene.picker();

        log::info!(
            "scene ready: {} islands, {} triangles",
            islands.len(),
            triangle_count
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            depth_view,
            uniform_buffer,
            uniform_bind_group,
            islands,
            triangle_count,
            scene,
            world,
            schedule,
            started: Instant::now(),
            camera,
            navigator,
            picker,
            input: InputState::new(),
            hud,
            fps: 0,
            frame_time_avg_ms: 0.0,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }
    }

    fn update(&mut self) {
        let now = self.started.elapsed();

        self.world.resource_mut::<SceneClock>().elapsed_secs = now.as_secs_f32();
        self.schedule.run(&mut self.world);

        if self.input.was_key_pressed(KeyCode::F3) {
            self.hud.toggle_stats();
        }

        // Click → pick island → travel
        if let Some(cursor) = self.input.take_click() {
            let ray = self.camera.screen_ray(cursor, (self.size.width, self.size.height));
            if let Some(anchor) = self.picker.pick(&ray) {
                if !self.navigator.is_at_waypoint(anchor) {
                    self.navigator.move_to(anchor, self.scene.travel_duration(), now, &self.camera);
                }
            }
        }

        for (key, island) in ISLAND_KEYS.iter().zip(&self.scene.islands) {
            if self.input.was_key_pressed(*key) && !self.navigator.is_at_waypoint(island.anchor) {
                self.navigator.move_to(island.anchor, self.scene.travel_duration(), now, &self.camera);
            }
        }

        self.camera.update(&self.input, self.navigator.is_animating());
        self.navigator.update(now, &mut self.camera);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Bob offsets, one instance per island in draw order
        let mut instances = vec![InstanceData { offset: [0.0; 3], _padding: 0.0 }; self.islands.len()];
        for (waypoint, offset) in island_offsets(&mut self.world) {
            if let Some(slot) = self.islands.iter().position(|d| d.waypoint == waypoint) {
                instances[slot].offset = offset.to_array();
            }
        }
        if !instances.is_empty() {
            self.queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let aspect = self.size.width as f32 / self.size.height.max(1) as f32;
        let view_proj = self.camera.view_projection(aspect);
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[Uniforms::new(view_proj)]));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Island Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.53,
                            g: 0.75,
                            b: 0.92,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            for (i, island) in self.islands.iter().enumerate() {
                let instance = i as u32;
                render_pass.draw_indexed(island.indices.clone(), 0, instance..instance + 1);
            }
        }

        // HUD
        let status = NavigationStatus {
            current: self.navigator.current_waypoint().map(|w| w.name.clone()),
            travelling_to: self.navigator.destination().map(|w| {
                let p = self.navigator.progress(self.started.elapsed()).unwrap_or(0.0);
                (w.name.clone(), p)
            }),
        };
        let labels = self.island_labels(view_proj);
        let eye = self.camera.eye();
        let stats = FrameStats {
            fps: self.fps,
            frame_time_avg_ms: self.frame_time_avg_ms,
            triangle_count: self.triangle_count,
            resolution: (self.size.width, self.size.height),
            camera_eye: (eye.x, eye.y, eye.z),
            camera_distance: self.camera.distance(),
        };
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };
        self.hud.render(
            &self.device,
            &self.queue,
            &mut encoder,
            &self.window,
            &view,
            &screen_descriptor,
            &status,
            &labels,
            Some(&stats),
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Island names projected above each island, in egui points.
    fn island_labels(&self, view_proj: Mat4) -> Vec<IslandLabel> {
        let scale = self.window.scale_factor() as f32;
        let (w, h) = (self.size.width as f32 / scale, self.size.height as f32 / scale);
        let lift = Vec3::Y * (self.scene.island.surface_height + 2.5);
        let current = self.navigator.current_waypoint().map(|w| w.anchor);

        self.scene
            .islands
            .iter()
            .filter_map(|island| {
                let clip = view_proj * (island.anchor + lift).extend(1.0);
                if clip.w <= 0.0 {
                    return None;
                }
                let ndc = clip / clip.w;
                Some(IslandLabel {
                    pos: egui::pos2((ndc.x + 1.0) * 0.5 * w, (1.0 - ndc.y) * 0.5 * h),
                    name: island.name.clone(),
                    highlighted: current == Some(island.anchor),
                })
            })
            .collect()
    }
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

// ============================================================================
// SCENE CONSTRUCTION
// ============================================================================

/// Build every island at its rest anchor and merge them into one mesh.
fn build_scene_mesh(scene: &SceneConfig) -> (RenderMesh, Vec<IslandDraw>) {
    let builder = scene.island_builder();
    let mut rng = StdRng::seed_from_u64(scene.seed);
    let mut mesh = RenderMesh::new();
    let mut draws = Vec::with_capacity(scene.islands.len());

    for (waypoint, island) in scene.islands.iter().enumerate() {
        let start = mesh.index_count() as u32;
        mesh.append(&builder.build(island.anchor, island.color, &mut rng));
        draws.push(IslandDraw {
            indices: start..mesh.index_count() as u32,
            waypoint,
        });
    }
    (mesh, draws)
}

fn spawn_islands(world: &mut World, scene: &SceneConfig) {
    let count = scene.islands.len().max(1) as f32;
    for (waypoint, island) in scene.islands.iter().enumerate() {
        world.spawn((
            Transform::from_position(island.anchor),
            Island {
                name: island.name.clone(),
                waypoint,
                anchor: island.anchor,
            },
            Float {
                base_y: island.anchor.y,
                amplitude: scene.float_amplitude,
                speed: 0.8,
                phase: std::f32::consts::TAU * waypoint as f32 / count,
            },
        ));
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let scene = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    scene.validate()?;

    let event_loop = EventLoop::new()?;

    let window_attributes = Window::default_attributes()
        .with_title("Isle Hop")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut state = pollster::block_on(State::new(window.clone(), scene))?;
    let mut frame_count = 0;
    let mut frame_time_total = 0.0_f32;
    let mut last_frame = Instant::now();
    let mut last_fps_update = Instant::now();

    event_loop.run(move |event, control_flow| {
        match event {
            WinitEvent::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => {
                let response = state.hud.handle_window_event(&window, event);
                state.input.process_event_behind_ui(event, response.consumed);

                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: PhysicalKey::Code(KeyCode::Escape),
                                ..
                            },
                        ..
                    } => control_flow.exit(),
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        frame_time_total += (now - last_frame).as_secs_f32() * 1000.0;
                        last_frame = now;

                        state.update();
                        match state.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost) => state.resize(state.size),
                            Err(wgpu::SurfaceError::OutOfMemory) => control_flow.exit(),
                            Err(e) => log::warn!("render error: {e:?}"),
                        }
                        state.input.end_frame();

                        frame_count += 1;
                        if (now - last_fps_update).as_secs_f32() >= 1.0 {
                            state.fps = frame_count;
                            state.frame_time_avg_ms = frame_time_total / frame_count.max(1) as f32;
                            log::debug!("FPS: {} | Triangles: {}", frame_count, state.triangle_count);
                            frame_count = 0;
                            frame_time_total = 0.0;
                            last_fps_update = now;
                        }
                    }
                    _ => {}
                }
            }
            WinitEvent::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_mesh_has_one_draw_range_per_island() {
        let scene = SceneConfig::default();
        let (mesh, draws) = build_scene_mesh(&scene);
        assert_eq!(draws.len(), scene.islands.len());
        assert_eq!(draws[0].indices.start, 0);
        assert_eq!(draws.last().map(|d| d.indices.end), Some(mesh.index_count() as u32));
        for pair in draws.windows(2) {
            assert_eq!(pair[0].indices.end, pair[1].indices.start);
        }
        assert!(!mesh.normals_stale());
    }

    #[test]
    fn spawned_islands_keep_waypoint_order() {
        let scene = SceneConfig::default();
        let mut world = World::new();
        spawn_islands(&mut world, &scene);
        let mut query = world.query::<&Island>();
        let mut names: Vec<(usize, String)> = query.iter(&world).map(|i| (i.waypoint, i.name.clone())).collect();
        names.sort();
        let expected: Vec<String> = scene.islands.iter().map(|i| i.name.clone()).collect();
        assert_eq!(names.into_iter().map(|(_, n)| n).collect::<Vec<_>>(), expected);
    }
}
