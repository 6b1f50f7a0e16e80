use std::sync::{Arc, Mutex, MutexGuard};

use glow::HasContext;

use crate::scene::mesh::VERTEX_STRIDE;
use crate::scene::{BackendError, FrameParams, MeshData, RenderBackend, SurfaceSize};

// ── GPU mesh handles ─────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

// ── State shared with the paint callback ─────────────────────

#[derive(Default)]
struct GlScene {
    program: Option<glow::Program>,
    attached: bool,
    /// Last submitted frame and the meshes it draws
    frame: Option<(FrameParams, Vec<GpuMesh>)>,
}

impl GlScene {
    fn paint(&self, gl: &glow::Context, viewport: [i32; 4]) {
        let (Some(program), true, Some((frame, meshes))) = (self.program, self.attached, &self.frame) else {
            return;
        };
        let [x, y, w, h] = viewport;
        let [r, g, b] = frame.background;
        let light_dir = frame.lighting.direction();

        unsafe {
            gl.viewport(x, y, w, h);
            gl.scissor(x, y, w, h);
            gl.enable(glow::SCISSOR_TEST);

            gl.clear_color(r, g, b, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);

            gl.use_program(Some(program));
            set_uniform_mat4(gl, program, "u_mvp", &frame.view_projection);
            set_uniform_vec3(gl, program, "u_light_dir", &light_dir);
            set_uniform_f32(gl, program, "u_ambient", frame.lighting.ambient);
            set_uniform_f32(gl, program, "u_directional", frame.lighting.directional);

            for mesh in meshes {
                draw_mesh(gl, mesh);
            }

            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }
}

// ── Backend ──────────────────────────────────────────────────

/// OpenGL implementation of the scene render seam.
///
/// Uploads happen on the UI thread while egui's context is current; drawing
/// happens later inside the egui paint callback from the shared frame.
pub struct GlowBackend {
    gl: Option<Arc<glow::Context>>,
    shared: Arc<Mutex<GlScene>>,
    size: SurfaceSize,
}

impl GlowBackend {
    pub fn new(gl: Option<Arc<glow::Context>>) -> Self {
        Self {
            gl,
            shared: Arc::new(Mutex::new(GlScene::default())),
            size: SurfaceSize::default(),
        }
    }

    fn context(&self) -> Result<&glow::Context, BackendError> {
        self.gl.as_deref().ok_or(BackendError::NoContext)
    }

    fn scene(&self) -> MutexGuard<'_, GlScene> {
        self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Paint callback drawing the last submitted frame into `rect`
    pub fn paint_callback(&self, rect: egui::Rect) -> egui::PaintCallback {
        let shared = self.shared.clone();
        egui::PaintCallback {
            rect,
            callback: Arc::new(egui_glow::CallbackFn::new(move |info, painter| {
                let vp = info.viewport_in_pixels();
                let scene = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                scene.paint(painter.gl(), [vp.left_px, vp.from_bottom_px, vp.width_px, vp.height_px]);
            })),
        }
    }
}

impl RenderBackend for GlowBackend {
    type Mesh = GpuMesh;

    fn create_surface(&mut self, size: SurfaceSize) -> Result<(), BackendError> {
        let program = compile_program(self.context()?, MESH_VERT, MESH_FRAG)?;
        let mut scene = self.scene();
        scene.program = Some(program);
        scene.frame = None;
        drop(scene);
        self.size = size;
        tracing::debug!(width = size.width, height = size.height, "GL surface created");
        Ok(())
    }

    fn attach_surface(&mut self) {
        self.scene().attached = true;
    }

    fn detach_surface(&mut self) {
        let mut scene = self.scene();
        scene.attached = false;
        scene.frame = None;
    }

    fn destroy_surface(&mut self) {
        let program = self.scene().program.take();
        if let (Some(program), Some(gl)) = (program, self.gl.as_deref()) {
            unsafe { gl.delete_program(program) };
        }
        self.size = SurfaceSize::default();
        tracing::debug!("GL surface destroyed");
    }

    fn resize_surface(&mut self, size: SurfaceSize) {
        tracing::trace!(from = ?self.size, to = ?size, "GL surface resized");
        self.size = size;
    }

    fn upload_mesh(&mut self, mesh: &MeshData) -> Result<GpuMesh, BackendError> {
        upload_mesh(self.context()?, mesh)
    }

    fn release_mesh(&mut self, mesh: GpuMesh) {
        if let Some(gl) = self.gl.as_deref() {
            unsafe {
                gl.delete_vertex_array(mesh.vao);
                gl.delete_buffer(mesh.vbo);
                gl.delete_buffer(mesh.ibo);
            }
        }
    }

    fn render(&mut self, frame: &FrameParams, meshes: &[GpuMesh]) {
        self.scene().frame = Some((*frame, meshes.to_vec()));
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> Result<GpuMesh, BackendError> {
    unsafe {
        let vao = gl.create_vertex_array().map_err(BackendError::Allocation)?;
        let vbo = match gl.create_buffer() {
            Ok(vbo) => vbo,
            Err(e) => {
                gl.delete_vertex_array(vao);
                return Err(BackendError::Allocation(e));
            }
        };
        let ibo = match gl.create_buffer() {
            Ok(ibo) => ibo,
            Err(e) => {
                gl.delete_vertex_array(vao);
                gl.delete_buffer(vbo);
                return Err(BackendError::Allocation(e));
            }
        };

        gl.bind_vertex_array(Some(vao));
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, cast_slice(&data.vertices), glow::STATIC_DRAW);

        let stride = (VERTEX_STRIDE * 4) as i32;
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);
        // color: location 2
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 3, glow::FLOAT, false, stride, 6 * 4);

        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, cast_slice(&data.indices), glow::STATIC_DRAW);

        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
        })
    }
}

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, BackendError> {
    unsafe {
        let program = gl.create_program().map_err(BackendError::Shader)?;
        let mut shaders = Vec::with_capacity(2);

        for (kind, src) in [(glow::VERTEX_SHADER, vert_src), (glow::FRAGMENT_SHADER, frag_src)] {
            let shader = gl.create_shader(kind).map_err(BackendError::Shader)?;
            gl.shader_source(shader, src);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                for s in shaders {
                    gl.delete_shader(s);
                }
                gl.delete_program(program);
                return Err(BackendError::Shader(log));
            }
            gl.attach_shader(program, shader);
            shaders.push(shader);
        }

        gl.link_program(program);
        let linked = gl.get_program_link_status(program);
        for shader in shaders {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }
        if !linked {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(BackendError::Shader(log));
        }
        Ok(program)
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: &glam::Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

fn set_uniform_f32(gl: &glow::Context, program: glow::Program, name: &str, v: f32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_f32(loc.as_ref(), v);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice)) }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;

out vec3 v_normal;
out vec3 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_normal = a_normal;
    v_color = a_color;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
uniform vec3 u_light_dir;
uniform float u_ambient;
uniform float u_directional;

in vec3 v_normal;
in vec3 v_color;

out vec4 frag_color;

void main() {
    vec3 n = normalize(v_normal);
    float diffuse = max(dot(n, u_light_dir), 0.0);
    float light = min(u_ambient + diffuse * u_directional, 1.0);
    frag_color = vec4(v_color * light, 1.0);
}
"#;
