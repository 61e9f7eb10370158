/// Per-frame orchestration: camera, transforms, uniforms and draw calls
use std::sync::Arc;

use crate::backend::{PipelineState, RenderBackend, ShaderSource, Topology};
use crate::error::{RenderError, ShaderError};
use crate::geometry::Mesh;
use crate::model::{Model, BLACK};
use crate::scene::Scene;
use crate::shaders::{ShaderSourceProvider, FRAGMENT_SHADER, VERTEX_SHADER};

/// GPU-side copies of one mesh
struct MeshBuffers<B> {
    mesh: Arc<Mesh>,
    positions: B,
    normals: B,
    lines: B,
    line_count: usize,
    triangles: B,
    triangle_count: usize,
}

/// What a frame submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub models: usize,
    pub triangle_draws: usize,
    pub line_draws: usize,
}

/// Drives a [`RenderBackend`] for a [`Scene`]
pub struct Renderer<B: RenderBackend> {
    backend: B,
    program: Option<B::Program>,
    buffers: Vec<MeshBuffers<B::Buffer>>,
}

impl<B: RenderBackend> Renderer<B> {
    /// Compile the scene program, upload every mesh in `scene` and apply
    /// the default pipeline state.
    ///
    /// A shader that fails to compile is logged and rendering carries on
    /// without a program.
    pub fn new(
        backend: B,
        shaders: &dyn ShaderSourceProvider,
        scene: &Scene,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let mut renderer = Self {
            backend,
            program: None,
            buffers: Vec::new(),
        };

        renderer.program = match renderer.compile(shaders) {
            Ok(program) => Some(program),
            Err(err) => {
                log::error!("{err}");
                None
            }
        };
        renderer.backend.use_program(renderer.program.as_ref());

        for model in &scene.models {
            renderer.buffer_index(&model.mesh)?;
        }

        renderer.backend.apply_pipeline(&PipelineState::default());
        renderer.backend.set_viewport(width, height);

        log::info!(
            "renderer ready: {} models, {} meshes, program {}",
            scene.models.len(),
            renderer.buffers.len(),
            if renderer.program.is_some() { "linked" } else { "missing" }
        );
        Ok(renderer)
    }

    fn compile(&mut self, shaders: &dyn ShaderSourceProvider) -> Result<B::Program, ShaderError> {
        let load = |name: &str| {
            shaders
                .source(name)
                .map(|text| ShaderSource::new(name, text))
                .ok_or_else(|| ShaderError::new(name, "no shader source with that name"))
        };
        let vertex = load(VERTEX_SHADER)?;
        let fragment = load(FRAGMENT_SHADER)?;
        self.backend.compile_program(&vertex, &fragment)
    }

    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Track a new viewport size in the backend and the camera aspect
    pub fn resize(&mut self, scene: &mut Scene, width: u32, height: u32) {
        self.backend.set_viewport(width, height);
        scene.camera.set_viewport(width, height);
    }

    /// Index of the uploaded copy of `mesh`, uploading it on first use
    fn buffer_index(&mut self, mesh: &Arc<Mesh>) -> Result<usize, RenderError> {
        if let Some(index) = self.buffers.iter().position(|b| Arc::ptr_eq(&b.mesh, mesh)) {
            return Ok(index);
        }

        let line_indices = mesh.line_indices();
        let triangle_indices = mesh.triangle_indices();
        let buffers = MeshBuffers {
            mesh: Arc::clone(mesh),
            positions: self.backend.create_vertex_buffer(&mesh.position_data())?,
            normals: self.backend.create_vertex_buffer(&mesh.normal_data())?,
            lines: self.backend.create_index_buffer(&line_indices)?,
            line_count: line_indices.len(),
            triangles: self.backend.create_index_buffer(&triangle_indices)?,
            triangle_count: triangle_indices.len(),
        };
        self.buffers.push(buffers);
        Ok(self.buffers.len() - 1)
    }

    /// Draw one frame of `scene`.
    ///
    /// Clears, sets the projection, puts the camera back on its orbit,
    /// rebuilds the view, then transforms and draws every model in order.
    pub fn render_frame(&mut self, scene: &mut Scene) -> Result<FrameStats, RenderError> {
        let mut stats = FrameStats::default();

        self.backend.clear();
        self.backend.set_projection(&scene.camera.projection_matrix());

        scene.camera.update_orbit();
        let view = scene.camera.view_matrix();

        for model in &mut scene.models {
            model.update_transforms(&view);
            let index = self.buffer_index(&model.mesh)?;

            self.backend.set_color(model.color);
            self.backend.set_view_model(model.view_model_matrix());
            self.backend.set_normal_matrix(model.normal_matrix());
            self.draw_model(model, index, &mut stats);
            stats.models += 1;
        }

        log::trace!("frame: {stats:?}");
        Ok(stats)
    }

    /// Filled triangles first, then the black wireframe overlay with the
    /// normal attribute switched off.
    fn draw_model(&mut self, model: &Model, index: usize, stats: &mut FrameStats) {
        let buffers = &self.buffers[index];

        if model.fill_style.has_fill() {
            self.backend
                .bind_attributes(&buffers.positions, Some(&buffers.normals));
            self.backend
                .draw_indexed(Topology::Triangles, &buffers.triangles, buffers.triangle_count);
            stats.triangle_draws += 1;
        }

        if model.fill_style.has_wireframe() {
            self.backend.set_color(BLACK);
            self.backend.bind_attributes(&buffers.positions, None);
            self.backend
                .draw_indexed(Topology::Lines, &buffers.lines, buffers.line_count);
            stats.line_draws += 1;
        }
    }
}
