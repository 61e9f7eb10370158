/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use std::io::Write;

use orbview_core::backend::{PipelineState, RenderBackend, ShaderSource, Topology};
use orbview_core::error::{RenderError, ShaderError};
use orbview_core::shaders::{shade_factor, AMBIENT};
use orbview_core::Color as Rgba;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Smallest resolvable depth step, used for the constant part of the
/// polygon offset
const DEPTH_UNIT: f32 = 1.0 / (1 << 24) as f32;

/// Handle to an uploaded vertex or index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferId(usize);

/// The terminal has no shader compiler; a linked program just enables the
/// fixed shading that mirrors the GLSL sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiProgram;

enum BufferData {
    Vertex(Vec<f32>),
    Index(Vec<u16>),
}

/// One character cell of the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Rgba,
}

const EMPTY: Cell = Cell {
    ch: ' ',
    color: [0.0, 0.0, 0.0, 1.0],
};

/// A vertex after projection: cell coordinates, depth in `[0, 1]` and the
/// normalized device x/y used for winding tests
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    z: f32,
    ndc_x: f32,
    ndc_y: f32,
}

/// Depth and character buffers
struct Framebuffer {
    width: usize,
    height: usize,
    depth: Vec<f32>,
    cells: Vec<Cell>,
}

impl Framebuffer {
    fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth: vec![f32::INFINITY; size],
            cells: vec![EMPTY; size],
        }
    }

    fn clear(&mut self) {
        self.depth.fill(f32::INFINITY);
        self.cells.fill(EMPTY);
    }

    /// Write `cell` at `(x, y)` if it passes the depth test. Lines use a
    /// less-or-equal test so they survive on top of coplanar fills.
    fn plot(&mut self, x: i32, y: i32, depth: f32, cell: Cell, depth_test: bool, or_equal: bool) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        if !(0.0..=1.0).contains(&depth) {
            return;
        }

        let idx = y as usize * self.width + x as usize;
        let stored = self.depth[idx];
        let passes = !depth_test || depth < stored || (or_equal && depth == stored);
        if passes {
            self.depth[idx] = depth;
            self.cells[idx] = cell;
        }
    }

    fn rasterize_triangle(
        &mut self,
        v: [ScreenVertex; 3],
        shading: [f32; 3],
        color: Rgba,
        offset: f32,
        depth_test: bool,
    ) {
        let (v0, v1, v2) = (v[0], v[1], v[2]);

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.z + w1 * v1.z + w2 * v2.z + offset;
                        let factor = w0 * shading[0] + w1 * shading[1] + w2 * shading[2];
                        let cell = Cell {
                            ch: ramp_char(factor),
                            color: [
                                color[0] * factor,
                                color[1] * factor,
                                color[2] * factor,
                                color[3],
                            ],
                        };
                        self.plot(x, y, depth, cell, depth_test, false);
                    }
                }
            }
        }
    }

    fn rasterize_line(&mut self, a: ScreenVertex, b: ScreenVertex, color: Rgba, depth_test: bool) {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        let cell = Cell {
            ch: line_char(dx, dy),
            color,
        };

        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = (a.x + dx * t).floor() as i32;
            let y = (a.y + dy * t).floor() as i32;
            let depth = a.z + (b.z - a.z) * t;
            self.plot(x, y, depth, cell, depth_test, true);
        }
    }
}

/// Software implementation of [`RenderBackend`] that draws into a grid of
/// terminal cells
pub struct AsciiRenderer {
    target: Framebuffer,
    buffers: Vec<BufferData>,
    state: PipelineState,
    program_bound: bool,
    projection: Matrix4<f32>,
    view_model: Matrix4<f32>,
    normal: Matrix3<f32>,
    color: Rgba,
    positions: Option<BufferId>,
    normals: Option<BufferId>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            target: Framebuffer::new(width, height),
            buffers: Vec::new(),
            state: PipelineState::default(),
            program_bound: false,
            projection: Matrix4::identity(),
            view_model: Matrix4::identity(),
            normal: Matrix3::identity(),
            color: [1.0; 4],
            positions: None,
            normals: None,
        }
    }

    pub fn width(&self) -> usize {
        self.target.width
    }

    pub fn height(&self) -> usize {
        self.target.height
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.target.width && y < self.target.height)
            .then(|| self.target.cells[y * self.target.width + x])
    }

    /// Number of cells holding something other than background
    pub fn covered_cells(&self) -> usize {
        self.target.cells.iter().filter(|c| c.ch != ' ').count()
    }

    fn vertex_data(&self, id: BufferId) -> Option<&[f32]> {
        match self.buffers.get(id.0) {
            Some(BufferData::Vertex(data)) => Some(data),
            _ => None,
        }
    }

    fn index_data(&self, id: BufferId) -> Option<&[u16]> {
        match self.buffers.get(id.0) {
            Some(BufferData::Index(data)) => Some(data),
            _ => None,
        }
    }

    /// Project a packed `xyz` stream through the current matrices.
    /// Vertices behind the eye come back as `None`.
    fn project_all(&self, positions: &[f32]) -> Vec<Option<ScreenVertex>> {
        let mvp = self.projection * self.view_model;
        let width = self.target.width as f32;
        let height = self.target.height as f32;

        positions
            .chunks_exact(3)
            .map(|p| {
                let clip = mvp * Vector4::new(p[0], p[1], p[2], 1.0);

                // Prevent division by near-zero depth values
                if clip.w < 1e-6 {
                    return None;
                }

                let ndc = clip.xyz() / clip.w;
                Some(ScreenVertex {
                    x: (ndc.x + 1.0) * 0.5 * width,
                    y: (1.0 - ndc.y) * 0.5 * height,
                    z: (ndc.z + 1.0) * 0.5,
                    ndc_x: ndc.x,
                    ndc_y: ndc.y,
                })
            })
            .collect()
    }

    fn draw_triangles(&mut self, positions: BufferId, indices: BufferId, count: usize) {
        let (Some(position_data), Some(index_data)) =
            (self.vertex_data(positions), self.index_data(indices))
        else {
            log::warn!("draw with unknown buffers {positions:?} / {indices:?}");
            return;
        };

        let projected = self.project_all(position_data);
        let shading: Vec<f32> = match self.normals.and_then(|id| self.vertex_data(id)) {
            Some(normals) => normals
                .chunks_exact(3)
                .map(|n| shade_factor(&(self.normal * Vector3::new(n[0], n[1], n[2]))))
                .collect(),
            None => vec![1.0; projected.len()],
        };

        let triangles: Vec<[usize; 3]> = index_data[..count.min(index_data.len())]
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
            .collect();

        for tri in triangles {
            let vertices = tri.map(|i| projected.get(i).copied().flatten());
            let [Some(a), Some(b), Some(c)] = vertices else {
                // Triangle is clipped or references a missing vertex
                continue;
            };

            let area = (b.ndc_x - a.ndc_x) * (c.ndc_y - a.ndc_y)
                - (c.ndc_x - a.ndc_x) * (b.ndc_y - a.ndc_y);
            if area == 0.0 {
                continue;
            }
            let front = if self.state.front_face_ccw {
                area > 0.0
            } else {
                area < 0.0
            };
            if self.state.cull_back_faces && !front {
                continue;
            }

            let offset = self
                .state
                .polygon_offset
                .map(|(factor, units)| factor * depth_slope(a, b, c) + units * DEPTH_UNIT)
                .unwrap_or(0.0);
            let factors = tri.map(|i| shading.get(i).copied().unwrap_or(1.0));

            self.target
                .rasterize_triangle([a, b, c], factors, self.color, offset, self.state.depth_test);
        }
    }

    fn draw_lines(&mut self, positions: BufferId, indices: BufferId, count: usize) {
        let (Some(position_data), Some(index_data)) =
            (self.vertex_data(positions), self.index_data(indices))
        else {
            log::warn!("draw with unknown buffers {positions:?} / {indices:?}");
            return;
        };

        let projected = self.project_all(position_data);
        let segments: Vec<(usize, usize)> = index_data[..count.min(index_data.len())]
            .chunks_exact(2)
            .map(|s| (s[0] as usize, s[1] as usize))
            .collect();

        for (i, j) in segments {
            let (Some(Some(a)), Some(Some(b))) = (projected.get(i), projected.get(j)) else {
                continue;
            };
            self.target
                .rasterize_line(*a, *b, self.color, self.state.depth_test);
        }
    }

    /// Write the frame to `writer`, one terminal row per buffer row
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.queue(SetBackgroundColor(to_terminal(self.state.clear_color)))?;

        let mut current = None;
        for y in 0..self.target.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.target.width {
                let cell = self.target.cells[y * self.target.width + x];
                let color = to_terminal(cell.color);
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(cell.ch))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderBackend for AsciiRenderer {
    type Program = AsciiProgram;
    type Buffer = BufferId;

    fn compile_program(
        &mut self,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<AsciiProgram, ShaderError> {
        for source in [vertex, fragment] {
            if !source.text.contains("main") {
                return Err(ShaderError::new(
                    source.name.clone(),
                    "no entry point `main` in shader source",
                ));
            }
        }
        Ok(AsciiProgram)
    }

    fn use_program(&mut self, program: Option<&AsciiProgram>) {
        self.program_bound = program.is_some();
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferId, RenderError> {
        self.buffers.push(BufferData::Vertex(data.to_vec()));
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn create_index_buffer(&mut self, data: &[u16]) -> Result<BufferId, RenderError> {
        self.buffers.push(BufferData::Index(data.to_vec()));
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn apply_pipeline(&mut self, state: &PipelineState) {
        self.state = *state;
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        let (width, height) = (width as usize, height as usize);
        if width != self.target.width || height != self.target.height {
            self.target = Framebuffer::new(width, height);
        }
    }

    fn clear(&mut self) {
        self.target.clear();
    }

    fn set_projection(&mut self, matrix: &Matrix4<f32>) {
        self.projection = *matrix;
    }

    fn set_view_model(&mut self, matrix: &Matrix4<f32>) {
        self.view_model = *matrix;
    }

    fn set_normal_matrix(&mut self, matrix: &Matrix3<f32>) {
        self.normal = *matrix;
    }

    fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    fn bind_attributes(&mut self, positions: &BufferId, normals: Option<&BufferId>) {
        self.positions = Some(*positions);
        self.normals = normals.copied();
    }

    fn draw_indexed(&mut self, topology: Topology, indices: &BufferId, count: usize) {
        if !self.program_bound {
            return;
        }
        let Some(positions) = self.positions else {
            log::warn!("draw without bound positions");
            return;
        };

        match topology {
            Topology::Triangles => self.draw_triangles(positions, *indices, count),
            Topology::Lines => self.draw_lines(positions, *indices, count),
        }
    }
}

/// Largest depth change per cell across the triangle's plane
fn depth_slope(a: ScreenVertex, b: ScreenVertex, c: ScreenVertex) -> f32 {
    let e1 = Vector3::new(b.x - a.x, b.y - a.y, b.z - a.z);
    let e2 = Vector3::new(c.x - a.x, c.y - a.y, c.z - a.z);
    let n = e1.cross(&e2);
    if n.z.abs() < 1e-9 {
        return 0.0;
    }
    (n.x / n.z).abs().max((n.y / n.z).abs())
}

/// Map a shading factor in `[AMBIENT, 1]` onto the upper part of the ramp
fn ramp_char(factor: f32) -> char {
    let t = ((factor - AMBIENT) / (1.0 - AMBIENT)).clamp(0.0, 1.0);
    let lowest = 3;
    let index = lowest + (t * (LUMINOSITY_RAMP.len() - 1 - lowest) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Pick a glyph that follows the on-screen direction of a line
fn line_char(dx: f32, dy: f32) -> char {
    if dy.abs() < 0.5 * dx.abs() {
        '-'
    } else if dx.abs() < 0.5 * dy.abs() {
        '|'
    } else if dx * dy > 0.0 {
        '\\'
    } else {
        '/'
    }
}

fn to_terminal(color: Rgba) -> Color {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb {
        r: channel(color[0]),
        g: channel(color[1]),
        b: channel(color[2]),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
