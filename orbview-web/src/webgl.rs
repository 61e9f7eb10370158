/// WebGL2 implementation of the rendering backend
use nalgebra::{Matrix3, Matrix4};
use web_sys::{
    Document, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation,
};

use orbview_core::backend::{PipelineState, RenderBackend, ShaderSource, Topology};
use orbview_core::error::{RenderError, ShaderError};
use orbview_core::shaders::{BuiltinShaders, ShaderSourceProvider};
use orbview_core::Color;

/// Attribute slots, matching the `layout(location = ...)` in the shaders
const POSITION_ATTRIB: u32 = 0;
const NORMAL_ATTRIB: u32 = 1;

/// Attribute names bound to their slots before linking
const ATTRIBUTES: [(u32, &str); 2] = [
    (POSITION_ATTRIB, "aPosition"),
    (NORMAL_ATTRIB, "aNormal"),
];

#[derive(Debug, Clone)]
struct Uniforms {
    projection: Option<WebGlUniformLocation>,
    view_model: Option<WebGlUniformLocation>,
    normal: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
}

/// A linked program with its uniform locations
#[derive(Debug, Clone)]
pub struct GlProgram {
    program: WebGlProgram,
    uniforms: Uniforms,
}

pub struct WebGlBackend {
    gl: Gl,
    current: Option<GlProgram>,
}

impl WebGlBackend {
    pub fn new(gl: Gl) -> Self {
        Self { gl, current: None }
    }

    fn compile_shader(&self, kind: u32, source: &ShaderSource) -> Result<WebGlShader, ShaderError> {
        let shader = self
            .gl
            .create_shader(kind)
            .ok_or_else(|| ShaderError::new(source.name.clone(), "unable to create shader object"))?;
        self.gl.shader_source(&shader, &source.text);
        self.gl.compile_shader(&shader);

        let compiled = self
            .gl
            .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false);
        if compiled {
            Ok(shader)
        } else {
            let log = self.gl.get_shader_info_log(&shader).unwrap_or_default();
            self.gl.delete_shader(Some(&shader));
            Err(ShaderError::new(source.name.clone(), log))
        }
    }

    /// Link the two stages with the attribute slots pinned, so page shaders
    /// without `layout` qualifiers read the same buffers as the built-ins
    fn link(&self, vs: &WebGlShader, fs: &WebGlShader) -> Result<WebGlProgram, ShaderError> {
        let program = self
            .gl
            .create_program()
            .ok_or_else(|| ShaderError::new("program", "unable to create program object"))?;
        self.gl.attach_shader(&program, vs);
        self.gl.attach_shader(&program, fs);
        for (location, name) in ATTRIBUTES {
            self.gl.bind_attrib_location(&program, location, name);
        }
        self.gl.link_program(&program);

        let linked = self
            .gl
            .get_program_parameter(&program, Gl::LINK_STATUS)
            .as_bool()
            .unwrap_or(false);
        if linked {
            Ok(program)
        } else {
            let log = self.gl.get_program_info_log(&program).unwrap_or_default();
            self.gl.delete_program(Some(&program));
            Err(ShaderError::new("program", log))
        }
    }
}

impl RenderBackend for WebGlBackend {
    type Program = GlProgram;
    type Buffer = WebGlBuffer;

    fn compile_program(
        &mut self,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<GlProgram, ShaderError> {
        let vs = self.compile_shader(Gl::VERTEX_SHADER, vertex)?;
        let fs = match self.compile_shader(Gl::FRAGMENT_SHADER, fragment) {
            Ok(fs) => fs,
            Err(err) => {
                self.gl.delete_shader(Some(&vs));
                return Err(err);
            }
        };

        let linked = self.link(&vs, &fs);
        // A linked program keeps its own copy of the stages
        self.gl.delete_shader(Some(&vs));
        self.gl.delete_shader(Some(&fs));
        let program = linked?;

        let uniforms = Uniforms {
            projection: self.gl.get_uniform_location(&program, "uPMatrix"),
            view_model: self.gl.get_uniform_location(&program, "uMVMatrix"),
            normal: self.gl.get_uniform_location(&program, "uNMatrix"),
            color: self.gl.get_uniform_location(&program, "uColor"),
        };
        Ok(GlProgram { program, uniforms })
    }

    fn use_program(&mut self, program: Option<&GlProgram>) {
        self.gl.use_program(program.map(|p| &p.program));
        self.current = program.cloned();
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<WebGlBuffer, RenderError> {
        let buffer = self
            .gl
            .create_buffer()
            .ok_or(RenderError::BufferAllocation("vertex"))?;
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
        let array = js_sys::Float32Array::from(data);
        self.gl
            .buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &array, Gl::STATIC_DRAW);
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, None);
        Ok(buffer)
    }

    fn create_index_buffer(&mut self, data: &[u16]) -> Result<WebGlBuffer, RenderError> {
        let buffer = self
            .gl
            .create_buffer()
            .ok_or(RenderError::BufferAllocation("index"))?;
        self.gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&buffer));
        let array = js_sys::Uint16Array::from(data);
        self.gl.buffer_data_with_array_buffer_view(
            Gl::ELEMENT_ARRAY_BUFFER,
            &array,
            Gl::STATIC_DRAW,
        );
        self.gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, None);
        Ok(buffer)
    }

    fn apply_pipeline(&mut self, state: &PipelineState) {
        let [r, g, b, a] = state.clear_color;
        self.gl.clear_color(r, g, b, a);
        self.gl
            .front_face(if state.front_face_ccw { Gl::CCW } else { Gl::CW });

        if state.cull_back_faces {
            self.gl.enable(Gl::CULL_FACE);
            self.gl.cull_face(Gl::BACK);
        } else {
            self.gl.disable(Gl::CULL_FACE);
        }

        if state.depth_test {
            self.gl.enable(Gl::DEPTH_TEST);
        } else {
            self.gl.disable(Gl::DEPTH_TEST);
        }

        match state.polygon_offset {
            Some((factor, units)) => {
                self.gl.enable(Gl::POLYGON_OFFSET_FILL);
                self.gl.polygon_offset(factor, units);
            }
            None => self.gl.disable(Gl::POLYGON_OFFSET_FILL),
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    fn clear(&mut self) {
        self.gl
            .clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
    }

    fn set_projection(&mut self, matrix: &Matrix4<f32>) {
        if let Some(program) = &self.current {
            self.gl.uniform_matrix4fv_with_f32_array(
                program.uniforms.projection.as_ref(),
                false,
                matrix.as_slice(),
            );
        }
    }

    fn set_view_model(&mut self, matrix: &Matrix4<f32>) {
        if let Some(program) = &self.current {
            self.gl.uniform_matrix4fv_with_f32_array(
                program.uniforms.view_model.as_ref(),
                false,
                matrix.as_slice(),
            );
        }
    }

    fn set_normal_matrix(&mut self, matrix: &Matrix3<f32>) {
        if let Some(program) = &self.current {
            self.gl.uniform_matrix3fv_with_f32_array(
                program.uniforms.normal.as_ref(),
                false,
                matrix.as_slice(),
            );
        }
    }

    fn set_color(&mut self, color: Color) {
        if let Some(program) = &self.current {
            self.gl
                .uniform4fv_with_f32_array(program.uniforms.color.as_ref(), &color);
        }
    }

    fn bind_attributes(&mut self, positions: &WebGlBuffer, normals: Option<&WebGlBuffer>) {
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(positions));
        self.gl
            .vertex_attrib_pointer_with_i32(POSITION_ATTRIB, 3, Gl::FLOAT, false, 0, 0);
        self.gl.enable_vertex_attrib_array(POSITION_ATTRIB);

        match normals {
            Some(normals) => {
                self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(normals));
                self.gl
                    .vertex_attrib_pointer_with_i32(NORMAL_ATTRIB, 3, Gl::FLOAT, false, 0, 0);
                self.gl.enable_vertex_attrib_array(NORMAL_ATTRIB);
            }
            None => {
                self.gl.disable_vertex_attrib_array(NORMAL_ATTRIB);
                self.gl.vertex_attrib3f(NORMAL_ATTRIB, 0.0, 0.0, 0.0);
            }
        }
    }

    fn draw_indexed(&mut self, topology: Topology, indices: &WebGlBuffer, count: usize) {
        if self.current.is_none() {
            return;
        }

        let mode = match topology {
            Topology::Triangles => Gl::TRIANGLES,
            Topology::Lines => Gl::LINES,
        };
        self.gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(indices));
        self.gl
            .draw_elements_with_i32(mode, count as i32, Gl::UNSIGNED_SHORT, 0);
    }
}

/// Reads shader text from `<script id="...">` elements, falling back to the
/// built-in sources when the page does not provide one
pub struct DomShaderSource {
    document: Document,
}

impl DomShaderSource {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl ShaderSourceProvider for DomShaderSource {
    fn source(&self, name: &str) -> Option<String> {
        let from_page = self
            .document
            .get_element_by_id(name)
            .and_then(|element| element.text_content())
            .filter(|text| !text.trim().is_empty());

        match from_page {
            Some(text) => {
                log::debug!("using page shader '{name}'");
                Some(text)
            }
            None => BuiltinShaders.source(name),
        }
    }
}
