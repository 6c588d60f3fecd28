//! In-memory [`GlApi`] implementation.
//!
//! `HeadlessGl` performs no rendering. It keeps the same binding state a GL
//! driver would (current vertex array, current program, per-vertex-array
//! attribute slots and element buffer), stores buffer contents, reflects the
//! attribute and uniform names a program declares from its GLSL, and records
//! every call in order. GL usage errors are collected instead of aborting,
//! the way `glGetError` would report them.
//!
//! Used by the test suites and by `mage-studio` to trace what a draw does.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use super::{BufferTarget, GlApi, GlError, ShaderSource, ShaderStage};

// ── handles ───────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct VertexArrayId(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

/// Uniform location; remembers which program and name it was resolved from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformSlot {
    pub program: ProgramId,
    pub location: u32,
    pub name: String,
}

// ── recorded calls ────────────────────────────────────────────────────────

/// Payload of one typed uniform call.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformCall {
    F1(f32),
    F2([f32; 2]),
    F3([f32; 3]),
    F4([f32; 4]),
    I1(i32),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

/// One state-changing call, in issue order. Location queries are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    DeleteVertexArray(VertexArrayId),
    CreateBuffer { buffer: BufferId, target: BufferTarget, bytes: usize },
    BindBuffer { target: BufferTarget, buffer: Option<BufferId> },
    DeleteBuffer(BufferId),
    CreateProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    DeleteProgram(ProgramId),
    EnableAttribute { location: u32, buffer: BufferId, components: i32 },
    DisableAttribute(u32),
    Uniform { name: String, value: UniformCall },
    DrawArrays { count: i32 },
    DrawElements { count: i32 },
}

impl GlCall {
    pub fn is_draw(&self) -> bool {
        matches!(self, GlCall::DrawArrays { .. } | GlCall::DrawElements { .. })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttributeBinding {
    pub location: u32,
    pub buffer: BufferId,
    pub components: i32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawKind {
    Arrays,
    Elements,
}

/// Snapshot of the bound state at the moment a draw was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub kind: DrawKind,
    pub count: i32,
    pub program: Option<ProgramId>,
    pub vertex_array: Option<VertexArrayId>,
    pub attributes: Vec<AttributeBinding>,
    pub element_buffer: Option<BufferId>,
}

// ── internal state ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct VertexArrayState {
    attributes: BTreeMap<u32, AttributeBinding>,
    element_buffer: Option<BufferId>,
}

#[derive(Debug)]
struct BufferState {
    target: BufferTarget,
    data: Vec<u8>,
}

#[derive(Debug)]
struct ProgramState {
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,

    vertex_arrays: HashMap<VertexArrayId, VertexArrayState>,
    buffers: HashMap<BufferId, BufferState>,
    programs: HashMap<ProgramId, ProgramState>,

    bound_vertex_array: Option<VertexArrayId>,
    bound_program: Option<ProgramId>,
    bound_array_buffer: Option<BufferId>,

    calls: Vec<GlCall>,
    draws: Vec<DrawRecord>,
    errors: Vec<String>,
}

impl State {
    fn next_id(&mut self) -> u32 {
        // Zero is the "no object" name in GL.
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, call: GlCall) {
        log::trace!("headless gl: {call:?}");
        self.calls.push(call);
    }

    fn error(&mut self, msg: String) {
        log::debug!("headless gl error: {msg}");
        self.errors.push(msg);
    }

    fn current_vertex_array_mut(&mut self) -> Option<&mut VertexArrayState> {
        let id = self.bound_vertex_array?;
        self.vertex_arrays.get_mut(&id)
    }

    fn uniform_target_ok(&mut self, slot: &UniformSlot) -> bool {
        match self.bound_program {
            Some(p) if p == slot.program => true,
            Some(p) => {
                self.error(format!(
                    "GL_INVALID_OPERATION: uniform {:?} belongs to {:?}, current program is {p:?}",
                    slot.name, slot.program
                ));
                false
            }
            None => {
                self.error(format!("GL_INVALID_OPERATION: uniform {:?} set with no program in use", slot.name));
                false
            }
        }
    }

    fn set_uniform(&mut self, slot: &UniformSlot, value: UniformCall) {
        if self.uniform_target_ok(slot) {
            self.record(GlCall::Uniform { name: slot.name.clone(), value });
        }
    }

    fn snapshot(&self, kind: DrawKind, count: i32) -> DrawRecord {
        let vao = self
            .bound_vertex_array
            .and_then(|id| self.vertex_arrays.get(&id));
        DrawRecord {
            kind,
            count,
            program: self.bound_program,
            vertex_array: self.bound_vertex_array,
            attributes: vao
                .map(|v| v.attributes.values().copied().collect())
                .unwrap_or_default(),
            element_buffer: vao.and_then(|v| v.element_buffer),
        }
    }
}

// ── HeadlessGl ────────────────────────────────────────────────────────────

/// Recording, state-tracking GL backend. See the module docs.
#[derive(Debug, Default)]
pub struct HeadlessGl {
    state: RefCell<State>,
}

impl HeadlessGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    /// Returns and clears the recorded calls (draw records are kept).
    pub fn take_calls(&self) -> Vec<GlCall> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    pub fn draws(&self) -> Vec<DrawRecord> {
        self.state.borrow().draws.clone()
    }

    /// GL usage errors observed so far.
    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.state.borrow().bound_vertex_array
    }

    pub fn bound_program(&self) -> Option<ProgramId> {
        self.state.borrow().bound_program
    }

    pub fn bound_array_buffer(&self) -> Option<BufferId> {
        self.state.borrow().bound_array_buffer
    }

    /// Enabled attribute slots of `vertex_array`, by location.
    pub fn enabled_attributes(&self, vertex_array: VertexArrayId) -> Vec<AttributeBinding> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vertex_array)
            .map(|v| v.attributes.values().copied().collect())
            .unwrap_or_default()
    }

    pub fn element_buffer(&self, vertex_array: VertexArrayId) -> Option<BufferId> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vertex_array)
            .and_then(|v| v.element_buffer)
    }

    pub fn buffer_target(&self, buffer: BufferId) -> Option<BufferTarget> {
        self.state.borrow().buffers.get(&buffer).map(|b| b.target)
    }

    /// Buffer contents reinterpreted as `f32`.
    pub fn buffer_f32(&self, buffer: BufferId) -> Option<Vec<f32>> {
        let st = self.state.borrow();
        st.buffers
            .get(&buffer)
            .map(|b| bytemuck::pod_collect_to_vec::<u8, f32>(&b.data))
    }

    /// Buffer contents reinterpreted as `u32`.
    pub fn buffer_u32(&self, buffer: BufferId) -> Option<Vec<u32>> {
        let st = self.state.borrow();
        st.buffers
            .get(&buffer)
            .map(|b| bytemuck::pod_collect_to_vec::<u8, u32>(&b.data))
    }

    /// Attribute names the program declares, in location order.
    pub fn program_attributes(&self, program: ProgramId) -> Option<Vec<String>> {
        self.state.borrow().programs.get(&program).map(|p| p.attributes.clone())
    }

    pub fn program_uniforms(&self, program: ProgramId) -> Option<Vec<String>> {
        self.state.borrow().programs.get(&program).map(|p| p.uniforms.clone())
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }
}

impl GlApi for HeadlessGl {
    type VertexArray = VertexArrayId;
    type Buffer = BufferId;
    type Program = ProgramId;
    type UniformLocation = UniformSlot;

    fn create_vertex_array(&self) -> Result<Self::VertexArray, GlError> {
        let mut st = self.state.borrow_mut();
        let id = VertexArrayId(st.next_id());
        st.vertex_arrays.insert(id, VertexArrayState::default());
        st.record(GlCall::CreateVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        let mut st = self.state.borrow_mut();
        if let Some(id) = vertex_array {
            if !st.vertex_arrays.contains_key(&id) {
                st.error(format!("GL_INVALID_OPERATION: bind of unknown vertex array {id:?}"));
                return;
            }
        }
        st.bound_vertex_array = vertex_array;
        st.record(GlCall::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        let mut st = self.state.borrow_mut();
        if st.vertex_arrays.remove(&vertex_array).is_none() {
            return;
        }
        if st.bound_vertex_array == Some(vertex_array) {
            st.bound_vertex_array = None;
        }
        st.record(GlCall::DeleteVertexArray(vertex_array));
    }

    fn create_buffer(&self, target: BufferTarget, data: &[u8]) -> Result<Self::Buffer, GlError> {
        let mut st = self.state.borrow_mut();
        let id = BufferId(st.next_id());
        st.buffers.insert(id, BufferState { target, data: data.to_vec() });
        st.record(GlCall::CreateBuffer { buffer: id, target, bytes: data.len() });

        // Mirrors the bind / upload / unbind sequence a driver-backed context performs.
        match target {
            BufferTarget::Array => st.bound_array_buffer = None,
            BufferTarget::ElementArray => {
                if let Some(vao) = st.current_vertex_array_mut() {
                    vao.element_buffer = None;
                }
            }
        }
        Ok(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        let mut st = self.state.borrow_mut();
        if let Some(id) = buffer {
            if !st.buffers.contains_key(&id) {
                st.error(format!("GL_INVALID_OPERATION: bind of unknown buffer {id:?}"));
                return;
            }
        }
        match target {
            BufferTarget::Array => st.bound_array_buffer = buffer,
            BufferTarget::ElementArray => match st.current_vertex_array_mut() {
                Some(vao) => vao.element_buffer = buffer,
                None => {
                    st.error("GL_INVALID_OPERATION: element buffer bound with no vertex array".into());
                    return;
                }
            },
        }
        st.record(GlCall::BindBuffer { target, buffer });
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        let mut st = self.state.borrow_mut();
        if st.buffers.remove(&buffer).is_none() {
            return;
        }
        if st.bound_array_buffer == Some(buffer) {
            st.bound_array_buffer = None;
        }
        if let Some(vao) = st.current_vertex_array_mut() {
            if vao.element_buffer == Some(buffer) {
                vao.element_buffer = None;
            }
        }
        st.record(GlCall::DeleteBuffer(buffer));
    }

    fn create_program(&self, stages: &[ShaderSource<'_>]) -> Result<Self::Program, GlError> {
        let mut attributes = Vec::new();
        let mut uniforms: Vec<String> = Vec::new();

        for stage in stages {
            if !stage.source.contains("main") {
                return Err(GlError::new(format!(
                    "{} stage failed to compile: no entry point `main`",
                    stage.stage
                )));
            }
            let decls = reflect(stage.source, stage.stage);
            attributes.extend(decls.attributes);
            for name in decls.uniforms {
                if !uniforms.contains(&name) {
                    uniforms.push(name);
                }
            }
        }

        if !stages.iter().any(|s| s.stage == ShaderStage::Vertex) {
            return Err(GlError::new("program failed to link: no vertex stage"));
        }

        let mut st = self.state.borrow_mut();
        let id = ProgramId(st.next_id());
        st.programs.insert(id, ProgramState { attributes, uniforms });
        st.record(GlCall::CreateProgram(id));
        Ok(id)
    }

    fn use_program(&self, program: Option<Self::Program>) {
        let mut st = self.state.borrow_mut();
        if let Some(id) = program {
            if !st.programs.contains_key(&id) {
                st.error(format!("GL_INVALID_OPERATION: use of unknown program {id:?}"));
                return;
            }
        }
        st.bound_program = program;
        st.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: Self::Program) {
        let mut st = self.state.borrow_mut();
        if st.programs.remove(&program).is_none() {
            return;
        }
        if st.bound_program == Some(program) {
            st.bound_program = None;
        }
        st.record(GlCall::DeleteProgram(program));
    }

    fn attribute_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        let st = self.state.borrow();
        let p = st.programs.get(&program)?;
        p.attributes.iter().position(|a| a == name).map(|i| i as u32)
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        let st = self.state.borrow();
        let p = st.programs.get(&program)?;
        let location = p.uniforms.iter().position(|u| u == name)? as u32;
        Some(UniformSlot { program, location, name: name.to_string() })
    }

    fn enable_attribute(&self, location: u32, buffer: Self::Buffer, components: i32) {
        let mut st = self.state.borrow_mut();
        if !st.buffers.contains_key(&buffer) {
            st.error(format!("GL_INVALID_OPERATION: attribute sourced from unknown buffer {buffer:?}"));
            return;
        }
        if !(1..=4).contains(&components) {
            st.error(format!("GL_INVALID_VALUE: attribute size {components}"));
            return;
        }
        let Some(vao) = st.current_vertex_array_mut() else {
            st.error("GL_INVALID_OPERATION: attribute enabled with no vertex array".into());
            return;
        };
        vao.attributes
            .insert(location, AttributeBinding { location, buffer, components });
        st.record(GlCall::EnableAttribute { location, buffer, components });
    }

    fn disable_attribute(&self, location: u32) {
        let mut st = self.state.borrow_mut();
        let Some(vao) = st.current_vertex_array_mut() else {
            st.error("GL_INVALID_OPERATION: attribute disabled with no vertex array".into());
            return;
        };
        vao.attributes.remove(&location);
        st.record(GlCall::DisableAttribute(location));
    }

    fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32) {
        self.state.borrow_mut().set_uniform(location, UniformCall::F1(x));
    }

    fn uniform_2_f32(&self, location: &Self::UniformLocation, x: f32, y: f32) {
        self.state.borrow_mut().set_uniform(location, UniformCall::F2([x, y]));
    }

    fn uniform_3_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32) {
        self.state.borrow_mut().set_uniform(location, UniformCall::F3([x, y, z]));
    }

    fn uniform_4_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        self.state.borrow_mut().set_uniform(location, UniformCall::F4([x, y, z, w]));
    }

    fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32) {
        self.state.borrow_mut().set_uniform(location, UniformCall::I1(x));
    }

    fn uniform_matrix_3_f32(&self, location: &Self::UniformLocation, m: &[f32; 9]) {
        self.state.borrow_mut().set_uniform(location, UniformCall::Mat3(*m));
    }

    fn uniform_matrix_4_f32(&self, location: &Self::UniformLocation, m: &[f32; 16]) {
        self.state.borrow_mut().set_uniform(location, UniformCall::Mat4(*m));
    }

    fn draw_arrays(&self, count: i32) {
        let mut st = self.state.borrow_mut();
        if st.bound_program.is_none() {
            st.error("GL_INVALID_OPERATION: draw with no program in use".into());
            return;
        }
        let record = st.snapshot(DrawKind::Arrays, count);
        st.draws.push(record);
        st.record(GlCall::DrawArrays { count });
    }

    fn draw_elements(&self, count: i32) {
        let mut st = self.state.borrow_mut();
        if st.bound_program.is_none() {
            st.error("GL_INVALID_OPERATION: draw with no program in use".into());
            return;
        }
        let record = st.snapshot(DrawKind::Elements, count);
        if record.element_buffer.is_none() {
            st.error("GL_INVALID_OPERATION: indexed draw with no element buffer".into());
            return;
        }
        st.draws.push(record);
        st.record(GlCall::DrawElements { count });
    }
}

// ── GLSL reflection ───────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
struct Declarations {
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

/// Collects global `uniform` declarations, and `in`/`attribute` declarations
/// of a vertex stage, from GLSL source.
///
/// This is a declaration scanner, not a parser. It handles comments,
/// preprocessor lines, `layout(...)` qualifiers, arrays and comma-separated
/// declarators. Interface blocks are skipped.
fn reflect(source: &str, stage: ShaderStage) -> Declarations {
    let mut out = Declarations::default();
    let source: String = strip_comments(source)
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    for stmt in source.split(';') {
        // Drop whatever precedes the statement inside/after a block.
        let stmt = stmt.rsplit(['{', '}']).next().unwrap_or("").trim();
        let stmt = match stmt.strip_prefix("layout") {
            Some(rest) => rest.split_once(')').map_or("", |(_, after)| after).trim(),
            None => stmt,
        };
        if stmt.is_empty() || stmt.contains('(') {
            continue;
        }

        let (qualifiers, declarators) = split_declaration(stmt);
        let is_uniform = qualifiers.contains(&"uniform");
        let is_input = stage == ShaderStage::Vertex
            && (qualifiers.contains(&"in") || qualifiers.contains(&"attribute"));
        if !is_uniform && !is_input {
            continue;
        }

        let target = if is_uniform { &mut out.uniforms } else { &mut out.attributes };
        target.extend(declarators);
    }
    out
}

/// Splits `uniform highp vec3 a, b[2]` into its leading words and the
/// declared names (`["a", "b"]`).
fn split_declaration(stmt: &str) -> (Vec<&str>, Vec<String>) {
    let stmt = stmt.split('=').next().unwrap_or("");
    let mut parts = stmt.split(',');
    let first = parts.next().unwrap_or("");

    let mut words: Vec<&str> = first.split_whitespace().collect();
    let Some(first_name) = words.pop() else {
        return (words, Vec::new());
    };

    let names = std::iter::once(first_name)
        .chain(parts.map(str::trim))
        .map(|n| n.split('[').next().unwrap_or("").trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    (words, names)
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    loop {
        let block = rest.find("/*");
        let line = rest.find("//").filter(|&l| block.is_none_or(|b| l < b));

        if let Some(l) = line {
            out.push_str(&rest[..l]);
            let after = &rest[l..];
            rest = match after.find('\n') {
                Some(n) => &after[n..],
                None => "",
            };
        } else if let Some(b) = block {
            out.push_str(&rest[..b]);
            out.push(' ');
            let after = &rest[b + 2..];
            rest = match after.find("*/") {
                Some(e) => &after[e + 2..],
                None => "",
            };
        } else {
            out.push_str(rest);
            return out;
        }
    }
}
