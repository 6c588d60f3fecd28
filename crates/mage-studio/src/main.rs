mod args;

use std::rc::Rc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use glam::{Mat4, Vec2, Vec3};
use mage_engine::gl::headless::DrawKind;
use mage_engine::gl::{HeadlessGl, ShaderSource, ShaderStage};
use mage_engine::logging::{LoggingConfig, init_logging};
use mage_engine::{Mesh, MeshBuilder, Shader};

use args::StudioArgs;

const DEMO_VS: &str = "#version 330 core
in vec3 position;
in vec3 color;
in vec2 uv;
uniform mat4 uWorld;
out vec3 vColor;
void main() {
    vColor = color;
    gl_Position = uWorld * vec4(position, 1.0);
}";

const DEMO_FS: &str = "#version 330 core
in vec3 vColor;
uniform float uAlpha;
out vec4 outColor;
void main() { outColor = vec4(vColor, uAlpha); }";

fn main() -> Result<()> {
    let args = StudioArgs::parse();

    init_logging(if args.quiet {
        LoggingConfig::quiet()
    } else {
        LoggingConfig::default()
    });

    let gl = Rc::new(HeadlessGl::new());
    let shader = Rc::new(
        Shader::from_sources(
            &gl,
            &[
                ShaderSource::new(ShaderStage::Vertex, DEMO_VS),
                ShaderSource::new(ShaderStage::Fragment, DEMO_FS),
            ],
        )
        .context("building demo shader")?,
    );

    let mut triangle = build_triangle(&gl, &shader).context("building triangle")?;
    let mut quad = build_quad(&gl, &shader).context("building quad")?;
    gl.take_calls();
    log::info!("drawing {} frames", args.frames);

    for frame in 0..args.frames {
        let angle = frame as f32 * 0.1;
        triangle.set_uniform("uWorld", Mat4::from_rotation_z(angle));
        quad.set_uniform("uWorld", Mat4::from_translation(Vec3::new(0.5, 0.0, 0.0)));
        triangle.draw();
        quad.draw();
    }

    let calls = gl.take_calls();
    if !args.quiet {
        for call in &calls {
            println!("{call:?}");
        }
        println!();
    }

    summarize(&gl);

    let errors = gl.errors();
    if !errors.is_empty() {
        for e in &errors {
            log::error!("{e}");
        }
        bail!("{} GL errors recorded", errors.len());
    }

    Ok(())
}

fn build_triangle(gl: &Rc<HeadlessGl>, shader: &Rc<Shader<HeadlessGl>>) -> Result<Mesh<HeadlessGl>> {
    let mesh = MeshBuilder::new(gl)?
        .add_vector3_attribute(
            "position",
            [Vec3::new(-0.5, -0.5, 0.0), Vec3::new(0.5, -0.5, 0.0), Vec3::new(0.0, 0.5, 0.0)],
        )?
        .add_vector3_attribute("color", [Vec3::X, Vec3::Y, Vec3::Z])?
        .set_shader(Rc::clone(shader))
        .set_uniform("uAlpha", 1.0_f32)
        .create();
    Ok(mesh)
}

fn build_quad(gl: &Rc<HeadlessGl>, shader: &Rc<Shader<HeadlessGl>>) -> Result<Mesh<HeadlessGl>> {
    let mesh = MeshBuilder::new(gl)?
        .add_vector3_attribute(
            "position",
            [
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
            ],
        )?
        .add_vector3_attribute("color", [Vec3::ONE; 4])?
        .add_vector2_attribute("uv", [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y])?
        .set_indices([0, 1, 2, 0, 2, 3])?
        .set_shader(Rc::clone(shader))
        .set_uniform("uAlpha", 0.5_f32)
        .create();
    Ok(mesh)
}

fn summarize(gl: &HeadlessGl) {
    let draws = gl.draws();
    let arrays = draws.iter().filter(|d| d.kind == DrawKind::Arrays).count();
    let elements = draws.len() - arrays;
    let vertices: i64 = draws.iter().map(|d| i64::from(d.count)).sum();

    println!(
        "{} draw calls ({arrays} arrays, {elements} elements), {vertices} vertices",
        draws.len()
    );
    for (i, d) in draws.iter().enumerate() {
        println!(
            "  #{i:<3} {:?} count={} attributes={} program={:?}",
            d.kind,
            d.count,
            d.attributes.len(),
            d.program
        );
    }
}
