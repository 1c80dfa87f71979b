//! Geometry and shader sources drawn by the `triangle` binary.

#[rustfmt::skip]
pub const TRIANGLE_VERTICES: [f32; 9] = [
    -1.0, -1.0, 0.0,
     1.0, -1.0, 0.0,
     0.0,  1.0, 0.0,
];

pub const VERTEX_SHADER: &str = r#"#version 330

layout(location = 0) in vec3 pos;

out vec4 vCol;

uniform mat4 model;

void main()
{
    gl_Position = model * vec4(pos, 1.0);
    // negative coordinates end up black
    vCol = vec4(clamp(pos, 0.0f, 1.0f), 1.0f);
}
"#;

pub const FRAGMENT_SHADER: &str = r#"#version 330

in vec4 vCol;
out vec4 colour;

void main()
{
    colour = vCol;
}
"#;
