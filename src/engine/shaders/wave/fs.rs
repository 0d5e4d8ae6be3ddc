use vulkano_shaders;

vulkano_shaders::shader! {
    ty: "fragment",
    src: "
#version 450

layout(location = 0) out vec4 f_color;

const vec4 SURFACE_COLOR = vec4(0.12, 0.34, 0.62, 1.0);

void main() {
    f_color = SURFACE_COLOR;
}
"
}
