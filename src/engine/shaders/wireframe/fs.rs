use vulkano_shaders;

vulkano_shaders::shader! {
    ty: "fragment",
    src: "
#version 450

layout(location = 0) out vec4 f_color;

const vec4 LINE_COLOR = vec4(0.85, 0.9, 0.95, 1.0);

void main() {
    f_color = LINE_COLOR;
}
"
}
