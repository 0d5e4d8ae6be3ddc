use vulkano_shaders;

vulkano_shaders::shader! {
    ty: "vertex",
    src: "
#version 450

layout(set = 0, binding = 0) uniform VPUniformBufferObject {
    mat4 view;
    mat4 proj;
} ubo_vp;

layout(push_constant) uniform WavePushConstants {
    float wave_offset;
} pcs_w;

layout(location = 0) in vec3 position;

void main() {
    vec3 adjusted = vec3(
        position.x,
        position.y + sin(pcs_w.wave_offset + position.x + position.z),
        position.z
    );
    gl_Position = ubo_vp.proj * ubo_vp.view * vec4(adjusted, 1.0);
}
"
}
