/// WGSL shader for the cave: world-space vertices lit by a hemisphere ambient
/// term and a single spotlight, with exponential-squared fog.
pub const CAVE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // xyz position, w range
    torch_pos: vec4<f32>,
    // xyz direction, w cos(outer angle)
    torch_dir: vec4<f32>,
    // rgb color * intensity, w cos(inner angle)
    torch_color: vec4<f32>,
    // rgb sky color * intensity
    sky: vec4<f32>,
    // rgb ground color * intensity
    ground: vec4<f32>,
    // rgb fog color, w density
    fog: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    // rgb base color, a roughness
    @location(2) color: vec4<f32>,
    @location(3) emissive: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) emissive: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.world_pos = vertex.position;
    out.world_normal = vertex.normal;
    out.color = vertex.color;
    out.emissive = vertex.emissive;
    return out;
}

@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    var n = normalize(in.world_normal);
    if !front {
        n = -n;
    }

    let hemi = mix(uniforms.ground.rgb, uniforms.sky.rgb, n.y * 0.5 + 0.5);

    let to_light = uniforms.torch_pos.xyz - in.world_pos;
    let dist = length(to_light);
    let l = to_light / max(dist, 1e-4);
    let cos_angle = dot(-l, normalize(uniforms.torch_dir.xyz));
    let spot = smoothstep(uniforms.torch_dir.w, uniforms.torch_color.w, cos_angle);
    let falloff = clamp(1.0 - dist / uniforms.torch_pos.w, 0.0, 1.0);
    let diffuse = max(dot(n, l), 0.0);

    let v = normalize(uniforms.camera_pos.xyz - in.world_pos);
    let h = normalize(l + v);
    let shininess = mix(64.0, 2.0, in.color.a);
    let specular = pow(max(dot(n, h), 0.0), shininess) * (1.0 - in.color.a);

    let torch = uniforms.torch_color.rgb * spot * falloff * falloff;
    let lit = in.color.rgb * (hemi + torch * diffuse) + torch * specular + in.emissive;

    let depth = length(uniforms.camera_pos.xyz - in.world_pos);
    let fog_density = uniforms.fog.w;
    let fog_amount = 1.0 - exp(-fog_density * fog_density * depth * depth);
    return vec4<f32>(mix(lit, uniforms.fog.rgb, clamp(fog_amount, 0.0, 1.0)), 1.0);
}
"#;
