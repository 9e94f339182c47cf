//! WGSL for the GPU canvas.
//!
//! Both primitives are instanced quads: six vertices per instance, expanded
//! in the vertex shader. Lines get a feathered edge across their width,
//! discs a feathered rim. Positions arrive in logical units and are mapped
//! to clip space with the viewport uniform.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct Uniforms {
    /// Logical viewport size.
    pub viewport: [f32; 2],
    /// Physical pixels per logical unit.
    pub scale: f32,
    pub _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct LineInstance {
    pub start: [f32; 2],
    pub end: [f32; 2],
    /// Linear RGB, straight alpha.
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct DiscInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub _pad: f32,
    /// Linear RGB, straight alpha.
    pub color: [f32; 4],
}

pub(crate) const LINE_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

// color skips the padding slot, so offsets are spelled out
pub(crate) const DISC_ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
    wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32x2, offset: 0, shader_location: 0 },
    wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32, offset: 8, shader_location: 1 },
    wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32x4, offset: 16, shader_location: 2 },
];

pub(crate) const SHADER_SOURCE: &str = r#"
struct Uniforms {
    viewport: vec2<f32>,
    scale: f32,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

fn to_clip(p: vec2<f32>) -> vec4<f32> {
    let ndc = vec2<f32>(
        p.x / uniforms.viewport.x * 2.0 - 1.0,
        1.0 - p.y / uniforms.viewport.y * 2.0,
    );
    return vec4<f32>(ndc, 0.0, 1.0);
}

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) across: f32,
};

@vertex
fn vs_line(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) start: vec2<f32>,
    @location(1) end: vec2<f32>,
    @location(2) color: vec4<f32>,
) -> LineOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(0.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(0.0,  1.0),
        vec2<f32>(0.0,  1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0,  1.0),
    );
    let corner = corners[vertex_index];

    let delta = end - start;
    let len = length(delta);
    var dir = vec2<f32>(1.0, 0.0);
    if len > 0.0 {
        dir = delta / len;
    }
    let normal = vec2<f32>(-dir.y, dir.x);
    // half of a one-unit line plus one pixel of feather
    let half_width = 0.5 + 1.0 / uniforms.scale;

    let p = mix(start, end, corner.x) + normal * corner.y * half_width;

    var out: LineOutput;
    out.clip_position = to_clip(p);
    out.color = color;
    out.across = corner.y * half_width;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    let coverage = clamp((0.5 - abs(in.across)) * uniforms.scale + 0.5, 0.0, 1.0);
    return vec4<f32>(in.color.rgb, in.color.a * coverage);
}

struct DiscOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) offset: vec2<f32>,
    @location(2) radius: f32,
};

@vertex
fn vs_disc(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) center: vec2<f32>,
    @location(1) radius: f32,
    @location(2) color: vec4<f32>,
) -> DiscOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let extent = radius + 1.0 / uniforms.scale;
    let offset = corners[vertex_index] * extent;

    var out: DiscOutput;
    out.clip_position = to_clip(center + offset);
    out.color = color;
    out.offset = offset;
    out.radius = radius;
    return out;
}

@fragment
fn fs_disc(in: DiscOutput) -> @location(0) vec4<f32> {
    let dist = length(in.offset);
    let coverage = clamp((in.radius - dist) * uniforms.scale + 0.5, 0.0, 1.0);
    if coverage <= 0.0 {
        discard;
    }
    return vec4<f32>(in.color.rgb, in.color.a * coverage);
}
"#;

/// sRGB channel to linear, for sRGB surface formats.
pub(crate) fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use naga::front::wgsl;
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    #[test]
    fn test_shader_parses_and_validates() {
        let module = match wgsl::parse_str(SHADER_SOURCE) {
            Ok(module) => module,
            Err(err) => panic!("{}", err.emit_to_string(SHADER_SOURCE)),
        };
        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        if let Err(err) = validator.validate(&module) {
            panic!("validation failed: {err}");
        }

        for entry in ["vs_line", "fs_line", "vs_disc", "fs_disc"] {
            assert!(module.entry_points.iter().any(|e| e.name == entry), "missing {entry}");
        }
    }

    #[test]
    fn test_instance_layouts_match_attributes() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 16);
        assert_eq!(std::mem::size_of::<LineInstance>(), 32);
        assert_eq!(std::mem::size_of::<DiscInstance>(), 32);
        assert_eq!(LINE_ATTRIBUTES[2].offset, 16);
        assert_eq!(DISC_ATTRIBUTES[1].offset, 8);
        assert_eq!(DISC_ATTRIBUTES[2].offset, 16);
    }

    #[test]
    fn test_srgb_to_linear_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!(srgb_to_linear(0.5) < 0.5);
    }
}
