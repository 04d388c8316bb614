use bytemuck::{Pod, Zeroable};
use ringtrain_kernel::Track;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct CubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct TrackVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct OverlayVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// Top-left corner of the screen in clip space: x in [-1, -0.5], y in [0.8, 1].
pub(crate) const OVERLAY_MIN: [f32; 2] = [-1.0, 0.8];
pub(crate) const OVERLAY_MAX: [f32; 2] = [-0.5, 1.0];

/// Unit cube centred on the origin. Triangles wind clockwise seen from
/// outside, so back-face culling uses `FrontFace::Cw`.
pub(crate) fn cube_mesh() -> (Vec<CubeVertex>, Vec<u16>) {
    let p = 0.5_f32;
    // Each face: bottom-left, bottom-right, top-right, top-left seen from outside.
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0],  [[-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p]]),
        ([0.0, 0.0, -1.0], [[ p, -p, -p], [-p, -p, -p], [-p,  p, -p], [ p,  p, -p]]),
        ([1.0, 0.0, 0.0],  [[ p, -p,  p], [ p, -p, -p], [ p,  p, -p], [ p,  p,  p]]),
        ([-1.0, 0.0, 0.0], [[-p, -p, -p], [-p, -p,  p], [-p,  p,  p], [-p,  p, -p]]),
        ([0.0, 1.0, 0.0],  [[-p,  p,  p], [ p,  p,  p], [ p,  p, -p], [-p,  p, -p]]),
        ([0.0, -1.0, 0.0], [[-p, -p, -p], [ p, -p, -p], [ p, -p,  p], [-p, -p,  p]]),
    ];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u16;
        for (position, uv) in corners.into_iter().zip(uvs) {
            vertices.push(CubeVertex {
                position,
                normal,
                uv,
            });
        }
        indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
    }
    (vertices, indices)
}

/// Filled disc as a triangle list, fanned from the first rim point.
pub(crate) fn track_mesh(track: &Track) -> Vec<TrackVertex> {
    let rim = track.rim_points();
    let vertex = |i: usize| TrackVertex {
        position: rim[i].to_array(),
        color: track.color,
    };
    let mut verts = Vec::with_capacity(rim.len().saturating_sub(2) * 3);
    for i in 1..rim.len().saturating_sub(1) {
        verts.push(vertex(0));
        verts.push(vertex(i));
        verts.push(vertex(i + 1));
    }
    verts
}

/// Two triangles covering the overlay rectangle. v = 0 is the top row of the
/// image.
pub(crate) fn overlay_quad() -> [OverlayVertex; 6] {
    let [x0, y0] = OVERLAY_MIN;
    let [x1, y1] = OVERLAY_MAX;
    let tl = OverlayVertex {
        position: [x0, y1],
        uv: [0.0, 0.0],
    };
    let tr = OverlayVertex {
        position: [x1, y1],
        uv: [1.0, 0.0],
    };
    let bl = OverlayVertex {
        position: [x0, y0],
        uv: [0.0, 1.0],
    };
    let br = OverlayVertex {
        position: [x1, y0],
        uv: [1.0, 1.0],
    };
    [tl, bl, br, tl, br, tr]
}

/// Per-car colour multiplier. The anchor car (last index) is the warmest.
pub(crate) fn car_tint(index: usize, count: usize) -> [f32; 4] {
    let t = if count > 1 {
        index as f32 / (count - 1) as f32
    } else {
        1.0
    };
    let cold = [0.35, 0.6, 1.0];
    let warm = [1.0, 0.75, 0.3];
    let mix = |a: f32, b: f32| a * (1.0 - t) + b * t;
    [
        mix(cold[0], warm[0]),
        mix(cold[1], warm[1]),
        mix(cold[2], warm[2]),
        1.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn cube_has_six_faces() {
        let (verts, indices) = cube_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < verts.len()));
        for v in &verts {
            assert!(v.position.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn cube_triangles_wind_clockwise_from_outside() {
        let (verts, indices) = cube_mesh();
        for tri in indices.chunks(3) {
            let a = Vec3::from(verts[tri[0] as usize].position);
            let b = Vec3::from(verts[tri[1] as usize].position);
            let c = Vec3::from(verts[tri[2] as usize].position);
            let n = Vec3::from(verts[tri[0] as usize].normal);
            // Counter-clockwise winding would give an outward cross product.
            assert!((b - a).cross(c - a).dot(n) < 0.0);
        }
    }

    #[test]
    fn track_fan_covers_rim() {
        let track = Track::default();
        let verts = track_mesh(&track);
        // 101 rim points, pivot at the first: 99 triangles.
        assert_eq!(verts.len(), 99 * 3);
        for v in &verts {
            assert_eq!(v.position[1], -0.1);
            assert_eq!(v.color, [0.5, 0.5, 0.5, 1.0]);
            let r = (v.position[0].powi(2) + v.position[2].powi(2)).sqrt();
            assert!((r - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn overlay_stays_in_corner() {
        for v in overlay_quad() {
            assert!((-1.0..=-0.5).contains(&v.position[0]));
            assert!((0.8..=1.0).contains(&v.position[1]));
        }
        let top_left = overlay_quad()[0];
        assert_eq!(top_left.position, [-1.0, 1.0]);
        assert_eq!(top_left.uv, [0.0, 0.0]);
    }

    #[test]
    fn tint_runs_cold_to_warm() {
        assert_eq!(car_tint(0, 10), [0.35, 0.6, 1.0, 1.0]);
        assert_eq!(car_tint(9, 10), [1.0, 0.75, 0.3, 1.0]);
        assert_eq!(car_tint(0, 1), car_tint(9, 10));
    }
}
