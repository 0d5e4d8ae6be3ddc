use crate::data_structures::graphics::SurfaceVertex;

// Generates a flat grid of position-only vertices on the y = 0 plane,
// centered on the origin. The wave shader takes world-space positions
// directly (there is no model matrix), so the grid is already in its
// final place.
pub fn create_wave_grid(quads: u32, spacing: f32) -> (Vec<SurfaceVertex>, Vec<u32>) {
    let side = quads + 1;
    let half = quads as f32 * spacing / 2.0;

    let (vertex_count, index_count) = grid_buffer_sizes(quads);
    let mut vertices = Vec::with_capacity(vertex_count);
    let mut indices = Vec::with_capacity(index_count);

    for row in 0..side {
        for col in 0..side {
            vertices.push(SurfaceVertex {
                position: [col as f32 * spacing - half, 0.0, row as f32 * spacing - half],
            });

            // two triangles for the quad whose far corner is this vertex
            if row > 0 && col > 0 {
                let here = row * side + col;
                let left = here - 1;
                let above = here - side;
                let diagonal = above - 1;

                indices.extend([diagonal, left, here, here, above, diagonal]);
            }
        }
    }

    (vertices, indices)
}

// Buffer sizes in usize, quads * quads * 6 can overflow u32
pub fn grid_buffer_sizes(quads: u32) -> (usize, usize) {
    let side = quads as usize + 1;
    (side * side, quads as usize * quads as usize * 6)
}

/// CPU mirror of the displacement the vertex shader applies on the GPU.
/// Useful when the displaced height is needed host-side, e.g. for picking
/// or for placing objects on the surface.
pub fn wave_height(x: f32, z: f32, wave_offset: f32) -> f32 {
    (wave_offset + x + z).sin()
}

#[cfg(test)]
mod tests {
    use std::f32::consts::TAU;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn grid_has_expected_counts() {
        let (vertices, indices) = create_wave_grid(4, 1.0);
        assert_eq!(vertices.len(), 25);
        assert_eq!(indices.len(), 4 * 4 * 6);
    }

    #[test]
    fn grid_indices_are_in_range() {
        let (vertices, indices) = create_wave_grid(7, 0.25);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn grid_is_centered_and_flat() {
        let quads = 6;
        let spacing = 0.5;
        let (vertices, _) = create_wave_grid(quads, spacing);
        let half = quads as f32 * spacing / 2.0;

        for vertex in &vertices {
            let [x, y, z] = vertex.position;
            assert_eq!(y, 0.0);
            assert!((-half..=half).contains(&x));
            assert!((-half..=half).contains(&z));
        }

        assert_eq!(vertices.first().unwrap().position, [-half, 0.0, -half]);
        assert_eq!(vertices.last().unwrap().position, [half, 0.0, half]);
    }

    #[test]
    fn single_quad_grid_covers_both_triangles() {
        let (vertices, indices) = create_wave_grid(1, 2.0);
        assert_eq!(vertices.len(), 4);
        // every corner has to appear in the two triangles
        for corner in 0..4 {
            assert!(indices.contains(&corner));
        }
    }

    #[test]
    fn grid_buffer_sizes_do_not_overflow_for_large_grids() {
        // 30_000 * 30_000 * 6 does not fit in u32
        let quads = 30_000u32;
        let (vertex_count, index_count) = grid_buffer_sizes(quads);
        assert_eq!(vertex_count, 30_001 * 30_001);
        assert_eq!(index_count, 30_000 * 30_000 * 6);
    }

    #[test]
    fn wave_height_matches_shader_formula() {
        assert_relative_eq!(wave_height(0.0, 0.0, 0.0), 0.0);
        assert_relative_eq!(wave_height(1.5, -0.5, 2.0), (2.0f32 + 1.5 - 0.5).sin());
        // displacement is always within one unit of the flat surface
        for step in 0..100 {
            let x = step as f32 * 0.37;
            assert!(wave_height(x, -x * 0.5, 1.3).abs() <= 1.0);
        }
    }

    #[test]
    fn wave_height_is_periodic_in_the_offset() {
        assert_relative_eq!(
            wave_height(0.7, -1.2, 0.9),
            wave_height(0.7, -1.2, 0.9 + TAU),
            epsilon = 1e-5
        );
    }
}
