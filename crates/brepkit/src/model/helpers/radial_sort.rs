use uuid::Uuid;

use super::component_mesh_queries::{
    component_mesh_edge_unique_vertices, surface_edges_matching,
};
use crate::geometry::point::{Point3, Vector3};
use crate::mesh::surface_mesh::PolygonEdge;
use crate::model::brep::BRep;

/// One side of one surface meeting a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSide {
    pub surface: Uuid,
    /// `true` on the side the surface polygon faces, `false` behind it.
    pub front: bool,
    /// The surface edge standing on the line.
    pub edge: PolygonEdge,
}

/// The surfaces around a line in radial order.
///
/// Each surface meeting the line occupies two consecutive slots, its front
/// and back side; `next` walks the radial cycle, `opposite` jumps to the
/// other side of the same surface.
#[derive(Clone, Debug, Default)]
pub struct SortedSurfaces {
    pub surfaces: Vec<SurfaceSide>,
}

impl SortedSurfaces {
    pub fn nb_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    pub fn opposite(&self, position: usize) -> usize {
        position ^ 1
    }

    pub fn next(&self, position: usize) -> usize {
        (position + 1) % self.surfaces.len()
    }
}

/// Angular position of `point` around the axis `(origin, direction)`,
/// measured from `reference`.
fn radial_angle(
    point: &Point3,
    origin: &Point3,
    direction: &Vector3,
    reference: &Vector3,
) -> f64 {
    let radial = point - origin;
    let planar = radial - direction * radial.dot(direction);
    let cosine = planar.dot(reference);
    let sine = direction.dot(&reference.cross(&planar));
    let angle = sine.atan2(cosine);
    if angle < 0.0 {
        angle + 2.0 * std::f64::consts::PI
    } else {
        angle
    }
}

/// Sorts the surfaces incident to `line` radially around its first edge.
///
/// For every incident surface, the polygon edges standing on the line are
/// located through the unique vertices; the remaining polygon vertex fixes
/// the angular position of the surface around the line direction.
pub fn surface_radial_sort(model: &BRep, line: Uuid) -> SortedSurfaces {
    let Some(line_component) = model.line(line) else {
        return SortedSurfaces::default();
    };
    let mesh = line_component.mesh();
    if mesh.nb_edges() == 0 {
        return SortedSurfaces::default();
    }
    let [v0, v1] = mesh.edge_vertices(0);
    let origin = *mesh.point(v0);
    let Ok(direction) = mesh.segment(0).normalized_direction() else {
        return SortedSurfaces::default();
    };
    let unique_pair = component_mesh_edge_unique_vertices(model, line, 0);
    let unique_pair = [unique_pair[0], unique_pair[1]];

    struct Candidate {
        surface: Uuid,
        edge: PolygonEdge,
        opposite_point: Point3,
    }
    let mut candidates = Vec::new();
    for incidence in model.relationships().incidences(line) {
        let Some(surface) = model.surface(incidence.id()) else {
            continue;
        };
        for edge in surface_edges_matching(model, incidence.id(), unique_pair) {
            let vertices = surface.mesh().polygon_vertices(edge.polygon);
            let [e0, e1] = surface.mesh().polygon_edge_vertices(edge);
            let opposite = vertices
                .iter()
                .copied()
                .find(|&vertex| vertex != e0 && vertex != e1)
                .unwrap_or(e0);
            candidates.push(Candidate {
                surface: incidence.id(),
                edge,
                opposite_point: *surface.mesh().point(opposite),
            });
        }
    }
    if candidates.is_empty() {
        return SortedSurfaces::default();
    }

    let reference = {
        let radial = candidates[0].opposite_point - origin;
        let planar = radial - direction * radial.dot(&direction);
        if planar.norm() <= crate::geometry::GLOBAL_EPSILON {
            crate::geometry::distance::perpendicular(&direction)
        } else {
            planar.normalize()
        }
    };
    candidates.sort_by(|lhs, rhs| {
        let lhs_angle = radial_angle(&lhs.opposite_point, &origin, &direction, &reference);
        let rhs_angle = radial_angle(&rhs.opposite_point, &origin, &direction, &reference);
        lhs_angle
            .partial_cmp(&rhs_angle)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut sorted = SortedSurfaces::default();
    for candidate in candidates {
        sorted.surfaces.push(SurfaceSide {
            surface: candidate.surface,
            front: true,
            edge: candidate.edge,
        });
        sorted.surfaces.push(SurfaceSide {
            surface: candidate.surface,
            front: false,
            edge: candidate.edge,
        });
    }
    log::debug!(
        "radially sorted {} surface sides around line {line}",
        sorted.nb_surfaces()
    );
    sorted
}
