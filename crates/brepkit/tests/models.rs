use approx::assert_abs_diff_eq;
use brepkit::basic::{Index, LocalIndex};
use brepkit::geometry::basic_objects::Tetrahedron;
use brepkit::geometry::point::Point3;
use brepkit::mesh::solid_mesh::PolyhedronFacet;
use brepkit::model::brep::BRep;
use brepkit::model::builder::BRepBuilder;
use brepkit::model::helpers::cut::cut_along_internal_surfaces;
use brepkit::model::helpers::mensuration::{block_volume, line_length, surface_area};
use brepkit::model::helpers::radial_sort::surface_radial_sort;
use brepkit::model::helpers::component_mesh_queries::{
    component_mesh_polygon_unique_vertices, component_mesh_polygons,
};
use brepkit::model::vertex_identifier::ComponentMeshVertex;
use uuid::Uuid;

/// A line along z bordered by `angles.len()` triangle surfaces fanned around
/// it.
fn fan_model(angles: &[f64]) -> (BRep, Uuid, Vec<Uuid>) {
    let mut model = BRep::new();
    let mut builder = BRepBuilder::new(&mut model);
    let line = builder.add_line();
    {
        let mut line_builder = builder.line_mesh_builder(line).unwrap();
        line_builder.create_point(Point3::new(0.0, 0.0, 0.0));
        line_builder.create_point(Point3::new(0.0, 0.0, 1.0));
        line_builder.create_edge(0, 1).unwrap();
    }
    let bottom = builder.create_unique_vertex();
    let top = builder.create_unique_vertex();
    let line_component = model.line(line).unwrap().component_id();
    let mut builder = BRepBuilder::new(&mut model);
    builder.set_unique_vertex(ComponentMeshVertex::new(line_component, 0), bottom);
    builder.set_unique_vertex(ComponentMeshVertex::new(line_component, 1), top);

    let mut surfaces = Vec::new();
    for &angle in angles {
        let mut builder = BRepBuilder::new(&mut model);
        let surface = builder.add_surface();
        {
            let mut surface_builder = builder.surface_mesh_builder(surface).unwrap();
            surface_builder.create_point(Point3::new(0.0, 0.0, 0.0));
            surface_builder.create_point(Point3::new(0.0, 0.0, 1.0));
            surface_builder.create_point(Point3::new(angle.cos(), angle.sin(), 0.5));
            surface_builder.create_polygon(&[0, 1, 2]).unwrap();
        }
        builder
            .add_line_surface_boundary_relationship(line, surface)
            .unwrap();
        let surface_component = model.surface(surface).unwrap().component_id();
        let mut builder = BRepBuilder::new(&mut model);
        builder.set_unique_vertex(ComponentMeshVertex::new(surface_component, 0), bottom);
        builder.set_unique_vertex(ComponentMeshVertex::new(surface_component, 1), top);
        let apex = builder.create_unique_vertex();
        builder.set_unique_vertex(ComponentMeshVertex::new(surface_component, 2), apex);
        surfaces.push(surface);
    }
    (model, line, surfaces)
}

#[test]
fn surfaces_sort_radially_around_a_line() {
    let third = 2.0 * std::f64::consts::PI / 3.0;
    // Insert out of angular order on purpose.
    let (model, line, surfaces) = fan_model(&[0.0, 2.0 * third, third]);
    let sorted = surface_radial_sort(&model, line);
    assert_eq!(sorted.nb_surfaces(), 6);

    // Walking `next` visits the three surfaces in angular order, each side
    // paired with its opposite.
    let radial: Vec<Uuid> = (0..3).map(|k| sorted.surfaces[2 * k].surface).collect();
    assert_eq!(radial, vec![surfaces[0], surfaces[2], surfaces[1]]);
    for position in 0..6 {
        assert_eq!(
            sorted.surfaces[sorted.opposite(position)].surface,
            sorted.surfaces[position].surface
        );
    }
    assert_eq!(sorted.next(5), 0);
}

/// A tetrahedral block described only by its four boundary surfaces, one of
/// them deliberately flipped.
#[test]
fn block_volume_from_oriented_boundary() {
    let points = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let mut model = BRep::new();
    let mut builder = BRepBuilder::new(&mut model);
    let block = builder.add_block();
    let uniques = builder.create_unique_vertices(4);

    // One line per tetrahedron edge.
    let edges: [[usize; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];
    let mut lines = Vec::new();
    for [a, b] in edges {
        let mut builder = BRepBuilder::new(&mut model);
        let line = builder.add_line();
        {
            let mut line_builder = builder.line_mesh_builder(line).unwrap();
            line_builder.create_point(points[a]);
            line_builder.create_point(points[b]);
            line_builder.create_edge(0, 1).unwrap();
        }
        let component = model.line(line).unwrap().component_id();
        let mut builder = BRepBuilder::new(&mut model);
        builder.set_unique_vertex(
            ComponentMeshVertex::new(component, 0),
            uniques + a as Index,
        );
        builder.set_unique_vertex(
            ComponentMeshVertex::new(component, 1),
            uniques + b as Index,
        );
        lines.push((line, [a, b]));
    }

    // Outward triangles, except the second one which is flipped.
    let triangles: [[usize; 3]; 4] = [[1, 2, 3], [0, 2, 3], [0, 1, 3], [0, 2, 1]];
    for triangle in &triangles {
        let mut builder = BRepBuilder::new(&mut model);
        let surface = builder.add_surface();
        {
            let mut surface_builder = builder.surface_mesh_builder(surface).unwrap();
            for &vertex in triangle {
                surface_builder.create_point(points[vertex]);
            }
            surface_builder.create_polygon(&[0, 1, 2]).unwrap();
        }
        builder
            .add_surface_block_boundary_relationship(surface, block)
            .unwrap();
        let component = model.surface(surface).unwrap().component_id();
        let mut builder = BRepBuilder::new(&mut model);
        for (slot, &vertex) in triangle.iter().enumerate() {
            builder.set_unique_vertex(
                ComponentMeshVertex::new(component, slot as Index),
                uniques + vertex as Index,
            );
        }
        for &(line, [a, b]) in &lines {
            if triangle.contains(&a) && triangle.contains(&b) {
                builder
                    .add_line_surface_boundary_relationship(line, surface)
                    .unwrap();
            }
        }
    }

    let volume = block_volume(&model, block).unwrap();
    assert_abs_diff_eq!(volume, 1.0 / 6.0, epsilon = 1e-9);
}

#[test]
fn volumetric_blocks_sum_their_polyhedra() {
    let mut model = BRep::new();
    let mut builder = BRepBuilder::new(&mut model);
    let block = builder.add_block();
    {
        let mut mesh_builder = builder.block_mesh_builder(block).unwrap();
        for point in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ] {
            mesh_builder.create_point(point);
        }
        let locals: Vec<Vec<LocalIndex>> = Tetrahedron::FACET_VERTICES
            .iter()
            .map(|facet| facet.iter().map(|&local| local as LocalIndex).collect())
            .collect();
        let facets: Vec<&[LocalIndex]> = locals.iter().map(|facet| facet.as_slice()).collect();
        mesh_builder.create_polyhedron(&[0, 1, 2, 3], &facets).unwrap();
    }
    assert_abs_diff_eq!(block_volume(&model, block).unwrap(), 1.0 / 6.0);
}

#[test]
fn component_queries_find_matching_polygons() {
    let (model, _, surfaces) = fan_model(&[0.0, 1.0]);
    let unique_loop = component_mesh_polygon_unique_vertices(&model, surfaces[0], 0);
    assert_eq!(unique_loop.len(), 3);
    let matches = component_mesh_polygons(&model, &unique_loop);
    // Only the first surface has this exact loop (each fan surface has its
    // own apex).
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[&surfaces[0]], vec![0]);
}

#[test]
fn component_mensurations() {
    let (model, line, surfaces) = fan_model(&[0.0]);
    assert_abs_diff_eq!(line_length(&model, line).unwrap(), 1.0);
    assert!(surface_area(&model, surfaces[0]).unwrap() > 0.0);
}

#[test]
fn cutting_internal_surfaces_disconnects_the_block() {
    let points = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
    ];
    let mut model = BRep::new();
    let mut builder = BRepBuilder::new(&mut model);
    let block = builder.add_block();
    {
        let mut mesh_builder = builder.block_mesh_builder(block).unwrap();
        for point in points {
            mesh_builder.create_point(point);
        }
        let locals: Vec<Vec<LocalIndex>> = Tetrahedron::FACET_VERTICES
            .iter()
            .map(|facet| facet.iter().map(|&local| local as LocalIndex).collect())
            .collect();
        let facets: Vec<&[LocalIndex]> = locals.iter().map(|facet| facet.as_slice()).collect();
        mesh_builder.create_polyhedron(&[0, 1, 2, 3], &facets).unwrap();
        mesh_builder.create_polyhedron(&[4, 1, 3, 2], &facets).unwrap();
        mesh_builder.compute_polyhedron_adjacencies();
    }
    let uniques = builder.create_unique_vertices(5);
    let block_component = model.block(block).unwrap().component_id();
    let mut builder = BRepBuilder::new(&mut model);
    for vertex in 0..5 {
        builder.set_unique_vertex(
            ComponentMeshVertex::new(block_component, vertex),
            uniques + vertex,
        );
    }

    // The internal surface matches the shared facet (1, 2, 3).
    let surface = builder.add_surface();
    {
        let mut surface_builder = builder.surface_mesh_builder(surface).unwrap();
        surface_builder.create_point(points[1]);
        surface_builder.create_point(points[2]);
        surface_builder.create_point(points[3]);
        surface_builder.create_polygon(&[0, 1, 2]).unwrap();
    }
    builder
        .add_surface_block_internal_relationship(surface, block)
        .unwrap();
    let surface_component = model.surface(surface).unwrap().component_id();
    let mut builder = BRepBuilder::new(&mut model);
    for (slot, vertex) in [1_u32, 2, 3].into_iter().enumerate() {
        builder.set_unique_vertex(
            ComponentMeshVertex::new(surface_component, slot as Index),
            uniques + vertex,
        );
    }

    let results = cut_along_internal_surfaces(&mut model).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].1.len(), 3);
    let mesh = model.block(block).unwrap().mesh();
    assert_eq!(mesh.nb_vertices(), 8);
    for facet_id in 0..4 {
        assert!(mesh.is_polyhedron_facet_on_border(PolyhedronFacet::new(0, facet_id)));
    }
    // Both copies of each duplicated vertex share their unique vertex.
    for &(old, new) in &results[0].1 {
        let identifier = model.vertex_identifier();
        assert_eq!(
            identifier.unique_vertex(&ComponentMeshVertex::new(block_component, old)),
            identifier.unique_vertex(&ComponentMeshVertex::new(block_component, new)),
        );
    }
}

#[test]
fn model_round_trips_through_a_directory() {
    let (mut model, line, surfaces) = fan_model(&[0.0, 1.5]);
    let mut builder = BRepBuilder::new(&mut model);
    builder.set_component_name(line, "axis").unwrap();
    let directory = std::env::temp_dir().join(format!("brepkit_model_{}", Uuid::new_v4()));
    brepkit::io::save_brep(&model, &directory).unwrap();
    let reloaded = brepkit::io::load_brep(&directory).unwrap();
    std::fs::remove_dir_all(&directory).unwrap();

    assert_eq!(reloaded.nb_lines(), 1);
    assert_eq!(reloaded.nb_surfaces(), 2);
    assert_eq!(reloaded.line(line).unwrap().name(), "axis");
    assert_eq!(reloaded.line(line).unwrap().mesh().nb_edges(), 1);
    assert_eq!(
        reloaded.relationships().incidences(line).len(),
        model.relationships().incidences(line).len()
    );
    assert_eq!(
        reloaded.vertex_identifier().nb_unique_vertices(),
        model.vertex_identifier().nb_unique_vertices()
    );
    let surface_component = reloaded.surface(surfaces[0]).unwrap().component_id();
    assert_eq!(
        reloaded
            .vertex_identifier()
            .unique_vertex(&ComponentMeshVertex::new(surface_component, 0)),
        0
    );
}

#[test]
fn whole_model_copies_remap_everything() {
    let (source, line, _) = fan_model(&[0.0, 1.0, 2.0]);
    let mut target = BRep::new();
    let mut builder = BRepBuilder::new(&mut target);
    let mapping = builder.copy(&source);
    assert_eq!(target.nb_lines(), 1);
    assert_eq!(target.nb_surfaces(), 3);
    let new_line = mapping.converted(line).unwrap();
    assert!(target.line(new_line).is_some());
    assert_eq!(
        target.relationships().incidences(new_line).len(),
        source.relationships().incidences(line).len()
    );
    assert_eq!(
        target.vertex_identifier().nb_unique_vertices(),
        source.vertex_identifier().nb_unique_vertices()
    );
}
