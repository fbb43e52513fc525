use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::brep::BRep;
use crate::model::component::{
    Block, ComponentCollection, ComponentType, Corner, Line, ModelBoundary, Surface,
};
use crate::model::relationships::Relationships;
use crate::model::section::Section;
use crate::model::vertex_identifier::VertexIdentifier;

/// Current version tag written at the head of every record.
pub const CURRENT_VERSION: u32 = 2;

/// Native file extensions, frozen for binary compatibility with existing
/// corpora.
pub mod extensions {
    pub const POINT_SET2D: &str = "og_pts2d";
    pub const POINT_SET3D: &str = "og_pts3d";
    pub const EDGED_CURVE2D: &str = "og_edc2d";
    pub const EDGED_CURVE3D: &str = "og_edc3d";
    pub const POLYGONAL_SURFACE2D: &str = "og_psf2d";
    pub const POLYGONAL_SURFACE3D: &str = "og_psf3d";
    pub const TRIANGULATED_SURFACE2D: &str = "og_tsf2d";
    pub const TRIANGULATED_SURFACE3D: &str = "og_tsf3d";
    pub const POLYHEDRAL_SOLID3D: &str = "og_pso3d";
    pub const TETRAHEDRAL_SOLID3D: &str = "og_tso3d";
    pub const HYBRID_SOLID3D: &str = "og_hso3d";
    pub const REGULAR_GRID2D: &str = "og_rgd2d";
    pub const REGULAR_GRID3D: &str = "og_rgd3d";
    pub const SECTION: &str = "og_sct";
    pub const BREP: &str = "og_brep";
}

#[derive(Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed index: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("record version {found} is newer than supported version {supported}")]
    VersionTooNew { found: u32, supported: u32 },
    #[error("no migration from version {0}")]
    NoMigration(u32),
    #[error("attribute cannot be persisted: {0}")]
    UnserializableAttribute(#[from] crate::basic::AttributeError),
}

/// Version-tagged envelope around a serialized object.
#[derive(Serialize, Deserialize)]
struct VersionedRecord<T> {
    version: u32,
    data: T,
}

/// Per-version upgrade functions; entry `v` migrates a version-`v` payload to
/// version `v + 1`.
pub struct MigrationTable {
    migrations: BTreeMap<u32, fn(serde_json::Value) -> serde_json::Value>,
}

impl Default for MigrationTable {
    fn default() -> Self {
        let mut migrations = BTreeMap::new();
        // Version 1 carried no attribute properties; they default in.
        migrations.insert(1, migrate_v1_to_v2 as fn(_) -> _);
        Self { migrations }
    }
}

fn migrate_v1_to_v2(value: serde_json::Value) -> serde_json::Value {
    // The data layout is forward-compatible; properties absent from version 1
    // deserialize to their defaults.
    value
}

impl MigrationTable {
    pub fn upgrade(&self, mut payload: serde_json::Value, found: u32) -> Result<serde_json::Value, IoError> {
        if found > CURRENT_VERSION {
            return Err(IoError::VersionTooNew {
                found,
                supported: CURRENT_VERSION,
            });
        }
        let mut version = found;
        while version < CURRENT_VERSION {
            let migration = self
                .migrations
                .get(&version)
                .ok_or(IoError::NoMigration(version))?;
            payload = migration(payload);
            version += 1;
        }
        Ok(payload)
    }
}

/// Writes one object as a version-tagged record.
pub fn write_record<T: Serialize>(writer: impl Write, data: &T) -> Result<(), IoError> {
    let record = VersionedRecord {
        version: CURRENT_VERSION,
        data,
    };
    serde_json::to_writer(writer, &record)?;
    Ok(())
}

/// Reads one version-tagged record, upgrading older versions on the fly.
pub fn read_record<T: DeserializeOwned>(reader: impl Read) -> Result<T, IoError> {
    read_record_with(reader, &MigrationTable::default())
}

pub fn read_record_with<T: DeserializeOwned>(
    reader: impl Read,
    migrations: &MigrationTable,
) -> Result<T, IoError> {
    let record: VersionedRecord<serde_json::Value> = serde_json::from_reader(reader)?;
    let payload = migrations.upgrade(record.data, record.version)?;
    Ok(serde_json::from_value(payload)?)
}

pub fn save_mesh<T: Serialize>(path: &Path, mesh: &T) -> Result<(), IoError> {
    write_record(File::create(path)?, mesh)
}

pub fn load_mesh<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    read_record(File::open(path)?)
}

#[derive(Serialize, Deserialize)]
struct ComponentRecord {
    id: Uuid,
    name: String,
}

#[derive(Serialize, Deserialize)]
struct CollectionRecord {
    id: Uuid,
    name: String,
    component_type: ComponentType,
}

#[derive(Serialize, Deserialize)]
struct ModelIndex {
    corners: Vec<ComponentRecord>,
    lines: Vec<ComponentRecord>,
    surfaces: Vec<ComponentRecord>,
    blocks: Vec<ComponentRecord>,
    model_boundaries: Vec<ComponentRecord>,
    collections: Vec<CollectionRecord>,
    relationships: Relationships,
}

fn component_file_name(component_type: ComponentType, id: Uuid, extension: &str) -> String {
    format!("{}_{}.{extension}", component_type.file_token(), id.simple())
}

/// Saves a 3D model as a directory: one mesh file per component, a YAML
/// index for components and relations, and the unique-vertices file.
pub fn save_brep(model: &BRep, directory: &Path) -> Result<(), IoError> {
    std::fs::create_dir_all(directory)?;
    let mut index = ModelIndex {
        corners: Vec::new(),
        lines: Vec::new(),
        surfaces: Vec::new(),
        blocks: Vec::new(),
        model_boundaries: Vec::new(),
        collections: Vec::new(),
        relationships: model.relationships().clone(),
    };
    for corner in model.corners() {
        index.corners.push(ComponentRecord {
            id: corner.id(),
            name: corner.name().to_owned(),
        });
        let file = component_file_name(
            ComponentType::Corner,
            corner.id(),
            extensions::POINT_SET3D,
        );
        save_mesh(&directory.join(file), corner.mesh())?;
    }
    for line in model.lines() {
        index.lines.push(ComponentRecord {
            id: line.id(),
            name: line.name().to_owned(),
        });
        let file =
            component_file_name(ComponentType::Line, line.id(), extensions::EDGED_CURVE3D);
        save_mesh(&directory.join(file), line.mesh())?;
    }
    for surface in model.surfaces() {
        index.surfaces.push(ComponentRecord {
            id: surface.id(),
            name: surface.name().to_owned(),
        });
        let file = component_file_name(
            ComponentType::Surface,
            surface.id(),
            extensions::POLYGONAL_SURFACE3D,
        );
        save_mesh(&directory.join(file), surface.mesh())?;
    }
    for block in model.blocks() {
        index.blocks.push(ComponentRecord {
            id: block.id(),
            name: block.name().to_owned(),
        });
        let file = component_file_name(
            ComponentType::Block,
            block.id(),
            extensions::POLYHEDRAL_SOLID3D,
        );
        save_mesh(&directory.join(file), block.mesh())?;
    }
    for boundary in model.model_boundaries() {
        index.model_boundaries.push(ComponentRecord {
            id: boundary.id(),
            name: boundary.name().to_owned(),
        });
    }
    for id in model.collections.ids() {
        let collection = model.collection(id).expect("listed collection");
        index.collections.push(CollectionRecord {
            id,
            name: collection.name().to_owned(),
            component_type: collection.component_id().component_type(),
        });
    }
    serde_yaml::to_writer(File::create(directory.join("index.yml"))?, &index)?;
    write_record(
        File::create(directory.join("unique_vertices"))?,
        model.vertex_identifier(),
    )?;
    log::debug!("saved model to {}", directory.display());
    Ok(())
}

/// Loads a 3D model saved by [`save_brep`].
pub fn load_brep(directory: &Path) -> Result<BRep, IoError> {
    let index: ModelIndex = serde_yaml::from_reader(File::open(directory.join("index.yml"))?)?;
    let mut model = BRep::new();
    for record in index.corners {
        let mut corner = Corner::new(record.id);
        corner.set_name(record.name);
        let file = component_file_name(
            ComponentType::Corner,
            record.id,
            extensions::POINT_SET3D,
        );
        corner.replace_mesh(load_mesh(&directory.join(file))?);
        model.corners.insert(record.id, corner);
    }
    for record in index.lines {
        let mut line = Line::new(record.id);
        line.set_name(record.name);
        let file =
            component_file_name(ComponentType::Line, record.id, extensions::EDGED_CURVE3D);
        line.replace_mesh(load_mesh(&directory.join(file))?);
        model.lines.insert(record.id, line);
    }
    for record in index.surfaces {
        let mut surface = Surface::new(record.id);
        surface.set_name(record.name);
        let file = component_file_name(
            ComponentType::Surface,
            record.id,
            extensions::POLYGONAL_SURFACE3D,
        );
        surface.replace_mesh(load_mesh(&directory.join(file))?);
        model.surfaces.insert(record.id, surface);
    }
    for record in index.blocks {
        let mut block = Block::new(record.id);
        block.set_name(record.name);
        let file = component_file_name(
            ComponentType::Block,
            record.id,
            extensions::POLYHEDRAL_SOLID3D,
        );
        block.replace_mesh(load_mesh(&directory.join(file))?);
        model.blocks.insert(record.id, block);
    }
    for record in index.model_boundaries {
        let mut boundary = ModelBoundary::new(record.id);
        boundary.set_name(record.name);
        model.model_boundaries.insert(record.id, boundary);
    }
    for record in index.collections {
        let mut collection = ComponentCollection::new(record.id, record.component_type);
        collection.set_name(record.name);
        model.collections.insert(record.id, collection);
    }
    model.relationships = index.relationships;
    let identifier: VertexIdentifier =
        read_record(File::open(directory.join("unique_vertices"))?)?;
    model.vertex_identifier = identifier;
    Ok(model)
}

#[derive(Serialize, Deserialize)]
struct SectionIndex {
    corners: Vec<ComponentRecord>,
    lines: Vec<ComponentRecord>,
    surfaces: Vec<ComponentRecord>,
    model_boundaries: Vec<ComponentRecord>,
    collections: Vec<CollectionRecord>,
    relationships: Relationships,
}

/// Saves a 2D model as a directory, like [`save_brep`].
pub fn save_section(model: &Section, directory: &Path) -> Result<(), IoError> {
    std::fs::create_dir_all(directory)?;
    let mut index = SectionIndex {
        corners: Vec::new(),
        lines: Vec::new(),
        surfaces: Vec::new(),
        model_boundaries: Vec::new(),
        collections: Vec::new(),
        relationships: model.relationships().clone(),
    };
    for corner in model.corners() {
        index.corners.push(ComponentRecord {
            id: corner.id(),
            name: corner.name().to_owned(),
        });
        let file = component_file_name(
            ComponentType::Corner,
            corner.id(),
            extensions::POINT_SET2D,
        );
        save_mesh(&directory.join(file), corner.mesh())?;
    }
    for line in model.lines() {
        index.lines.push(ComponentRecord {
            id: line.id(),
            name: line.name().to_owned(),
        });
        let file =
            component_file_name(ComponentType::Line, line.id(), extensions::EDGED_CURVE2D);
        save_mesh(&directory.join(file), line.mesh())?;
    }
    for surface in model.surfaces() {
        index.surfaces.push(ComponentRecord {
            id: surface.id(),
            name: surface.name().to_owned(),
        });
        let file = component_file_name(
            ComponentType::Surface,
            surface.id(),
            extensions::POLYGONAL_SURFACE2D,
        );
        save_mesh(&directory.join(file), surface.mesh())?;
    }
    for boundary in model.model_boundaries() {
        index.model_boundaries.push(ComponentRecord {
            id: boundary.id(),
            name: boundary.name().to_owned(),
        });
    }
    for id in model.collections.ids() {
        let collection = model.collection(id).expect("listed collection");
        index.collections.push(CollectionRecord {
            id,
            name: collection.name().to_owned(),
            component_type: collection.component_id().component_type(),
        });
    }
    serde_yaml::to_writer(File::create(directory.join("index.yml"))?, &index)?;
    write_record(
        File::create(directory.join("unique_vertices"))?,
        model.vertex_identifier(),
    )?;
    Ok(())
}

/// Loads a 2D model saved by [`save_section`].
pub fn load_section(directory: &Path) -> Result<Section, IoError> {
    let index: SectionIndex = serde_yaml::from_reader(File::open(directory.join("index.yml"))?)?;
    let mut model = Section::new();
    for record in index.corners {
        let mut corner = Corner::new(record.id);
        corner.set_name(record.name);
        let file = component_file_name(
            ComponentType::Corner,
            record.id,
            extensions::POINT_SET2D,
        );
        corner.replace_mesh(load_mesh(&directory.join(file))?);
        model.corners.insert(record.id, corner);
    }
    for record in index.lines {
        let mut line = Line::new(record.id);
        line.set_name(record.name);
        let file =
            component_file_name(ComponentType::Line, record.id, extensions::EDGED_CURVE2D);
        line.replace_mesh(load_mesh(&directory.join(file))?);
        model.lines.insert(record.id, line);
    }
    for record in index.surfaces {
        let mut surface = Surface::new(record.id);
        surface.set_name(record.name);
        let file = component_file_name(
            ComponentType::Surface,
            record.id,
            extensions::POLYGONAL_SURFACE2D,
        );
        surface.replace_mesh(load_mesh(&directory.join(file))?);
        model.surfaces.insert(record.id, surface);
    }
    for record in index.model_boundaries {
        let mut boundary = ModelBoundary::new(record.id);
        boundary.set_name(record.name);
        model.model_boundaries.insert(record.id, boundary);
    }
    for record in index.collections {
        let mut collection = ComponentCollection::new(record.id, record.component_type);
        collection.set_name(record.name);
        model.collections.insert(record.id, collection);
    }
    model.relationships = index.relationships;
    model.vertex_identifier = read_record(File::open(directory.join("unique_vertices"))?)?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point2;
    use crate::mesh::surface_mesh::{SurfaceMesh, SurfaceMeshBuilder};

    #[test]
    fn records_round_trip_through_memory() {
        let mut mesh = SurfaceMesh::<2>::new();
        let mut builder = SurfaceMeshBuilder::new(&mut mesh);
        builder.create_point(Point2::new(0.0, 0.0));
        builder.create_point(Point2::new(1.0, 0.0));
        builder.create_point(Point2::new(0.0, 1.0));
        builder.create_polygon(&[0, 1, 2]).unwrap();

        let mut buffer = Vec::new();
        write_record(&mut buffer, &mesh).unwrap();
        let reloaded: SurfaceMesh<2> = read_record(buffer.as_slice()).unwrap();
        assert_eq!(reloaded.nb_vertices(), 3);
        assert_eq!(reloaded.nb_polygons(), 1);
        assert_eq!(reloaded.polygon_vertices(0), mesh.polygon_vertices(0));
    }

    #[test]
    fn future_versions_are_rejected() {
        let json = format!("{{\"version\":{},\"data\":null}}", CURRENT_VERSION + 1);
        let result: Result<serde_json::Value, _> = read_record(json.as_bytes());
        assert!(matches!(result, Err(IoError::VersionTooNew { .. })));
    }
}
