/// Procedural mesh generation for primitive solids
use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;

use crate::error::GeometryError;

/// Largest vertex count addressable by `u16` indices
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// Default grid resolution for the curved primitives
pub const DEFAULT_RESOLUTION: u32 = 30;

/// Indexed geometry: positions, index-aligned normals, edge pairs and
/// triangles. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<Point3<f32>>,
    normals: Vec<Vector3<f32>>,
    lines: Vec<[u16; 2]>,
    triangles: Vec<[u16; 3]>,
}

impl Mesh {
    /// Build a mesh from raw parts, checking index and normal invariants.
    pub fn from_parts(
        positions: Vec<Point3<f32>>,
        normals: Vec<Vector3<f32>>,
        lines: Vec<[u16; 2]>,
        triangles: Vec<[u16; 3]>,
    ) -> Result<Self, GeometryError> {
        let mesh = Self {
            positions,
            normals,
            lines,
            triangles,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vector3<f32>] {
        &self.normals
    }

    pub fn lines(&self) -> &[[u16; 2]] {
        &self.lines
    }

    pub fn triangles(&self) -> &[[u16; 3]] {
        &self.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Positions as a tightly packed `xyz` stream for buffer upload
    pub fn position_data(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }

    /// Normals as a tightly packed `xyz` stream for buffer upload
    pub fn normal_data(&self) -> Vec<f32> {
        self.normals.iter().flat_map(|n| [n.x, n.y, n.z]).collect()
    }

    pub fn line_indices(&self) -> Vec<u16> {
        self.lines.iter().flatten().copied().collect()
    }

    pub fn triangle_indices(&self) -> Vec<u16> {
        self.triangles.iter().flatten().copied().collect()
    }

    /// Check that every index addresses a vertex and that there is one
    /// normal per position.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.normals.len() != self.positions.len() {
            return Err(GeometryError::NormalCountMismatch {
                positions: self.positions.len(),
                normals: self.normals.len(),
            });
        }

        let vertex_count = self.positions.len();
        let indices = self
            .lines
            .iter()
            .flatten()
            .chain(self.triangles.iter().flatten());
        for &index in indices {
            if index as usize >= vertex_count {
                return Err(GeometryError::IndexOutOfRange {
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }
}

/// The primitive solids the generator knows how to build
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned cube spanning `[-1, 1]` on every axis
    Cube,
    Sphere {
        longitudes: u32,
        latitudes: u32,
        radius: f32,
    },
    /// Cone with its base ring at `z = 0` and its apex at `z = height`
    Cone {
        longitudes: u32,
        latitudes: u32,
        radius: f32,
        height: f32,
    },
}

impl Shape {
    pub fn sphere() -> Self {
        Shape::Sphere {
            longitudes: DEFAULT_RESOLUTION,
            latitudes: DEFAULT_RESOLUTION,
            radius: 1.0,
        }
    }

    pub fn cone() -> Self {
        Shape::Cone {
            longitudes: DEFAULT_RESOLUTION,
            latitudes: DEFAULT_RESOLUTION,
            radius: 1.0,
            height: 1.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::Cube => "cube",
            Shape::Sphere { .. } => "sphere",
            Shape::Cone { .. } => "cone",
        }
    }

    pub fn generate(&self) -> Result<Mesh, GeometryError> {
        match *self {
            Shape::Cube => Ok(cube()),
            Shape::Sphere {
                longitudes,
                latitudes,
                radius,
            } => sphere(longitudes, latitudes, radius),
            Shape::Cone {
                longitudes,
                latitudes,
                radius,
                height,
            } => cone(longitudes, latitudes, radius, height),
        }
    }
}

/// Generate the mesh for `shape`
pub fn generate(shape: &Shape) -> Result<Mesh, GeometryError> {
    shape.generate()
}

/// Corners of each cube face, counter-clockwise seen from outside, with the
/// face normal. Order: front, back, top, bottom, right, left.
const CUBE_FACES: [([[f32; 3]; 4], [f32; 3]); 6] = [
    (
        [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
        [0.0, 0.0, 1.0],
    ),
    (
        [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]],
        [0.0, 0.0, -1.0],
    ),
    (
        [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
        [0.0, 1.0, 0.0],
    ),
    (
        [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
        [0.0, -1.0, 0.0],
    ),
    (
        [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
        [1.0, 0.0, 0.0],
    ),
    (
        [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
        [-1.0, 0.0, 0.0],
    ),
];

/// 24-vertex cube: four vertices per face so every face keeps a flat normal.
pub fn cube() -> Mesh {
    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut lines = Vec::with_capacity(24);
    let mut triangles = Vec::with_capacity(12);

    for (face, (corners, normal)) in CUBE_FACES.iter().enumerate() {
        let base = (face * 4) as u16;
        for corner in corners {
            positions.push(Point3::from(*corner));
            normals.push(Vector3::from(*normal));
        }

        // Face outline
        for k in 0..4 {
            lines.push([base + k, base + (k + 1) % 4]);
        }

        triangles.push([base, base + 1, base + 2]);
        triangles.push([base, base + 2, base + 3]);
    }

    Mesh {
        positions,
        normals,
        lines,
        triangles,
    }
}

/// UV sphere centred on the origin with its poles on the Z axis.
pub fn sphere(longitudes: u32, latitudes: u32, radius: f32) -> Result<Mesh, GeometryError> {
    check_dimension("sphere", "radius", radius)?;

    let du = 2.0 * PI / longitudes.max(1) as f32;
    let dv = PI / latitudes.max(1) as f32;

    parametric_grid("sphere", longitudes, latitudes, |i, j| {
        let u = i as f32 * du;
        let v = j as f32 * dv;
        let direction = Vector3::new(v.sin() * u.cos(), v.sin() * u.sin(), v.cos());
        (Point3::from(direction * radius), direction)
    })
}

/// Cone whose radius shrinks linearly from `radius` at `z = 0` to zero at
/// `z = height`.
///
/// Normals are set equal to the vertex positions. That is not the true
/// slanted surface normal, but it is what the shading has always been tuned
/// against, so it is kept.
pub fn cone(
    longitudes: u32,
    latitudes: u32,
    radius: f32,
    height: f32,
) -> Result<Mesh, GeometryError> {
    check_dimension("cone", "radius", radius)?;
    check_dimension("cone", "height", height)?;

    let du = 2.0 * PI / longitudes.max(1) as f32;
    let dv = 1.0 / latitudes.max(1) as f32;

    parametric_grid("cone", longitudes, latitudes, |i, j| {
        let u = i as f32 * du;
        let v = j as f32 * dv;
        let position = Point3::new(
            (1.0 - v) * radius * u.cos(),
            (1.0 - v) * radius * u.sin(),
            v * height,
        );
        (position, position.coords)
    })
}

fn check_dimension(shape: &'static str, name: &'static str, value: f32) -> Result<(), GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidDimension { shape, name, value })
    }
}

/// Build an `(n + 1) x (m + 1)` vertex grid and stitch every cell into two
/// triangles and two edges (one along each grid direction).
///
/// Vertex `(i, j)` is stored at `i * (m + 1) + j`. Cells are emitted for
/// `i > 0 && j > 0` only, since a cell references its neighbours at
/// `i - 1` and `j - 1`.
fn parametric_grid<F>(
    shape: &'static str,
    longitudes: u32,
    latitudes: u32,
    vertex: F,
) -> Result<Mesh, GeometryError>
where
    F: Fn(u32, u32) -> (Point3<f32>, Vector3<f32>),
{
    if longitudes == 0 || latitudes == 0 {
        return Err(GeometryError::InvalidResolution {
            shape,
            longitudes,
            latitudes,
        });
    }

    // Widened so the largest resolutions cannot overflow before the check
    let count = (u64::from(longitudes) + 1).saturating_mul(u64::from(latitudes) + 1);
    if count > MAX_VERTICES as u64 {
        return Err(GeometryError::TooManyVertices {
            shape,
            count: usize::try_from(count).unwrap_or(usize::MAX),
        });
    }

    let n = longitudes as usize;
    let m = latitudes as usize;
    let count = count as usize;

    let mut positions = Vec::with_capacity(count);
    let mut normals = Vec::with_capacity(count);
    let mut lines = Vec::with_capacity(2 * n * m);
    let mut triangles = Vec::with_capacity(2 * n * m);

    let row = (m + 1) as u16;
    for i in 0..=longitudes {
        for j in 0..=latitudes {
            let (position, normal) = vertex(i, j);
            positions.push(position);
            normals.push(normal);

            if i > 0 && j > 0 {
                let k = (i as usize * (m + 1) + j as usize) as u16;

                lines.push([k - 1, k]);
                lines.push([k - row, k]);

                triangles.push([k, k - 1, k - row]);
                triangles.push([k - 1, k - row - 1, k - row]);
            }
        }
    }

    Ok(Mesh {
        positions,
        normals,
        lines,
        triangles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_well_formed(mesh: &Mesh) {
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.normals().len(), mesh.positions().len());
        assert!(mesh
            .line_indices()
            .iter()
            .chain(mesh.triangle_indices().iter())
            .all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_cube_counts() {
        let mesh = cube();
        assert_well_formed(&mesh);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_indices().len(), 36);
        assert_eq!(mesh.line_indices().len(), 48);
        assert_eq!(mesh.position_data().len(), 72);
        assert_eq!(mesh.normal_data().len(), 72);
    }

    #[test]
    fn test_cube_face_normals() {
        let mesh = cube();
        for face in mesh.normals().chunks(4) {
            let first = face[0];
            assert!(face.iter().all(|n| *n == first));
            assert!((first.norm() - 1.0).abs() < EPS);
            // Axis aligned: exactly one non-zero component
            assert_eq!(first.iter().filter(|c| c.abs() > EPS).count(), 1);
        }
    }

    #[test]
    fn test_cube_faces_wind_outward() {
        let mesh = cube();
        for tri in mesh.triangles() {
            let [a, b, c] = tri.map(|i| mesh.positions()[i as usize]);
            let face_normal = (b - a).cross(&(c - a)).normalize();
            assert!((face_normal - mesh.normals()[tri[0] as usize]).norm() < EPS);
        }
    }

    #[test]
    fn test_sphere_counts() {
        let (n, m) = (12usize, 8usize);
        let mesh = sphere(n as u32, m as u32, 1.0).unwrap();
        assert_well_formed(&mesh);
        assert_eq!(mesh.vertex_count(), (n + 1) * (m + 1));
        assert_eq!(mesh.triangle_indices().len(), 3 * 2 * n * m);
        assert_eq!(mesh.line_indices().len(), 2 * 2 * n * m);
    }

    #[test]
    fn test_sphere_equator_vertex() {
        let mesh = Shape::sphere().generate().unwrap();
        let m = DEFAULT_RESOLUTION as usize;
        // i = 0, j = m / 2
        let p = mesh.positions()[m / 2];
        assert!((p - Point3::new(1.0, 0.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn test_sphere_normals_are_unit_with_radius() {
        let mesh = sphere(6, 6, 2.5).unwrap();
        for (p, n) in mesh.positions().iter().zip(mesh.normals()) {
            assert!((n.norm() - 1.0).abs() < EPS);
            assert!((p.coords.norm() - 2.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_cone_base_and_apex() {
        let (n, m) = (10u32, 5u32);
        let mesh = cone(n, m, 1.0, 2.0).unwrap();
        assert_well_formed(&mesh);

        let row = (m + 1) as usize;
        for i in 0..=n as usize {
            let base = mesh.positions()[i * row];
            assert!(base.z.abs() < EPS);
            assert!((base.coords.xy().norm() - 1.0).abs() < EPS);

            let apex = mesh.positions()[i * row + m as usize];
            assert!((apex.z - 2.0).abs() < EPS);
            assert!(apex.x.abs() < EPS && apex.y.abs() < EPS);
        }
    }

    #[test]
    fn test_cone_normals_match_positions() {
        let mesh = Shape::cone().generate().unwrap();
        for (p, n) in mesh.positions().iter().zip(mesh.normals()) {
            assert_eq!(p.coords, *n);
        }
    }

    #[test]
    fn test_zero_resolution_fails() {
        assert!(matches!(
            sphere(0, 4, 1.0),
            Err(GeometryError::InvalidResolution { shape: "sphere", .. })
        ));
        assert!(matches!(
            cone(4, 0, 1.0, 1.0),
            Err(GeometryError::InvalidResolution { shape: "cone", .. })
        ));
    }

    #[test]
    fn test_bad_dimensions_fail() {
        assert!(matches!(
            sphere(4, 4, 0.0),
            Err(GeometryError::InvalidDimension { name: "radius", .. })
        ));
        assert!(matches!(
            cone(4, 4, 1.0, f32::NAN),
            Err(GeometryError::InvalidDimension { name: "height", .. })
        ));
    }

    #[test]
    fn test_too_many_vertices() {
        assert!(matches!(
            sphere(256, 256, 1.0),
            Err(GeometryError::TooManyVertices { count: 66049, .. })
        ));
        // 255 * 256 = 65280 still fits
        assert!(sphere(254, 255, 1.0).is_ok());
    }

    #[test]
    fn test_huge_resolution_fails_without_overflow() {
        let shape = Shape::Sphere {
            longitudes: u32::MAX,
            latitudes: u32::MAX,
            radius: 1.0,
        };
        assert!(matches!(
            shape.generate(),
            Err(GeometryError::TooManyVertices { shape: "sphere", .. })
        ));
        assert!(matches!(
            cone(u32::MAX, 1, 1.0, 1.0),
            Err(GeometryError::TooManyVertices { count, .. }) if count > MAX_VERTICES
        ));
    }

    #[test]
    fn test_from_parts_rejects_bad_indices() {
        let positions = vec![Point3::origin(); 3];
        let normals = vec![Vector3::z(); 3];
        let err = Mesh::from_parts(positions.clone(), normals.clone(), vec![], vec![[0, 1, 3]])
            .unwrap_err();
        assert_eq!(
            err,
            GeometryError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );

        let err = Mesh::from_parts(positions, vec![Vector3::z(); 2], vec![[0, 1]], vec![])
            .unwrap_err();
        assert!(matches!(err, GeometryError::NormalCountMismatch { .. }));
    }
}
