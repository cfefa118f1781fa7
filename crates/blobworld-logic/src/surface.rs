//! Cube-sphere planet surface.
//!
//! The planet is a cube whose six faces are split into `resolution ×
//! resolution` tiles and then inflated onto a sphere. Tiles are addressed by
//! a dense [`TileId`]; [`TileCoord`] gives the face/x/y view of the same tile.
//! Walking off a face edge lands on the neighbouring face.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// One of the six cube faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    pub fn index(self) -> u32 {
        match self {
            Face::PosX => 0,
            Face::NegX => 1,
            Face::PosY => 2,
            Face::NegY => 3,
            Face::PosZ => 4,
            Face::NegZ => 5,
        }
    }

    pub fn from_index(index: u32) -> Option<Face> {
        Face::ALL.get(index as usize).copied()
    }

    /// Outward normal of the face.
    pub fn normal(self) -> DVec3 {
        match self {
            Face::PosX => DVec3::X,
            Face::NegX => DVec3::NEG_X,
            Face::PosY => DVec3::Y,
            Face::NegY => DVec3::NEG_Y,
            Face::PosZ => DVec3::Z,
            Face::NegZ => DVec3::NEG_Z,
        }
    }

    /// In-face axes `(u, v)`; tile x grows along u, tile y along v.
    pub fn axes(self) -> (DVec3, DVec3) {
        match self {
            Face::PosX => (DVec3::Y, DVec3::Z),
            Face::NegX => (DVec3::Z, DVec3::Y),
            Face::PosY => (DVec3::Z, DVec3::X),
            Face::NegY => (DVec3::X, DVec3::Z),
            Face::PosZ => (DVec3::X, DVec3::Y),
            Face::NegZ => (DVec3::Y, DVec3::X),
        }
    }

    /// Face whose normal is the dominant axis of `p`.
    fn dominant(p: DVec3) -> Face {
        let a = p.abs();
        if a.x >= a.y && a.x >= a.z {
            if p.x >= 0.0 {
                Face::PosX
            } else {
                Face::NegX
            }
        } else if a.y >= a.z {
            if p.y >= 0.0 {
                Face::PosY
            } else {
                Face::NegY
            }
        } else if p.z >= 0.0 {
            Face::PosZ
        } else {
            Face::NegZ
        }
    }
}

/// Dense tile index: `face * res² + y * res + x`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TileId(pub u32);

/// Face/grid view of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub face: Face,
    pub x: u32,
    pub y: u32,
}

/// Terrain class of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    DeepWater,
    ShallowWater,
    Sand,
    Grass,
    Forest,
    Rock,
    Ice,
}

/// Something a blob can look for on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Food,
    Water,
    Air,
}

impl Resource {
    pub fn label(self) -> &'static str {
        match self {
            Resource::Food => "food",
            Resource::Water => "water",
            Resource::Air => "air",
        }
    }
}

impl TileType {
    /// Base ubiquity (0.0..=1.0) of a resource on this terrain.
    pub fn provides(self, resource: Resource) -> f32 {
        match (self, resource) {
            (TileType::DeepWater | TileType::ShallowWater, Resource::Air) => 0.0,
            (_, Resource::Air) => 1.0,

            (TileType::DeepWater, Resource::Water) => 1.0,
            (TileType::ShallowWater, Resource::Water) => 0.9,
            (TileType::Ice, Resource::Water) => 0.3,
            (_, Resource::Water) => 0.0,

            (TileType::Forest, Resource::Food) => 1.0,
            (TileType::Grass, Resource::Food) => 0.6,
            (TileType::ShallowWater, Resource::Food) => 0.2,
            (_, Resource::Food) => 0.0,
        }
    }

    /// Blobs cannot enter deep water.
    pub fn walkable(self) -> bool {
        !matches!(self, TileType::DeepWater)
    }

    /// Classify terrain from a height sample in `-1.0..=1.0` and the absolute
    /// latitude (`0.0` equator, `1.0` pole).
    pub fn classify(height: f64, abs_latitude: f64) -> TileType {
        if abs_latitude > 0.85 && height > -0.1 {
            return TileType::Ice;
        }
        if height < -0.25 {
            TileType::DeepWater
        } else if height < -0.05 {
            TileType::ShallowWater
        } else if height < 0.05 {
            TileType::Sand
        } else if height < 0.3 {
            TileType::Grass
        } else if height < 0.55 {
            TileType::Forest
        } else {
            TileType::Rock
        }
    }
}

/// A single surface tile with its remaining resource stock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub tile_type: TileType,
    /// Remaining food stock, 0.0..=1.0
    pub food: f32,
    /// Remaining water stock, 0.0..=1.0
    pub water: f32,
}

impl Tile {
    pub fn new(tile_type: TileType) -> Self {
        Self {
            tile_type,
            food: 1.0,
            water: 1.0,
        }
    }
}

/// Cube-sphere tile grid covering one planet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surface {
    resolution: u32,
    radius: f64,
    tiles: Vec<Tile>,
}

impl Surface {
    /// Surface with every tile set to `fill`.
    pub fn new(resolution: u32, radius: f64, fill: TileType) -> Self {
        Self::from_fn(resolution, radius, |_, _| fill)
    }

    /// Surface whose tile types come from `f(id, direction)`.
    pub fn from_fn(
        resolution: u32,
        radius: f64,
        mut f: impl FnMut(TileId, DVec3) -> TileType,
    ) -> Self {
        let resolution = resolution.max(1);
        let mut surface = Self {
            resolution,
            radius,
            tiles: Vec::new(),
        };
        let count = 6 * resolution * resolution;
        let tiles = (0..count)
            .map(|i| {
                let id = TileId(i);
                Tile::new(f(id, surface.center_direction(id)))
            })
            .collect();
        surface.tiles = tiles;
        surface
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, id: TileId) -> bool {
        (id.0 as usize) < self.tiles.len()
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0 as usize)
    }

    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id.0 as usize)
    }

    pub fn tile_type(&self, id: TileId) -> Option<TileType> {
        self.tile(id).map(|t| t.tile_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, t)| (TileId(i as u32), t))
    }

    pub fn coord(&self, id: TileId) -> TileCoord {
        let per_face = self.resolution * self.resolution;
        let face = Face::from_index(id.0 / per_face).unwrap_or(Face::NegZ);
        let rem = id.0 % per_face;
        TileCoord {
            face,
            x: rem % self.resolution,
            y: rem / self.resolution,
        }
    }

    /// Tile at a face coordinate. `x` and `y` past the face edge clamp onto
    /// the edge row or column; use [`Surface::checked_id`] to reject them.
    pub fn id(&self, coord: TileCoord) -> TileId {
        let res = self.resolution;
        TileId(coord.face.index() * res * res + coord.y.min(res - 1) * res + coord.x.min(res - 1))
    }

    /// Tile at a face coordinate, `None` when `x` or `y` is off the face.
    pub fn checked_id(&self, coord: TileCoord) -> Option<TileId> {
        if coord.x >= self.resolution || coord.y >= self.resolution {
            return None;
        }
        Some(self.id(coord))
    }

    /// Face-local coordinate (`-1.0..=1.0`) of the centre of grid cell `i`.
    fn cell_center(&self, i: f64) -> f64 {
        (i + 0.5) / self.resolution as f64 * 2.0 - 1.0
    }

    fn cell_index(&self, t: f64) -> u32 {
        let i = ((t + 1.0) * 0.5 * self.resolution as f64).floor();
        i.clamp(0.0, (self.resolution - 1) as f64) as u32
    }

    fn cube_point(face: Face, u: f64, v: f64) -> DVec3 {
        let (ua, va) = face.axes();
        face.normal() + ua * u + va * v
    }

    /// Tile containing a point on (or projected onto) the cube.
    fn tile_at_cube_point(&self, p: DVec3) -> TileId {
        let face = Face::dominant(p);
        let p = p / p.dot(face.normal());
        let (ua, va) = face.axes();
        self.id(TileCoord {
            face,
            x: self.cell_index(p.dot(ua)),
            y: self.cell_index(p.dot(va)),
        })
    }

    /// Unit vector from the planet centre through the tile centre.
    pub fn center_direction(&self, id: TileId) -> DVec3 {
        let c = self.coord(id);
        Self::cube_point(
            c.face,
            self.cell_center(c.x as f64),
            self.cell_center(c.y as f64),
        )
        .normalize()
    }

    /// Planet-local position of the tile centre on the sphere.
    pub fn world_position(&self, id: TileId) -> DVec3 {
        self.center_direction(id) * self.radius
    }

    /// Tile under a direction from the planet centre.
    pub fn tile_at_direction(&self, dir: DVec3) -> TileId {
        if dir.length_squared() == 0.0 {
            return TileId(0);
        }
        self.tile_at_cube_point(dir)
    }

    /// The four grid neighbours (+x, -x, +y, -y), wrapping across cube edges.
    pub fn neighbors(&self, id: TileId) -> [TileId; 4] {
        let c = self.coord(id);
        let res = self.resolution as i64;
        let offsets: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        offsets.map(|(dx, dy)| {
            let nx = c.x as i64 + dx;
            let ny = c.y as i64 + dy;
            if (0..res).contains(&nx) && (0..res).contains(&ny) {
                return self.id(TileCoord {
                    face: c.face,
                    x: nx as u32,
                    y: ny as u32,
                });
            }
            // Overshoot the face and re-project onto the cube.
            let p = Self::cube_point(
                c.face,
                self.cell_center(nx as f64),
                self.cell_center(ny as f64),
            );
            self.tile_at_cube_point(p)
        })
    }

    /// Arc length between two tile centres.
    pub fn great_circle_distance(&self, a: TileId, b: TileId) -> f64 {
        let d = self
            .center_direction(a)
            .dot(self.center_direction(b))
            .clamp(-1.0, 1.0);
        d.acos() * self.radius
    }

    /// Approximate arc length between neighbouring tile centres.
    pub fn tile_spacing(&self) -> f64 {
        self.radius * std::f64::consts::FRAC_PI_2 / self.resolution as f64
    }

    pub fn walkable(&self, id: TileId) -> bool {
        self.tile(id).map(|t| t.tile_type.walkable()).unwrap_or(false)
    }

    /// Current ubiquity of `resource` on a tile: terrain base scaled by stock.
    pub fn ubiquity(&self, id: TileId, resource: Resource) -> f32 {
        let Some(tile) = self.tile(id) else {
            return 0.0;
        };
        let base = tile.tile_type.provides(resource);
        match resource {
            Resource::Air => base,
            Resource::Food => base * tile.food,
            Resource::Water => base * tile.water,
        }
    }

    /// Take up to `amount` of a resource from a tile. Returns what was taken.
    pub fn consume(&mut self, id: TileId, resource: Resource, amount: f32) -> f32 {
        let Some(tile) = self.tile_mut(id) else {
            return 0.0;
        };
        if tile.tile_type.provides(resource) <= 0.0 || amount <= 0.0 {
            return 0.0;
        }
        let stock = match resource {
            Resource::Air => return amount,
            Resource::Food => &mut tile.food,
            Resource::Water => &mut tile.water,
        };
        let taken = amount.min(*stock);
        *stock -= taken;
        taken
    }

    /// Regenerate stock on every tile that can hold it.
    pub fn regrow(&mut self, dt: f32, rate: f32) {
        let delta = dt * rate;
        for tile in &mut self.tiles {
            if tile.tile_type.provides(Resource::Food) > 0.0 {
                tile.food = (tile.food + delta).min(1.0);
            }
            if tile.tile_type.provides(Resource::Water) > 0.0 {
                tile.water = (tile.water + delta).min(1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_coord_roundtrip() {
        let surface = Surface::new(5, 1.0, TileType::Grass);
        assert_eq!(surface.len(), 150);
        for (id, _) in surface.iter() {
            assert_eq!(surface.id(surface.coord(id)), id);
        }
    }

    #[test]
    fn test_off_face_coords() {
        let surface = Surface::new(4, 1.0, TileType::Grass);
        let edge = TileCoord {
            face: Face::PosY,
            x: 3,
            y: 0,
        };
        let past = TileCoord { x: 9, ..edge };

        assert_eq!(surface.checked_id(edge), Some(surface.id(edge)));
        assert_eq!(surface.checked_id(past), None);
        // Unchecked lookup clamps onto the edge column.
        assert_eq!(surface.id(past), surface.id(edge));
    }

    #[test]
    fn test_direction_maps_back_to_tile() {
        let surface = Surface::new(6, 10.0, TileType::Grass);
        for (id, _) in surface.iter() {
            let dir = surface.center_direction(id);
            assert!((dir.length() - 1.0).abs() < 1e-12);
            assert_eq!(surface.tile_at_direction(dir), id);
        }
    }

    #[test]
    fn test_neighbors_are_distinct_and_symmetric() {
        let surface = Surface::new(4, 1.0, TileType::Grass);
        for (id, _) in surface.iter() {
            let n = surface.neighbors(id);
            let unique: HashSet<_> = n.iter().collect();
            assert_eq!(unique.len(), 4, "tile {:?} has duplicate neighbours", id);
            assert!(!n.contains(&id));
            for other in n {
                assert!(
                    surface.neighbors(other).contains(&id),
                    "{:?} -> {:?} is one-way",
                    id,
                    other
                );
            }
        }
    }

    #[test]
    fn test_edge_neighbor_crosses_face() {
        let surface = Surface::new(4, 1.0, TileType::Grass);
        let edge = surface.id(TileCoord {
            face: Face::PosZ,
            x: 3,
            y: 1,
        });
        let across = surface.neighbors(edge)[0];
        assert_eq!(surface.coord(across).face, Face::PosX);
    }

    #[test]
    fn test_consume_depletes_stock() {
        let mut surface = Surface::new(2, 1.0, TileType::Forest);
        let id = TileId(0);
        assert_eq!(surface.consume(id, Resource::Food, 0.4), 0.4);
        assert!((surface.ubiquity(id, Resource::Food) - 0.6).abs() < 1e-6);
        assert!((surface.consume(id, Resource::Food, 5.0) - 0.6).abs() < 1e-6);
        assert_eq!(surface.ubiquity(id, Resource::Food), 0.0);
        // Forest has no water at all.
        assert_eq!(surface.consume(id, Resource::Water, 1.0), 0.0);

        surface.regrow(1.0, 0.25);
        assert!((surface.tile(id).unwrap().food - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_air_is_never_depleted() {
        let mut surface = Surface::new(1, 1.0, TileType::Sand);
        assert_eq!(surface.consume(TileId(0), Resource::Air, 3.0), 3.0);
        assert_eq!(surface.ubiquity(TileId(0), Resource::Air), 1.0);
    }

    #[test]
    fn test_classify() {
        assert_eq!(TileType::classify(-0.8, 0.1), TileType::DeepWater);
        assert_eq!(TileType::classify(0.2, 0.1), TileType::Grass);
        assert_eq!(TileType::classify(0.2, 0.95), TileType::Ice);
        assert_eq!(TileType::classify(0.9, 0.0), TileType::Rock);
    }
}
