//! Resource locating over a planet surface.
//!
//! A bounded breadth-first scan from the blob's tile. Every walkable tile
//! reached within `radius` steps that holds some of the wanted resource is a
//! candidate; candidates are scored by ubiquity discounted by distance.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::surface::{Resource, Surface, TileId};

/// Score discount per step walked.
pub const DISTANCE_PENALTY: f32 = 0.25;

/// Best place found for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSite {
    pub tile: TileId,
    /// Steps from the search origin
    pub steps: u32,
    pub ubiquity: f32,
    pub score: f32,
}

/// Score of a candidate tile.
pub fn site_score(ubiquity: f32, steps: u32) -> f32 {
    ubiquity / (1.0 + DISTANCE_PENALTY * steps as f32)
}

/// Walkable tiles reachable from `origin` within `radius` steps, with their
/// step counts, in BFS order. The origin is always included.
pub fn tiles_within(surface: &Surface, origin: TileId, radius: u32) -> Vec<(TileId, u32)> {
    bfs(surface, origin, radius)
        .into_iter()
        .map(|(tile, steps, _)| (tile, steps))
        .collect()
}

/// Find the best tile for `resource` within `radius` steps of `origin`.
///
/// Ties are broken by fewer steps, then by lower tile id, so results are
/// deterministic for a given surface.
pub fn locate_resource(
    surface: &Surface,
    origin: TileId,
    resource: Resource,
    radius: u32,
) -> Option<ResourceSite> {
    let mut best: Option<ResourceSite> = None;

    for (tile, steps, _) in bfs(surface, origin, radius) {
        let ubiquity = surface.ubiquity(tile, resource);
        if ubiquity <= 0.0 {
            continue;
        }
        let candidate = ResourceSite {
            tile,
            steps,
            ubiquity,
            score: site_score(ubiquity, steps),
        };
        best = match best {
            Some(current) if !better(&candidate, &current) => Some(current),
            _ => Some(candidate),
        };
    }

    best
}

fn better(a: &ResourceSite, b: &ResourceSite) -> bool {
    if a.score != b.score {
        return a.score > b.score;
    }
    if a.steps != b.steps {
        return a.steps < b.steps;
    }
    a.tile < b.tile
}

/// Shortest walkable path from `from` to `to` within `radius` steps.
///
/// The returned path excludes `from` and ends with `to`. Same tile gives an
/// empty path; unreachable gives `None`.
pub fn path_to(surface: &Surface, from: TileId, to: TileId, radius: u32) -> Option<Vec<TileId>> {
    if from == to {
        return Some(Vec::new());
    }

    let visited = bfs(surface, from, radius);
    let came_from: HashMap<TileId, TileId> = visited
        .iter()
        .filter_map(|&(tile, _, parent)| parent.map(|p| (tile, p)))
        .collect();
    if !came_from.contains_key(&to) {
        return None;
    }

    let mut path = vec![to];
    let mut node = to;
    while let Some(&prev) = came_from.get(&node) {
        if prev == from {
            break;
        }
        path.push(prev);
        node = prev;
    }
    path.reverse();
    Some(path)
}

/// BFS over walkable tiles: `(tile, steps, parent)` in visit order.
fn bfs(surface: &Surface, origin: TileId, radius: u32) -> Vec<(TileId, u32, Option<TileId>)> {
    if !surface.contains(origin) {
        return Vec::new();
    }

    let mut visited = Vec::new();
    let mut seen = HashSet::new();
    let mut frontier = VecDeque::new();

    seen.insert(origin);
    frontier.push_back((origin, 0u32, None));

    while let Some((tile, steps, parent)) = frontier.pop_front() {
        visited.push((tile, steps, parent));
        if steps >= radius {
            continue;
        }
        for next in surface.neighbors(tile) {
            if seen.contains(&next) || !surface.walkable(next) {
                continue;
            }
            seen.insert(next);
            frontier.push_back((next, steps + 1, Some(tile)));
        }
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Face, TileCoord, TileType};

    fn sand_world() -> Surface {
        Surface::new(6, 10.0, TileType::Sand)
    }

    fn at(surface: &Surface, x: u32, y: u32) -> TileId {
        surface.id(TileCoord {
            face: Face::PosZ,
            x,
            y,
        })
    }

    #[test]
    fn test_origin_is_candidate() {
        let mut surface = sand_world();
        let origin = at(&surface, 2, 2);
        surface.tile_mut(origin).unwrap().tile_type = TileType::Forest;

        let site = locate_resource(&surface, origin, Resource::Food, 3).unwrap();
        assert_eq!(site.tile, origin);
        assert_eq!(site.steps, 0);
        assert_eq!(site.score, 1.0);
    }

    #[test]
    fn test_prefers_richer_over_nearer_when_score_wins() {
        let mut surface = sand_world();
        let origin = at(&surface, 0, 0);
        let near = at(&surface, 1, 0);
        let far = at(&surface, 2, 0);
        surface.tile_mut(near).unwrap().tile_type = TileType::ShallowWater; // food 0.2
        surface.tile_mut(far).unwrap().tile_type = TileType::Forest; // food 1.0

        let site = locate_resource(&surface, origin, Resource::Food, 4).unwrap();
        assert_eq!(site.tile, far);
        assert_eq!(site.steps, 2);
        assert!((site.score - site_score(1.0, 2)).abs() < 1e-6);
    }

    #[test]
    fn test_ties_prefer_fewer_steps_then_lower_id() {
        let mut surface = sand_world();
        let origin = at(&surface, 2, 2);
        let a = at(&surface, 3, 2);
        let b = at(&surface, 2, 3);
        surface.tile_mut(a).unwrap().tile_type = TileType::Grass;
        surface.tile_mut(b).unwrap().tile_type = TileType::Grass;

        let site = locate_resource(&surface, origin, Resource::Food, 2).unwrap();
        assert_eq!(site.tile, a.min(b));
    }

    #[test]
    fn test_radius_bounds_search() {
        let mut surface = sand_world();
        let origin = at(&surface, 0, 0);
        let far = at(&surface, 4, 0);
        surface.tile_mut(far).unwrap().tile_type = TileType::Forest;

        assert!(locate_resource(&surface, origin, Resource::Food, 3).is_none());
        assert!(locate_resource(&surface, origin, Resource::Food, 4).is_some());
        assert!(locate_resource(&surface, origin, Resource::Food, 0).is_none());
    }

    #[test]
    fn test_deep_water_is_not_walkable() {
        let mut surface = sand_world();
        let origin = at(&surface, 0, 0);
        let lake = at(&surface, 1, 0);
        surface.tile_mut(lake).unwrap().tile_type = TileType::DeepWater;

        // Deep water is not walkable, so the scan never reaches it.
        assert!(locate_resource(&surface, origin, Resource::Water, 2).is_none());

        surface.tile_mut(lake).unwrap().tile_type = TileType::ShallowWater;
        let site = locate_resource(&surface, origin, Resource::Water, 2).unwrap();
        assert_eq!(site.tile, lake);
    }

    #[test]
    fn test_path_to() {
        let surface = sand_world();
        let from = at(&surface, 0, 0);
        let to = at(&surface, 2, 1);
        let path = path_to(&surface, from, to, 5).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(*path.last().unwrap(), to);
        assert!(!path.contains(&from));

        let mut prev = from;
        for step in &path {
            assert!(surface.neighbors(prev).contains(step));
            prev = *step;
        }

        assert_eq!(path_to(&surface, from, from, 0), Some(vec![]));
        assert_eq!(path_to(&surface, from, to, 2), None);
    }

    #[test]
    fn test_tiles_within_counts() {
        let surface = sand_world();
        let origin = at(&surface, 3, 3);
        let ring = tiles_within(&surface, origin, 1);
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], (origin, 0));
    }
}
