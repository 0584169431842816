//! Force-directed layout for the directors & writers network
//!
//! Links reference nodes by name. The simulation runs to completion up front
//! (link springs, all-pairs repulsion, centering) from a deterministic
//! phyllotaxis start, so the same payload always yields the same picture.

use std::collections::HashMap;

use super::ChartError;
use crate::models::CreatorsNetworkData;

pub const LAYOUT_WIDTH: f64 = 800.0;
pub const LAYOUT_HEIGHT: f64 = 400.0;

const LINK_DISTANCE: f64 = 30.0;
const CHARGE_STRENGTH: f64 = -100.0;
const DISTANCE_MIN_SQ: f64 = 1.0;
const VELOCITY_DECAY: f64 = 0.4;
const ALPHA_MIN: f64 = 0.001;
const TICKS: usize = 300;
const INITIAL_RADIUS: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub name: String,
    pub role: String,
    pub is_director: bool,
    pub movies: Vec<String>,
    pub radius: f32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedLink {
    pub source: usize,
    pub target: usize,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkLayout {
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<PositionedLink>,
}

impl NetworkLayout {
    /// Bounding box of all node circles as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.nodes.iter().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(x0, y0, x1, y1), n| {
                let r = n.radius as f64;
                (x0.min(n.x - r), y0.min(n.y - r), x1.max(n.x + r), y1.max(n.y + r))
            },
        )
    }
}

struct Body {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

struct Spring {
    source: usize,
    target: usize,
    strength: f64,
    bias: f64,
}

pub fn layout_network(data: &CreatorsNetworkData) -> Result<NetworkLayout, ChartError> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(data.nodes.len());
    for (i, node) in data.nodes.iter().enumerate() {
        index.entry(node.name.as_str()).or_insert(i);
    }

    let resolve = |name: &str| -> Result<usize, ChartError> {
        index.get(name).copied().ok_or_else(|| ChartError::UnknownNode(name.to_string()))
    };

    let mut links = Vec::with_capacity(data.links.len());
    for link in &data.links {
        links.push(PositionedLink {
            source: resolve(&link.source)?,
            target: resolve(&link.target)?,
            width: (link.movies.len() as f32).sqrt(),
        });
    }

    let bodies = simulate(data.nodes.len(), &links);

    let nodes = data
        .nodes
        .iter()
        .zip(bodies)
        .map(|(node, body)| PositionedNode {
            name: node.name.clone(),
            role: node.role.clone(),
            is_director: node.is_director(),
            movies: node.movies.clone(),
            radius: 5.0 + node.movies.len() as f32,
            x: body.x,
            y: body.y,
        })
        .collect();

    Ok(NetworkLayout { nodes, links })
}

fn simulate(count: usize, links: &[PositionedLink]) -> Vec<Body> {
    let golden_angle = std::f64::consts::PI * (3.0 - 5f64.sqrt());
    let mut bodies: Vec<Body> = (0..count)
        .map(|i| {
            let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
            let angle = i as f64 * golden_angle;
            Body { x: radius * angle.cos(), y: radius * angle.sin(), vx: 0.0, vy: 0.0 }
        })
        .collect();

    let mut degree = vec![0usize; count];
    for link in links {
        degree[link.source] += 1;
        degree[link.target] += 1;
    }
    let springs: Vec<Spring> = links
        .iter()
        .map(|l| {
            let (ds, dt) = (degree[l.source] as f64, degree[l.target] as f64);
            Spring {
                source: l.source,
                target: l.target,
                strength: 1.0 / ds.min(dt),
                bias: ds / (ds + dt),
            }
        })
        .collect();

    let alpha_decay = 1.0 - ALPHA_MIN.powf(1.0 / TICKS as f64);
    let mut alpha = 1.0;
    let (cx, cy) = (LAYOUT_WIDTH / 2.0, LAYOUT_HEIGHT / 2.0);

    while alpha >= ALPHA_MIN && count > 0 {
        alpha += (0.0 - alpha) * alpha_decay;

        for spring in &springs {
            if spring.source == spring.target {
                continue;
            }
            let (s, t) = (&bodies[spring.source], &bodies[spring.target]);
            let mut dx = t.x + t.vx - s.x - s.vx;
            let mut dy = t.y + t.vy - s.y - s.vy;
            if dx == 0.0 && dy == 0.0 {
                dx = 1e-6;
                dy = 1e-6;
            }
            let len = (dx * dx + dy * dy).sqrt();
            let pull = (len - LINK_DISTANCE) / len * alpha * spring.strength;
            dx *= pull;
            dy *= pull;
            bodies[spring.target].vx -= dx * spring.bias;
            bodies[spring.target].vy -= dy * spring.bias;
            bodies[spring.source].vx += dx * (1.0 - spring.bias);
            bodies[spring.source].vy += dy * (1.0 - spring.bias);
        }

        for i in 0..count {
            let (mut fx, mut fy) = (0.0, 0.0);
            for j in 0..count {
                if i == j {
                    continue;
                }
                let dx = bodies[j].x - bodies[i].x;
                let dy = bodies[j].y - bodies[i].y;
                let mut dist_sq = dx * dx + dy * dy;
                if dist_sq == 0.0 {
                    continue;
                }
                if dist_sq < DISTANCE_MIN_SQ {
                    dist_sq = (DISTANCE_MIN_SQ * dist_sq).sqrt();
                }
                let w = CHARGE_STRENGTH * alpha / dist_sq;
                fx += dx * w;
                fy += dy * w;
            }
            bodies[i].vx += fx;
            bodies[i].vy += fy;
        }

        let n = count as f64;
        let mean_x = bodies.iter().map(|b| b.x).sum::<f64>() / n - cx;
        let mean_y = bodies.iter().map(|b| b.y).sum::<f64>() / n - cy;
        for body in &mut bodies {
            body.x -= mean_x;
            body.y -= mean_y;
        }

        for body in &mut bodies {
            body.vx *= 1.0 - VELOCITY_DECAY;
            body.vy *= 1.0 - VELOCITY_DECAY;
            body.x += body.vx;
            body.y += body.vy;
        }
    }

    bodies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreatorLink, CreatorNode};

    fn node(name: &str, role: &str, movies: &[&str]) -> CreatorNode {
        CreatorNode {
            name: name.to_string(),
            role: role.to_string(),
            movies: movies.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn link(source: &str, target: &str, movies: &[&str]) -> CreatorLink {
        CreatorLink {
            source: source.to_string(),
            target: target.to_string(),
            movies: movies.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn sample() -> CreatorsNetworkData {
        CreatorsNetworkData {
            nodes: vec![
                node("Lana Wachowski", "director", &["The Matrix", "Cloud Atlas"]),
                node("Lilly Wachowski", "writer", &["The Matrix"]),
                node("Michael Mann", "director", &["Heat"]),
            ],
            links: vec![link("Lana Wachowski", "Lilly Wachowski", &["The Matrix", "Bound", "Speed Racer", "V for Vendetta"])],
        }
    }

    fn distance(a: &PositionedNode, b: &PositionedNode) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn test_links_resolve_by_name() {
        let layout = layout_network(&sample()).unwrap();
        assert_eq!(layout.links.len(), 1);
        assert_eq!(layout.links[0].source, 0);
        assert_eq!(layout.links[0].target, 1);
        assert_eq!(layout.links[0].width, 2.0);
    }

    #[test]
    fn test_unknown_link_endpoint_fails() {
        let mut data = sample();
        data.links.push(link("Lana Wachowski", "Nobody", &[]));
        assert_eq!(layout_network(&data), Err(ChartError::UnknownNode("Nobody".to_string())));
    }

    #[test]
    fn test_node_styling() {
        let layout = layout_network(&sample()).unwrap();
        assert_eq!(layout.nodes[0].radius, 7.0);
        assert!(layout.nodes[0].is_director);
        assert!(!layout.nodes[1].is_director);
        assert_eq!(layout.nodes[2].radius, 6.0);
    }

    #[test]
    fn test_layout_is_deterministic_and_finite() {
        let a = layout_network(&sample()).unwrap();
        let b = layout_network(&sample()).unwrap();
        assert_eq!(a, b);
        assert!(a.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
    }

    #[test]
    fn test_linked_nodes_settle_closer() {
        let layout = layout_network(&sample()).unwrap();
        let linked = distance(&layout.nodes[0], &layout.nodes[1]);
        let unlinked = distance(&layout.nodes[0], &layout.nodes[2]);
        assert!(linked < unlinked, "linked {} vs unlinked {}", linked, unlinked);
    }

    #[test]
    fn test_layout_is_centered() {
        let layout = layout_network(&sample()).unwrap();
        let n = layout.nodes.len() as f64;
        let mean_x = layout.nodes.iter().map(|n| n.x).sum::<f64>() / n;
        let mean_y = layout.nodes.iter().map(|n| n.y).sum::<f64>() / n;
        assert!((mean_x - LAYOUT_WIDTH / 2.0).abs() < 1.0);
        assert!((mean_y - LAYOUT_HEIGHT / 2.0).abs() < 1.0);
    }

    #[test]
    fn test_empty_network() {
        let layout = layout_network(&CreatorsNetworkData::default()).unwrap();
        assert!(layout.nodes.is_empty());
    }
}
