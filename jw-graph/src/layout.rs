//! Force-directed placement of graph nodes.
//!
//! Classic spring-embedder: every node pair repels with an inverse-square
//! force, every edge pulls its endpoints together like a spring, and a weak
//! centering force keeps the component near the origin. Nodes start on a
//! circle in input order, so two layouts over the same graph are identical.

use std::collections::HashMap;

use log::debug;

use jw_model::GraphData;

const SEED_RADIUS: f64 = 150.0;
const REPULSION: f64 = 8000.0;
const ATTRACTION: f64 = 0.015;
const CENTERING: f64 = 0.01;
const DAMPING: f64 = 0.85;
const MAX_SPEED: f64 = 50.0;
/// Pairs closer than this repel as if at this distance, which bounds the
/// repulsive force between near-coincident nodes.
const MIN_DISTANCE: f64 = 50.0;

/// A position in layout space. The origin is the graph center; units are
/// arbitrary and scaled by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
struct LayoutNode {
    id: i64,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

#[derive(Debug, Clone)]
pub struct ForceLayout {
    nodes: Vec<LayoutNode>,
    index: HashMap<i64, usize>,
    /// Edges resolved to node indices; edges naming unknown nodes are
    /// dropped here and exert no force.
    edges: Vec<(usize, usize)>,
}

impl ForceLayout {
    pub fn new(graph: &GraphData) -> Self {
        let count = graph.nodes.len();
        let mut nodes = Vec::with_capacity(count);
        let mut index = HashMap::with_capacity(count);
        for (i, node) in graph.nodes.iter().enumerate() {
            let angle = (i as f64 / count as f64) * std::f64::consts::TAU;
            nodes.push(LayoutNode {
                id: node.id,
                x: SEED_RADIUS * angle.cos(),
                y: SEED_RADIUS * angle.sin(),
                vx: 0.0,
                vy: 0.0,
            });
            index.insert(node.id, i);
        }

        let mut edges = Vec::with_capacity(graph.links.len());
        for link in &graph.links {
            match (index.get(&link.source), index.get(&link.target)) {
                (Some(&s), Some(&t)) => edges.push((s, t)),
                _ => debug!("edge {} references an unknown node, not simulated", link.id),
            }
        }

        ForceLayout { nodes, index, edges }
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) {
        let n = self.nodes.len();
        let mut fx = vec![0.0; n];
        let mut fy = vec![0.0; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = self.nodes[j].x - self.nodes[i].x;
                let dy = self.nodes[j].y - self.nodes[i].y;
                let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let push = REPULSION / (dist * dist);
                fx[i] -= dx / dist * push;
                fy[i] -= dy / dist * push;
                fx[j] += dx / dist * push;
                fy[j] += dy / dist * push;
            }
        }

        for &(s, t) in &self.edges {
            let dx = self.nodes[t].x - self.nodes[s].x;
            let dy = self.nodes[t].y - self.nodes[s].y;
            let dist = (dx * dx + dy * dy).sqrt().max(1.0);
            let pull = dist * ATTRACTION;
            fx[s] += dx / dist * pull;
            fy[s] += dy / dist * pull;
            fx[t] -= dx / dist * pull;
            fy[t] -= dy / dist * pull;
        }

        for (i, node) in self.nodes.iter_mut().enumerate() {
            let gx = -node.x * CENTERING;
            let gy = -node.y * CENTERING;
            node.vx = (node.vx + fx[i] + gx) * DAMPING;
            node.vy = (node.vy + fy[i] + gy) * DAMPING;
            let speed = (node.vx * node.vx + node.vy * node.vy).sqrt();
            if speed > MAX_SPEED {
                node.vx = node.vx / speed * MAX_SPEED;
                node.vy = node.vy / speed * MAX_SPEED;
            }
            node.x += node.vx;
            node.y += node.vy;
        }
    }

    pub fn run(&mut self, iterations: usize) {
        for _ in 0..iterations {
            self.step();
        }
    }

    pub fn position(&self, node_id: i64) -> Option<Point> {
        let &i = self.index.get(&node_id)?;
        let node = &self.nodes[i];
        Some(Point { x: node.x, y: node.y })
    }

    pub fn positions(&self) -> impl Iterator<Item = (i64, Point)> + '_ {
        self.nodes.iter().map(|n| (n.id, Point { x: n.x, y: n.y }))
    }

    /// Axis-aligned bounds of all node positions, for viewport fitting.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = self.nodes.first()?;
        let mut min = Point { x: first.x, y: first.y };
        let mut max = min;
        for node in &self.nodes {
            min.x = min.x.min(node.x);
            min.y = min.y.min(node.y);
            max.x = max.x.max(node.x);
            max.y = max.y.max(node.y);
        }
        Some((min, max))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
