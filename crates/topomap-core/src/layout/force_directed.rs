// Spring-embedder simulation.
//
// Every pair of nodes repels with k / d^2, every link pulls toward its
// ideal length like a spring. Velocities are damped each step and nodes
// are kept inside the padded canvas. The run ends after a fixed number of
// steps or as soon as no node moves more than `min_movement`; the result
// is then centered on the canvas. With the default constants a lone link
// ends up roughly 0 to 15 units longer than `ideal_length`.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Canvas, Positions};
use crate::model::Topology;

/// Simulation constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceParams {
    pub iterations: usize,
    pub repulsion: f64,
    pub attraction: f64,
    pub damping: f64,
    pub min_movement: f64,
    pub padding: f64,
    pub ideal_length: f64,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            iterations: 300,
            repulsion: 5000.0,
            attraction: 0.01,
            damping: 0.85,
            min_movement: 0.5,
            padding: 80.0,
            ideal_length: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Body {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    fn clamp(&self, body: &mut Body) {
        if body.x < self.min_x {
            body.x = self.min_x;
            body.vx = 0.0;
        }
        if body.x > self.max_x {
            body.x = self.max_x;
            body.vx = 0.0;
        }
        if body.y < self.min_y {
            body.y = self.min_y;
            body.vy = 0.0;
        }
        if body.y > self.max_y {
            body.y = self.max_y;
            body.vy = 0.0;
        }
    }
}

#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
pub fn positions<R: Rng + ?Sized>(
    topology: &Topology,
    canvas: Canvas,
    params: &ForceParams,
    rng: &mut R,
) -> Positions {
    let keys: Vec<&str> = topology.nodes.keys().map(String::as_str).collect();
    if keys.is_empty() {
        return Positions::new();
    }

    let (cx, cy) = (f64::from(canvas.width) / 2.0, f64::from(canvas.height) / 2.0);
    let bounds = Bounds {
        min_x: params.padding,
        min_y: params.padding,
        max_x: f64::from(canvas.width) - params.padding,
        max_y: f64::from(canvas.height) - params.padding,
    };

    let count = keys.len() as f64;
    let mut bodies: Vec<Body> = (0..keys.len())
        .map(|i| {
            let angle = TAU * i as f64 / count;
            let radius = 100.0 + rng.gen_range(0.0..100.0);
            Body {
                x: cx + radius * angle.cos() + rng.gen_range(-25.0..25.0),
                y: cy + radius * angle.sin() + rng.gen_range(-25.0..25.0),
                vx: 0.0,
                vy: 0.0,
            }
        })
        .collect();

    let index: BTreeMap<&str, usize> = keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();
    let springs: Vec<(usize, usize)> = topology
        .links
        .values()
        .filter_map(|l| Some((*index.get(l.aside.as_str())?, *index.get(l.zside.as_str())?)))
        .collect();

    for _ in 0..params.iterations {
        repel(&mut bodies, params.repulsion);
        for &(a, z) in &springs {
            attract(&mut bodies, a, z, params);
        }

        let mut max_movement = 0.0_f64;
        for body in &mut bodies {
            body.vx *= params.damping;
            body.vy *= params.damping;
            body.x += body.vx;
            body.y += body.vy;
            max_movement = max_movement.max(body.vx.hypot(body.vy));
            bounds.clamp(body);
        }

        if max_movement < params.min_movement {
            break;
        }
    }

    center(&mut bodies, cx, cy, &bounds);

    keys.iter()
        .zip(&bodies)
        .map(|(key, body)| ((*key).to_owned(), (body.x as f32, body.y as f32)))
        .collect()
}

/// Inverse-square push between every pair.
fn repel(bodies: &mut [Body], repulsion: f64) {
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let dx = bodies[j].x - bodies[i].x;
            let dy = bodies[j].y - bodies[i].y;
            let dist = dx.hypot(dy).max(1.0);
            let force = repulsion / (dist * dist);
            let (fx, fy) = (dx / dist * force, dy / dist * force);
            bodies[i].vx -= fx;
            bodies[i].vy -= fy;
            bodies[j].vx += fx;
            bodies[j].vy += fy;
        }
    }
}

/// Hooke pull (or push, below ideal length) along one link.
fn attract(bodies: &mut [Body], a: usize, z: usize, params: &ForceParams) {
    if a == z {
        return;
    }
    let dx = bodies[z].x - bodies[a].x;
    let dy = bodies[z].y - bodies[a].y;
    let dist = dx.hypot(dy).max(1.0);
    let force = params.attraction * (dist - params.ideal_length);
    let (fx, fy) = (dx / dist * force, dy / dist * force);
    bodies[a].vx += fx;
    bodies[a].vy += fy;
    bodies[z].vx -= fx;
    bodies[z].vy -= fy;
}

/// Move the bounding box of all bodies onto the canvas center.
fn center(bodies: &mut [Body], cx: f64, cy: f64, bounds: &Bounds) {
    let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
    let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
    for body in bodies.iter() {
        min_x = min_x.min(body.x);
        min_y = min_y.min(body.y);
        max_x = max_x.max(body.x);
        max_y = max_y.max(body.y);
    }
    let offset_x = cx - (min_x + max_x) / 2.0;
    let offset_y = cy - (min_y + max_y) / 2.0;
    for body in bodies.iter_mut() {
        body.x += offset_x;
        body.y += offset_y;
        bounds.clamp(body);
    }
}
