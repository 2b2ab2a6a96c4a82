//! Force-directed layout: link, many-body, centering and collision forces
//! integrated with velocity Verlet and a cooling `alpha`, in the style of
//! d3-force.

use serde::Serialize;

const ALPHA_MIN: f64 = 0.001;
const VELOCITY_DECAY: f64 = 0.4;
const INITIAL_RADIUS: f64 = 10.0;
/// Squared distance below which many-body repulsion is softened.
const DISTANCE_MIN2: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForceConfig {
    pub link_distance: f64,
    /// Negative values repel.
    pub charge_strength: f64,
    pub collide_radius: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl ForceConfig {
    pub fn for_canvas(width: f64, height: f64) -> Self {
        Self {
            link_distance: 100.0,
            charge_strength: -300.0,
            collide_radius: 20.0,
            center_x: width / 2.0,
            center_y: height / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Pinned position; overrides integration while set.
    pub fx: Option<f64>,
    pub fy: Option<f64>,
}

/// Deterministic jitter for coincident bodies (linear congruential generator).
#[derive(Debug, Clone)]
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> f64 {
        self.0 = (1_664_525u64.wrapping_mul(self.0).wrapping_add(1_013_904_223)) % 4_294_967_296;
        self.0 as f64 / 4_294_967_296.0
    }

    fn jiggle(&mut self) -> f64 {
        (self.next() - 0.5) * 1e-6
    }
}

#[derive(Debug, Clone)]
struct Link {
    source: usize,
    target: usize,
    strength: f64,
    bias: f64,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    bodies: Vec<Body>,
    links: Vec<Link>,
    config: ForceConfig,
    alpha: f64,
    alpha_target: f64,
    alpha_decay: f64,
    rng: Lcg,
}

impl Simulation {
    /// Place `count` bodies on a phyllotaxis spiral around the centre and
    /// connect them. Links referencing out-of-range indices are ignored.
    pub fn new(count: usize, links: &[(usize, usize)], config: ForceConfig) -> Self {
        let golden = std::f64::consts::PI * (3.0 - 5f64.sqrt());
        let bodies = (0..count)
            .map(|i| {
                let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let angle = i as f64 * golden;
                Body {
                    x: config.center_x + radius * angle.cos(),
                    y: config.center_y + radius * angle.sin(),
                    ..Default::default()
                }
            })
            .collect();

        let mut degree = vec![0usize; count];
        let valid: Vec<_> = links
            .iter()
            .copied()
            .filter(|&(s, t)| s < count && t < count)
            .collect();
        for &(s, t) in &valid {
            degree[s] += 1;
            degree[t] += 1;
        }
        let links = valid
            .into_iter()
            .map(|(source, target)| Link {
                source,
                target,
                strength: 1.0 / degree[source].min(degree[target]).max(1) as f64,
                bias: degree[source] as f64 / (degree[source] + degree[target]) as f64,
            })
            .collect();

        Self {
            bodies,
            links,
            config,
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
            rng: Lcg(1),
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target;
    }

    /// Reheat to full energy.
    pub fn restart(&mut self) {
        self.alpha = 1.0;
    }

    /// Cooled below the threshold with nothing holding it warm.
    pub fn is_settled(&self) -> bool {
        self.alpha < ALPHA_MIN && self.alpha_target < ALPHA_MIN
    }

    pub fn pin(&mut self, index: usize, x: f64, y: f64) {
        if let Some(b) = self.bodies.get_mut(index) {
            b.fx = Some(x);
            b.fy = Some(y);
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(b) = self.bodies.get_mut(index) {
            b.fx = None;
            b.fy = None;
        }
    }

    /// Advance one step. Returns `false` once settled (no work done).
    pub fn tick(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        self.apply_links();
        self.apply_many_body();
        self.apply_center();
        self.apply_collision();

        for b in &mut self.bodies {
            match b.fx {
                Some(fx) => {
                    b.x = fx;
                    b.vx = 0.0;
                }
                None => {
                    b.vx *= 1.0 - VELOCITY_DECAY;
                    b.x += b.vx;
                }
            }
            match b.fy {
                Some(fy) => {
                    b.y = fy;
                    b.vy = 0.0;
                }
                None => {
                    b.vy *= 1.0 - VELOCITY_DECAY;
                    b.y += b.vy;
                }
            }
        }
        true
    }

    /// Tick until settled or `max_ticks` is reached; returns ticks run.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let mut n = 0;
        while n < max_ticks && self.tick() {
            n += 1;
        }
        n
    }

    fn apply_links(&mut self) {
        for i in 0..self.links.len() {
            let Link { source, target, strength, bias } = self.links[i];
            let (s, t) = (self.bodies[source], self.bodies[target]);
            let mut x = t.x + t.vx - s.x - s.vx;
            let mut y = t.y + t.vy - s.y - s.vy;
            if x == 0.0 {
                x = self.rng.jiggle();
            }
            if y == 0.0 {
                y = self.rng.jiggle();
            }
            let len = (x * x + y * y).sqrt();
            let l = (len - self.config.link_distance) / len * self.alpha * strength;
            x *= l;
            y *= l;
            self.bodies[target].vx -= x * bias;
            self.bodies[target].vy -= y * bias;
            self.bodies[source].vx += x * (1.0 - bias);
            self.bodies[source].vy += y * (1.0 - bias);
        }
    }

    fn apply_many_body(&mut self) {
        let n = self.bodies.len();
        let strength = self.config.charge_strength * self.alpha;
        for i in 0..n {
            let (mut dvx, mut dvy) = (0.0, 0.0);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut dx = self.bodies[j].x - self.bodies[i].x;
                let mut dy = self.bodies[j].y - self.bodies[i].y;
                if dx == 0.0 {
                    dx = self.rng.jiggle();
                }
                if dy == 0.0 {
                    dy = self.rng.jiggle();
                }
                let mut l2 = dx * dx + dy * dy;
                if l2 < DISTANCE_MIN2 {
                    l2 = (DISTANCE_MIN2 * l2).sqrt();
                }
                let w = strength / l2;
                dvx += dx * w;
                dvy += dy * w;
            }
            self.bodies[i].vx += dvx;
            self.bodies[i].vy += dvy;
        }
    }

    fn apply_collision(&mut self) {
        let n = self.bodies.len();
        let r = self.config.collide_radius * 2.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (self.bodies[i], self.bodies[j]);
                let mut x = a.x + a.vx - b.x - b.vx;
                let mut y = a.y + a.vy - b.y - b.vy;
                let mut l = x * x + y * y;
                if l >= r * r {
                    continue;
                }
                if x == 0.0 {
                    x = self.rng.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.rng.jiggle();
                    l += y * y;
                }
                let len = l.sqrt();
                let push = (r - len) / len;
                // Equal radii split the correction evenly.
                x *= push * 0.5;
                y *= push * 0.5;
                self.bodies[i].vx += x;
                self.bodies[i].vy += y;
                self.bodies[j].vx -= x;
                self.bodies[j].vy -= y;
            }
        }
    }

    fn apply_center(&mut self) {
        let n = self.bodies.len();
        if n == 0 {
            return;
        }
        let (sx, sy) = self
            .bodies
            .iter()
            .fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
        let dx = sx / n as f64 - self.config.center_x;
        let dy = sy / n as f64 - self.config.center_y;
        for b in &mut self.bodies {
            b.x -= dx;
            b.y -= dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(a: &Body, b: &Body) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn test_simulation_cools_and_settles() {
        let mut sim = Simulation::new(3, &[(0, 1), (1, 2)], ForceConfig::for_canvas(800.0, 600.0));
        let ticks = sim.run(1_000);
        assert!(ticks > 0 && ticks < 1_000, "ran {} ticks", ticks);
        assert!(sim.is_settled());
        assert!(!sim.tick());
    }

    #[test]
    fn test_linked_pair_approaches_link_distance() {
        let mut sim = Simulation::new(2, &[(0, 1)], ForceConfig::for_canvas(800.0, 600.0));
        sim.run(1_000);
        let d = distance(&sim.bodies()[0], &sim.bodies()[1]);
        assert!(d > 60.0 && d < 200.0, "distance {}", d);
    }

    #[test]
    fn test_centroid_stays_near_canvas_centre() {
        let cfg = ForceConfig::for_canvas(1000.0, 600.0);
        let mut sim = Simulation::new(5, &[(0, 1), (0, 2), (3, 4)], cfg);
        sim.run(1_000);
        let n = sim.bodies().len() as f64;
        let cx = sim.bodies().iter().map(|b| b.x).sum::<f64>() / n;
        let cy = sim.bodies().iter().map(|b| b.y).sum::<f64>() / n;
        assert!((cx - 500.0).abs() < 1.0, "cx {}", cx);
        assert!((cy - 300.0).abs() < 1.0, "cy {}", cy);
    }

    #[test]
    fn test_unlinked_bodies_do_not_overlap() {
        let mut sim = Simulation::new(6, &[], ForceConfig::for_canvas(800.0, 600.0));
        sim.run(1_000);
        let bodies = sim.bodies();
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                assert!(distance(&bodies[i], &bodies[j]) > 20.0);
            }
        }
    }

    #[test]
    fn test_alpha_target_keeps_simulation_warm() {
        let mut sim = Simulation::new(2, &[(0, 1)], ForceConfig::for_canvas(800.0, 600.0));
        sim.run(1_000);
        assert!(sim.is_settled());

        sim.set_alpha_target(0.3);
        assert!(sim.tick());
        sim.run(500);
        assert!(!sim.is_settled());
        assert!((sim.alpha() - 0.3).abs() < 0.05);
    }

    #[test]
    fn test_invalid_links_are_dropped() {
        let sim = Simulation::new(2, &[(0, 1), (0, 9)], ForceConfig::for_canvas(100.0, 100.0));
        assert_eq!(sim.links.len(), 1);
    }
}
