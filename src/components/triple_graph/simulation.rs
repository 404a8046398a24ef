//! Force-directed layout.
//!
//! Velocity-Verlet style integration with a cooling `alpha`: every tick the
//! link, charge, centering and collision forces adjust body velocities (or,
//! for centering, positions), then free bodies move by their decayed
//! velocity. Pinned bodies sit at their pin and ignore forces, but still push
//! and pull the others.
//!
//! The simulation exclusively owns positions. Readers take a
//! [`LayoutSnapshot`] per frame.

use std::f64::consts::PI;

use log::debug;

use super::config::LayoutConfig;
use super::types::{GraphData, NodeIdx};

/// A position in graph or screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	#[allow(missing_docs)]
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance.
	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}
}

/// Positions as of one simulation version.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutSnapshot {
	/// Bumped whenever any position changes.
	pub version: u64,
	/// One point per node, by node index.
	pub points: Vec<Point>,
}

impl LayoutSnapshot {
	/// Position of node `idx`.
	pub fn get(&self, idx: NodeIdx) -> Option<Point> {
		self.points.get(idx).copied()
	}
}

#[derive(Clone, Debug, Default)]
struct Body {
	x: f64,
	y: f64,
	vx: f64,
	vy: f64,
	fx: Option<f64>,
	fy: Option<f64>,
	radius: f64,
}

#[derive(Clone, Debug)]
struct Link {
	source: NodeIdx,
	target: NodeIdx,
	strength: f64,
	/// Share of the correction applied to the target.
	bias: f64,
}

/// Layout state for one graph: bodies, links and the cooling schedule.
pub struct Simulation {
	bodies: Vec<Body>,
	links: Vec<Link>,
	params: LayoutConfig,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	version: u64,
	energy: f64,
	seed: u32,
}

impl Simulation {
	/// Seeds bodies on a circle around the surface center at full heat.
	pub fn new(graph: &GraphData, width: f64, height: f64, params: &LayoutConfig) -> Self {
		let n = graph.nodes.len();
		let center = (width / 2.0, height / 2.0);
		let ring = 100.0_f64.max(params.collision_radius * n as f64 / PI);

		let bodies = (0..n)
			.map(|i| {
				let (x, y) = if n == 1 {
					center
				} else {
					let angle = (i as f64) * 2.0 * PI / n as f64;
					(center.0 + ring * angle.cos(), center.1 + ring * angle.sin())
				};
				Body {
					x,
					y,
					radius: params.collision_radius,
					..Body::default()
				}
			})
			.collect();

		let pairs: Vec<(NodeIdx, NodeIdx)> =
			graph.links().into_iter().filter(|(s, t)| s != t).collect();
		let mut degree = vec![0usize; n];
		for &(s, t) in &pairs {
			degree[s] += 1;
			degree[t] += 1;
		}
		let links = pairs
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				Link {
					source,
					target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		debug!("simulation initialized with {n} bodies");
		Self {
			bodies,
			links,
			params: params.clone(),
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			version: 0,
			energy: 0.0,
			seed: 1,
		}
	}

	/// Current heat.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Whether the next tick would move anything.
	pub fn is_running(&self) -> bool {
		!self.bodies.is_empty()
			&& (self.alpha >= self.params.alpha_min || self.alpha_target >= self.params.alpha_min)
	}

	/// Advances one step. Returns `false` once cooled; a cooled simulation
	/// leaves positions untouched until reheated.
	pub fn tick(&mut self) -> bool {
		if !self.is_running() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
		let alpha = self.alpha;

		self.apply_links(alpha);
		self.apply_charge(alpha);
		self.apply_centering();
		self.apply_collision();

		let keep = 1.0 - self.params.velocity_decay;
		let mut energy = 0.0;
		for body in &mut self.bodies {
			match body.fx {
				Some(fx) => {
					body.x = fx;
					body.vx = 0.0;
				}
				None => {
					body.vx *= keep;
					body.x += body.vx;
				}
			}
			match body.fy {
				Some(fy) => {
					body.y = fy;
					body.vy = 0.0;
				}
				None => {
					body.vy *= keep;
					body.y += body.vy;
				}
			}
			energy += body.vx * body.vx + body.vy * body.vy;
		}
		self.energy = energy;
		self.version += 1;

		if !self.is_running() {
			debug!("simulation cooled after version {}", self.version);
		}
		true
	}

	/// Ticks until cooled or `max_ticks` is reached; returns ticks taken.
	pub fn run(&mut self, max_ticks: usize) -> usize {
		let mut ticks = 0;
		while ticks < max_ticks && self.tick() {
			ticks += 1;
		}
		ticks
	}

	/// Level alpha eases toward; non-zero keeps the layout warm.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Raises alpha to at least `alpha`.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha);
	}

	/// Point the centering force pulls the layout's mean toward.
	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}

	/// See [`Simulation::set_center`].
	pub fn center(&self) -> Point {
		Point::new(self.center.0, self.center.1)
	}

	/// Holds `idx` at `(x, y)` until [`Simulation::unpin`].
	pub fn pin(&mut self, idx: NodeIdx, x: f64, y: f64) {
		if let Some(body) = self.bodies.get_mut(idx) {
			body.fx = Some(x);
			body.fy = Some(y);
			body.x = x;
			body.y = y;
			body.vx = 0.0;
			body.vy = 0.0;
			self.version += 1;
		}
	}

	/// Releases a pin; the body keeps its position and starts moving freely.
	pub fn unpin(&mut self, idx: NodeIdx) {
		if let Some(body) = self.bodies.get_mut(idx) {
			body.fx = None;
			body.fy = None;
		}
	}

	/// Whether `idx` is held by [`Simulation::pin`].
	pub fn is_pinned(&self, idx: NodeIdx) -> bool {
		self.bodies
			.get(idx)
			.is_some_and(|b| b.fx.is_some() || b.fy.is_some())
	}

	/// Moves a free body without touching its velocity.
	pub fn set_position(&mut self, idx: NodeIdx, x: f64, y: f64) {
		if let Some(body) = self.bodies.get_mut(idx) {
			body.x = x;
			body.y = y;
			self.version += 1;
		}
	}

	/// Current position of `idx`.
	pub fn position(&self, idx: NodeIdx) -> Option<Point> {
		self.bodies.get(idx).map(|b| Point::new(b.x, b.y))
	}

	/// Sum of squared per-body displacement during the last tick.
	pub fn kinetic_energy(&self) -> f64 {
		self.energy
	}

	/// Sum over body pairs of how far they sit inside each other's radius.
	pub fn total_overlap(&self) -> f64 {
		let mut overlap = 0.0;
		for (i, a) in self.bodies.iter().enumerate() {
			for b in &self.bodies[i + 1..] {
				let d = (a.x - b.x).hypot(a.y - b.y);
				overlap += (a.radius + b.radius - d).max(0.0);
			}
		}
		overlap
	}

	/// Copy of all positions, tagged with the current version.
	pub fn snapshot(&self) -> LayoutSnapshot {
		LayoutSnapshot {
			version: self.version,
			points: self.bodies.iter().map(|b| Point::new(b.x, b.y)).collect(),
		}
	}

	/// Number of bodies.
	pub fn len(&self) -> usize {
		self.bodies.len()
	}

	/// True for an empty graph.
	pub fn is_empty(&self) -> bool {
		self.bodies.is_empty()
	}

	fn apply_links(&mut self, alpha: f64) {
		for i in 0..self.links.len() {
			let Link {
				source,
				target,
				strength,
				bias,
			} = self.links[i];
			let (s, t) = (&self.bodies[source], &self.bodies[target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = self.jiggle();
			}
			if y == 0.0 {
				y = self.jiggle();
			}
			let l = x.hypot(y);
			let l = (l - self.params.link_distance) / l * alpha * strength;
			let (x, y) = (x * l, y * l);

			let t = &mut self.bodies[target];
			t.vx -= x * bias;
			t.vy -= y * bias;
			let s = &mut self.bodies[source];
			s.vx += x * (1.0 - bias);
			s.vy += y * (1.0 - bias);
		}
	}

	fn apply_charge(&mut self, alpha: f64) {
		let strength = self.params.charge_strength;
		let n = self.bodies.len();
		for i in 0..n {
			for j in i + 1..n {
				let mut x = self.bodies[j].x - self.bodies[i].x;
				let mut y = self.bodies[j].y - self.bodies[i].y;
				if x == 0.0 {
					x = self.jiggle();
				}
				if y == 0.0 {
					y = self.jiggle();
				}
				let mut l = x * x + y * y;
				if l < 1.0 {
					l = l.sqrt();
				}
				let w = strength * alpha / l;
				self.bodies[i].vx += x * w;
				self.bodies[i].vy += y * w;
				self.bodies[j].vx -= x * w;
				self.bodies[j].vy -= y * w;
			}
		}
	}

	fn apply_centering(&mut self) {
		let n = self.bodies.len() as f64;
		let (sx, sy) = self
			.bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let dx = (sx / n - self.center.0) * self.params.center_strength;
		let dy = (sy / n - self.center.1) * self.params.center_strength;
		for body in &mut self.bodies {
			body.x -= dx;
			body.y -= dy;
		}
	}

	fn apply_collision(&mut self) {
		let n = self.bodies.len();
		for i in 0..n {
			for j in i + 1..n {
				let (a, b) = (&self.bodies[i], &self.bodies[j]);
				let r = a.radius + b.radius;
				let mut x = a.x + a.vx - b.x - b.vx;
				let mut y = a.y + a.vy - b.y - b.vy;
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				let (ri2, rj2) = (a.radius * a.radius, b.radius * b.radius);
				if x == 0.0 {
					x = self.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.jiggle();
					l += y * y;
				}
				let l = l.sqrt();
				let push = (r - l) / l;
				let (x, y) = (x * push, y * push);
				let share = rj2 / (ri2 + rj2);
				self.bodies[i].vx += x * share;
				self.bodies[i].vy += y * share;
				self.bodies[j].vx -= x * (1.0 - share);
				self.bodies[j].vy -= y * (1.0 - share);
			}
		}
	}

	/// Tiny deterministic offset used to separate coincident points.
	fn jiggle(&mut self) -> f64 {
		self.seed = self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		(self.seed as f64 / u32::MAX as f64 - 0.5) * 1e-6
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::triple_graph::builder::build_graph;
	use crate::components::triple_graph::types::{Object, Triple};

	fn star(leaves: usize) -> GraphData {
		let triples: Vec<Triple> = (0..leaves)
			.map(|i| Triple {
				subject: "urn:hub".into(),
				predicate: "urn:links".into(),
				object: Object::Entity(format!("urn:leaf{i}")),
			})
			.collect();
		build_graph(&triples)
	}

	fn params() -> LayoutConfig {
		LayoutConfig::default()
	}

	#[test]
	fn empty_graph_never_runs() {
		let mut sim = Simulation::new(&GraphData::default(), 800.0, 600.0, &params());
		assert!(!sim.is_running());
		assert!(!sim.tick());
		assert_eq!(sim.run(10), 0);
		assert!(sim.snapshot().points.is_empty());
	}

	#[test]
	fn cools_within_a_few_hundred_ticks() {
		let mut sim = Simulation::new(&star(4), 800.0, 600.0, &params());
		let ticks = sim.run(1000);
		assert!(ticks > 100 && ticks < 400, "took {ticks} ticks");
		assert!(!sim.is_running());
		let before = sim.snapshot();
		assert!(!sim.tick());
		assert_eq!(sim.snapshot(), before);
	}

	#[test]
	fn coincident_start_separates_and_settles() {
		let mut sim = Simulation::new(&star(6), 800.0, 600.0, &params());
		for i in 0..sim.len() {
			sim.set_position(i, 400.0, 300.0);
		}
		let initial_overlap = sim.total_overlap();
		assert!(initial_overlap > 0.0);

		let mut early = 0.0;
		for _ in 0..20 {
			sim.tick();
			early += sim.kinetic_energy();
		}
		sim.run(1000);
		assert!(sim.total_overlap() < 1.0, "overlap {}", sim.total_overlap());
		assert!(sim.kinetic_energy() < early / 20.0 * 0.01);
		for p in sim.snapshot().points {
			assert!(p.x.is_finite() && p.y.is_finite());
		}
	}

	#[test]
	fn energy_decays_monotonically_after_warm_up() {
		let triples: Vec<Triple> = (0..9)
			.map(|i| Triple {
				subject: format!("urn:n{i}"),
				predicate: "urn:next".into(),
				object: Object::Entity(format!("urn:n{}", i + 1)),
			})
			.collect();
		let mut sim = Simulation::new(&build_graph(&triples), 800.0, 600.0, &params());
		assert_eq!(sim.len(), 10);

		for _ in 0..3 {
			sim.tick();
		}
		let mut previous = sim.kinetic_energy();
		let mut ticks = 3;
		while sim.tick() {
			ticks += 1;
			let energy = sim.kinetic_energy();
			assert!(
				energy <= previous + 1e-12,
				"energy rose at tick {ticks}: {previous} -> {energy}"
			);
			previous = energy;
		}
	}

	#[test]
	fn linked_nodes_settle_near_link_distance() {
		let mut sim = Simulation::new(&star(1), 800.0, 600.0, &params());
		sim.run(1000);
		let snap = sim.snapshot();
		let d = snap.points[0].distance(snap.points[1]);
		assert!(d > 80.0 && d < 200.0, "distance {d}");
	}

	#[test]
	fn centering_keeps_layout_on_the_viewport_center() {
		let mut sim = Simulation::new(&star(3), 1000.0, 400.0, &params());
		sim.run(1000);
		let snap = sim.snapshot();
		let n = snap.points.len() as f64;
		let cx = snap.points.iter().map(|p| p.x).sum::<f64>() / n;
		let cy = snap.points.iter().map(|p| p.y).sum::<f64>() / n;
		assert!((cx - 500.0).abs() < 1.0 && (cy - 200.0).abs() < 1.0);
	}

	#[test]
	fn singleton_and_self_loop_are_stable() {
		let graph = build_graph(&[Triple {
			subject: "urn:a".into(),
			predicate: "urn:self".into(),
			object: Object::Entity("urn:a".into()),
		}]);
		assert_eq!(graph.edges.len(), 1);
		let mut sim = Simulation::new(&graph, 200.0, 200.0, &params());
		sim.run(1000);
		let p = sim.position(0).expect("one body");
		assert!((p.x - 100.0).abs() < 1e-6 && (p.y - 100.0).abs() < 1e-6);
	}

	#[test]
	fn pinned_body_follows_pin_and_resumes_after_release() {
		let mut sim = Simulation::new(&star(3), 800.0, 600.0, &params());
		sim.set_alpha_target(0.3);
		for step in 0..5 {
			let (x, y) = (600.0 + step as f64 * 10.0, 100.0);
			sim.pin(1, x, y);
			sim.tick();
			assert_eq!(sim.position(1), Some(Point::new(x, y)));
			assert!(sim.is_pinned(1));
		}

		sim.unpin(1);
		sim.set_alpha_target(0.0);
		sim.reheat(0.3);
		assert!(!sim.is_pinned(1));
		let held = sim.position(1);
		sim.tick();
		assert_ne!(sim.position(1), held);
		assert!(sim.is_running());
	}

	#[test]
	fn snapshot_version_advances_per_tick() {
		let mut sim = Simulation::new(&star(2), 800.0, 600.0, &params());
		let v0 = sim.snapshot().version;
		sim.tick();
		sim.tick();
		assert_eq!(sim.snapshot().version, v0 + 2);
	}

	#[test]
	fn recentering_moves_layout_without_restart() {
		let mut sim = Simulation::new(&star(2), 800.0, 600.0, &params());
		sim.run(1000);
		sim.set_center(100.0, 100.0);
		sim.reheat(0.3);
		assert!(sim.is_running());
		sim.run(1000);
		assert_eq!(sim.center(), Point::new(100.0, 100.0));
		let snap = sim.snapshot();
		let cx = snap.points.iter().map(|p| p.x).sum::<f64>() / 3.0;
		assert!((cx - 100.0).abs() < 1.0);
	}
}
