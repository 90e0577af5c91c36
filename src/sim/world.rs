//! Ball world: owns every ball and runs the per-frame simulation
//!
//! Each frame is split into `simulation_updates` sub-steps. Within a sub-step,
//! balls integrate whatever simulation time they have left, every pair is
//! scanned for overlaps, the worst penetrations are resolved first, and balls
//! that were pushed back get their unused time refunded for the next pass. The
//! pass count is capped: with many simultaneous contacts the system may never
//! settle, and leftover penetration is accepted rather than chased.

use std::collections::HashSet;
use std::sync::Arc;

use glam::Vec3;

use super::ball::{Ball, BallSnapshot, Overlaps};
use super::behavior::{BallBehavior, Passive};
use super::collision::{resolve_dynamic_collision, resolve_static_collision};
use super::ids::{BallId, IdAllocator};
use super::profile::{ObjectDb, ObjectLocation, ObjectProperties};
use super::segment::LineSegment;
use super::terrain::TerrainHeightQuery;
use crate::error::Result;
use crate::settings::PhysicsSettings;
use crate::xz;

/// A ball and the behavior that reacts on its behalf
#[derive(Debug)]
struct Body {
    ball: Ball,
    behavior: Box<dyn BallBehavior>,
}

/// A synthetic static proxy, valid for the current pass only
#[derive(Debug)]
struct FakeBall {
    /// Index of the only body allowed to collide with it
    owner: usize,
    ball: Ball,
}

#[derive(Debug, Clone, Copy)]
enum Partner {
    Body(usize),
    Fake(usize),
}

#[derive(Debug, Clone, Copy)]
struct Contact {
    a: usize,
    b: Partner,
    depth: f32,
}

pub struct BallWorld {
    settings: PhysicsSettings,
    terrain: Box<dyn TerrainHeightQuery>,
    objects: ObjectDb,
    ids: IdAllocator,
    bodies: Vec<Body>,
    /// Boundary walls used by `tick`
    edges: Vec<LineSegment>,

    // Transient, rebuilt every tick
    fake_balls: Vec<FakeBall>,
    colliding_pairs: Vec<(BallId, BallId)>,
    future_colliders: Vec<(BallId, BallId)>,
}

impl BallWorld {
    pub fn new(
        settings: PhysicsSettings,
        terrain: Box<dyn TerrainHeightQuery>,
        objects: ObjectDb,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            terrain,
            objects,
            ids: IdAllocator::new(),
            bodies: Vec::new(),
            edges: Vec::new(),
            fake_balls: Vec::new(),
            colliding_pairs: Vec::new(),
            future_colliders: Vec::new(),
        })
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    pub fn terrain(&self) -> &dyn TerrainHeightQuery {
        self.terrain.as_ref()
    }

    pub fn objects(&self) -> &ObjectDb {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut ObjectDb {
        &mut self.objects
    }

    pub fn set_edges(&mut self, edges: Vec<LineSegment>) {
        self.edges = edges;
    }

    pub fn edges(&self) -> &[LineSegment] {
        &self.edges
    }

    /// Ground height at a world position
    pub fn height(&self, pos: Vec3) -> f32 {
        self.terrain.height(pos)
    }

    // --- Population ---

    /// Add a ball from an explicit profile
    pub fn add(
        &mut self,
        properties: ObjectProperties,
        location: ObjectLocation,
        set_height: bool,
    ) -> Result<BallId> {
        self.insert(Arc::new(properties), location, set_height, Box::new(Passive), None)
    }

    /// Add a ball from the object database, at `location` or the stored default
    pub fn add_from_db(
        &mut self,
        oid: i32,
        location: Option<ObjectLocation>,
        set_height: bool,
    ) -> Result<BallId> {
        let (profile, default_location) = self.objects.get(oid)?;
        let (profile, location) = (profile.clone(), location.unwrap_or(*default_location));
        self.insert(profile, location, set_height, Box::new(Passive), None)
    }

    /// Add a ball driven by a custom behavior
    pub fn add_with_behavior(
        &mut self,
        properties: ObjectProperties,
        location: ObjectLocation,
        set_height: bool,
        behavior: Box<dyn BallBehavior>,
    ) -> Result<BallId> {
        self.insert(Arc::new(properties), location, set_height, behavior, None)
    }

    /// Add a ball with a reserved id
    pub fn add_with_id(
        &mut self,
        id: u32,
        properties: ObjectProperties,
        location: ObjectLocation,
        set_height: bool,
    ) -> Result<BallId> {
        self.insert(Arc::new(properties), location, set_height, Box::new(Passive), Some(id))
    }

    fn insert(
        &mut self,
        profile: Arc<ObjectProperties>,
        mut location: ObjectLocation,
        set_height: bool,
        behavior: Box<dyn BallBehavior>,
        override_id: Option<u32>,
    ) -> Result<BallId> {
        profile.validate()?;
        if set_height {
            location.position.y = self.terrain.height(location.position);
        }
        let id = self.ids.allocate(override_id)?;
        let mut ball = Ball::new(id, profile, &location)?;
        ball.apply_settings(&self.settings);
        log::debug!(
            "Added {} '{}' at {:?}{}",
            id,
            ball.class_name(),
            ball.position(),
            if ball.is_static() { " (static)" } else { "" }
        );
        self.bodies.push(Body { ball, behavior });
        Ok(id)
    }

    /// Remove a ball, returning it
    pub fn remove(&mut self, id: BallId) -> Option<Ball> {
        let idx = self.index_of(id)?;
        self.ids.release(id);
        Some(self.bodies.remove(idx).ball)
    }

    fn index_of(&self, id: BallId) -> Option<usize> {
        self.bodies.iter().position(|b| b.ball.id == id)
    }

    // --- Access ---

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.bodies.iter().find(|b| b.ball.id == id).map(|b| &b.ball)
    }

    pub fn ball_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.bodies.iter_mut().find(|b| b.ball.id == id).map(|b| &mut b.ball)
    }

    pub fn balls(&self) -> impl Iterator<Item = &Ball> {
        self.bodies.iter().map(|b| &b.ball)
    }

    /// Downcast a ball's behavior, e.g. to steer a `Vehicle`
    pub fn behavior_mut<T: BallBehavior + 'static>(&mut self, id: BallId) -> Option<&mut T> {
        self.bodies
            .iter_mut()
            .find(|b| b.ball.id == id)
            .and_then(|b| b.behavior.as_any_mut().downcast_mut::<T>())
    }

    pub fn behavior<T: BallBehavior + 'static>(&self, id: BallId) -> Option<&T> {
        self.bodies
            .iter()
            .find(|b| b.ball.id == id)
            .and_then(|b| b.behavior.as_any().downcast_ref::<T>())
    }

    /// Pairs that collided during the last tick (fake partners report `BallId::FAKE`)
    pub fn colliding_pairs(&self) -> &[(BallId, BallId)] {
        &self.colliding_pairs
    }

    /// Pairs whose outer radii overlapped during the last tick
    pub fn future_colliders(&self) -> &[(BallId, BallId)] {
        &self.future_colliders
    }

    /// Render-ready state of every ball
    pub fn snapshot(&self) -> Vec<BallSnapshot> {
        self.balls().map(BallSnapshot::from).collect()
    }

    // --- Simulation ---

    /// Advance one frame against the world's own edges
    pub fn tick(&mut self, elapsed: f32) -> usize {
        let edges = std::mem::take(&mut self.edges);
        let count = self.process_collisions(&edges, elapsed);
        self.edges = edges;
        count
    }

    /// Run one frame of simulation against `edges`. Returns the number of hard
    /// collisions resolved.
    pub fn process_collisions(&mut self, edges: &[LineSegment], elapsed: f32) -> usize {
        self.colliding_pairs.clear();
        self.future_colliders.clear();

        if !(elapsed > 0.0 && elapsed.is_finite()) {
            log::warn!("Ignoring frame with elapsed time {}", elapsed);
            return 0;
        }

        let updates = self.settings.simulation_updates.max(1);
        let max_steps = self.settings.max_simulation_steps.max(1);
        let sim_elapsed = elapsed / updates as f32;
        let mut future_seen: HashSet<(BallId, BallId)> = HashSet::new();
        let mut resolved = 0;

        for _ in 0..updates {
            for body in &mut self.bodies {
                let ball = &mut body.ball;
                if ball.is_static() {
                    ball.animate(sim_elapsed);
                    ball.sim_time_remaining = 0.0;
                } else if ball.disabled {
                    ball.sim_time_remaining = 0.0;
                } else {
                    ball.sim_time_remaining = sim_elapsed;
                }
            }

            let mut pending = 0;
            for _ in 0..max_steps {
                self.fake_balls.clear();
                self.integrate();
                self.build_edge_proxies(edges);

                let contacts = self.scan(&mut future_seen);
                pending = contacts.len();
                if contacts.is_empty() {
                    for body in &mut self.bodies {
                        body.ball.sim_time_remaining = 0.0;
                    }
                    break;
                }

                resolved += self.resolve(contacts, sim_elapsed);
                pending = 0;
                self.refund_time();

                let stable = self.settings.stable;
                if self.bodies.iter().all(|b| b.ball.sim_time_remaining <= stable) {
                    break;
                }
            }
            self.fake_balls.clear();

            if pending > 0 {
                log::trace!("Sub-step ended with {} unresolved contacts", pending);
            }
        }

        log::trace!("Tick resolved {} collisions", resolved);
        resolved
    }

    /// Integrate every enabled dynamic ball by its remaining sub-step time
    fn integrate(&mut self) {
        let stable = self.settings.stable;
        for (idx, body) in self.bodies.iter_mut().enumerate() {
            let ball = &mut body.ball;
            ball.orig_position = ball.position;
            ball.step_speed = 0.0;
            if ball.is_static() || ball.disabled {
                continue;
            }
            let dt = ball.sim_time_remaining;
            if dt <= stable {
                continue;
            }

            body.behavior.before_process(ball, dt);
            if let Some(proxy) = ball.process(self.terrain.as_ref(), &self.settings, dt) {
                self.fake_balls.push(FakeBall { owner: idx, ball: proxy });
            }
            ball.step_speed = xz(ball.position - ball.orig_position).length() / dt;
        }
    }

    /// Turn nearby boundary edges into fake balls at the closest point
    fn build_edge_proxies(&mut self, edges: &[LineSegment]) {
        for (idx, body) in self.bodies.iter().enumerate() {
            let ball = &body.ball;
            if ball.is_static() || ball.disabled {
                continue;
            }
            let center = xz(ball.position);
            for edge in edges {
                let closest = edge.closest_point(center);
                if center.distance(closest) <= ball.radius() + edge.radius {
                    let at = Vec3::new(closest.x, ball.position.y, closest.y);
                    self.fake_balls.push(FakeBall {
                        owner: idx,
                        ball: ball.make_collision_ball(edge.radius, at),
                    });
                }
            }
        }
    }

    /// Pairwise scan. Hard overlaps are returned worst-first; outer overlaps
    /// fire `on_future_collision` once per pair per tick.
    fn scan(&mut self, future_seen: &mut HashSet<(BallId, BallId)>) -> Vec<Contact> {
        let mut contacts = Vec::new();

        for (k, fake) in self.fake_balls.iter().enumerate() {
            let ball = &self.bodies[fake.owner].ball;
            if ball.overlaps(&fake.ball) == Overlaps::Overlaps {
                contacts.push(Contact {
                    a: fake.owner,
                    b: Partner::Fake(k),
                    depth: ball.penetration(&fake.ball),
                });
            }
        }

        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.bodies[i].ball, &self.bodies[j].ball);
                if a.disabled || b.disabled || (a.is_static() && b.is_static()) {
                    continue;
                }
                match a.overlaps(b) {
                    Overlaps::Overlaps => {
                        // keep the dynamic ball first
                        let (a_idx, b_idx) = if a.is_static() { (j, i) } else { (i, j) };
                        contacts.push(Contact {
                            a: a_idx,
                            b: Partner::Body(b_idx),
                            depth: a.penetration(b),
                        });
                    }
                    Overlaps::OverlapsOuter => {
                        let key = (a.id.min(b.id), a.id.max(b.id));
                        if future_seen.insert(key) {
                            self.future_colliders.push(key);
                            self.notify_future(i, j);
                        }
                    }
                    Overlaps::NoOverlaps => {}
                }
            }
        }

        contacts.sort_by(|x, y| y.depth.total_cmp(&x.depth));
        contacts
    }

    fn notify_future(&mut self, i: usize, j: usize) {
        let (first, second) = pair_mut(&mut self.bodies, i, j);
        first.behavior.on_future_collision(&mut first.ball, &second.ball);
        second.behavior.on_future_collision(&mut second.ball, &first.ball);
    }

    /// Resolve contacts in order, skipping any already separated by an earlier one
    fn resolve(&mut self, contacts: Vec<Contact>, dt: f32) -> usize {
        let mut resolved = 0;
        for contact in contacts {
            match contact.b {
                Partner::Fake(k) => {
                    let fake = &self.fake_balls[k].ball;
                    let body = &mut self.bodies[contact.a];
                    if body.ball.overlaps(fake) != Overlaps::Overlaps {
                        continue;
                    }
                    let (_, new_velocity) = resolve_static_collision(&mut body.ball, fake);
                    body.behavior.on_collision(&mut body.ball, fake, new_velocity, dt);
                    self.colliding_pairs.push((body.ball.id, BallId::FAKE));
                }
                Partner::Body(other) => {
                    let (first, second) = pair_mut(&mut self.bodies, contact.a, other);
                    if first.ball.overlaps(&second.ball) != Overlaps::Overlaps {
                        continue;
                    }
                    if second.ball.is_static() {
                        self.process_static_collision(contact.a, other, dt);
                    } else {
                        self.process_dynamic_collision(contact.a, other, dt);
                    }
                }
            }
            resolved += 1;
        }
        resolved
    }

    /// Dynamic ball `a` against static ball `b`; `b` is never touched
    fn process_static_collision(&mut self, a: usize, b: usize, dt: f32) {
        let (ball, target) = pair_mut(&mut self.bodies, a, b);
        let (_, new_velocity) = resolve_static_collision(&mut ball.ball, &target.ball);
        ball.behavior.on_collision(&mut ball.ball, &target.ball, new_velocity, dt);
        self.colliding_pairs.push((ball.ball.id, target.ball.id));
    }

    /// Two dynamic balls exchange momentum along their line of centers
    fn process_dynamic_collision(&mut self, a: usize, b: usize, dt: f32) {
        let (first, second) = pair_mut(&mut self.bodies, a, b);
        let (_, v1, v2) = resolve_dynamic_collision(&mut first.ball, &mut second.ball);
        first.behavior.on_collision(&mut first.ball, &second.ball, v1, dt);
        second.behavior.on_collision(&mut second.ball, &first.ball, v2, dt);
        self.colliding_pairs.push((first.ball.id, second.ball.id));
    }

    /// Charge each ball for the distance it actually kept this pass. Balls
    /// pushed back keep the unused time for the next pass, which integrates it
    /// with the post-collision velocity.
    fn refund_time(&mut self) {
        let stable = self.settings.stable;
        for body in &mut self.bodies {
            let ball = &mut body.ball;
            if ball.step_speed <= stable {
                ball.sim_time_remaining = 0.0;
                continue;
            }
            let kept = xz(ball.position - ball.orig_position).length();
            ball.sim_time_remaining = (ball.sim_time_remaining - kept / ball.step_speed).max(0.0);
        }
    }
}

/// Two distinct mutable elements of a slice
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = items.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhysicsError;
    use crate::sim::behavior::Vehicle;
    use crate::sim::terrain::{FlatTerrain, FnTerrain};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn flat_world() -> BallWorld {
        BallWorld::new(
            PhysicsSettings::default(),
            Box::new(FlatTerrain::new(0.0)),
            ObjectDb::new(),
        )
        .unwrap()
    }

    fn dynamic(radius: f32, mass: f32) -> ObjectProperties {
        ObjectProperties::new("ball", radius, mass)
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = PhysicsSettings {
            max_simulation_steps: 0,
            ..Default::default()
        };
        let world = BallWorld::new(settings, Box::new(FlatTerrain::default()), ObjectDb::new());
        assert!(matches!(world, Err(PhysicsError::InvalidSettings(_))));
    }

    #[test]
    fn test_ids_are_sequential_and_removable() {
        let mut world = flat_world();
        let a = world.add(dynamic(5.0, 1.0), ObjectLocation::default(), false).unwrap();
        let b = world.add(dynamic(5.0, 1.0), ObjectLocation::default(), false).unwrap();
        assert_eq!((a, b), (BallId(0), BallId(1)));
        assert_eq!(world.len(), 2);

        let removed = world.remove(a).unwrap();
        assert_eq!(removed.id(), a);
        assert!(world.ball(a).is_none());
        assert!(world.remove(a).is_none());
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_wall_bounce_against_static_ball() {
        let mut world = flat_world();
        let a = world
            .add(
                dynamic(5.0, 10.0),
                ObjectLocation::moving(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)),
                false,
            )
            .unwrap();
        let b = world
            .add(
                ObjectProperties::fixed("post", 5.0, 10.0),
                ObjectLocation::at(Vec3::new(9.0, 0.0, 0.0)),
                false,
            )
            .unwrap();

        let hits = world.tick(DT);
        assert!(hits >= 1);
        assert!(world.colliding_pairs().contains(&(a, b)));

        let (ball, post) = (world.ball(a).unwrap(), world.ball(b).unwrap());
        assert!((ball.distance(post) - 10.0).abs() < 0.05);
        assert!(ball.velocity().x < 0.0);
        assert_eq!(post.position(), Vec3::new(9.0, 0.0, 0.0));
        assert_eq!(post.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_head_on_equal_masses_exchange_velocities() {
        let mut world = flat_world();
        let mut props = dynamic(5.0, 10.0);
        props.elasticity = 1.0;
        let a = world
            .add(
                props.clone(),
                ObjectLocation::moving(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0)),
                false,
            )
            .unwrap();
        let b = world
            .add(
                props,
                ObjectLocation::moving(Vec3::new(12.0, 0.0, 0.0), Vec3::new(-100.0, 0.0, 0.0)),
                false,
            )
            .unwrap();

        world.tick(DT);
        assert_eq!(world.colliding_pairs(), &[(a, b)]);

        let (va, vb) = (world.ball(a).unwrap().velocity(), world.ball(b).unwrap().velocity());
        assert!(va.x < 0.0);
        assert!(vb.x > 0.0);
        // symmetric setup: momentum stays zero
        assert!((va.x + vb.x).abs() < 1e-2);
        assert!(world.ball(a).unwrap().distance(world.ball(b).unwrap()) >= 10.0 - 1e-2);
    }

    #[test]
    fn test_resting_balls_do_not_drift() {
        let mut world = flat_world();
        let a = world
            .add(dynamic(5.0, 1.0), ObjectLocation::at(Vec3::new(3.0, 0.0, 4.0)), false)
            .unwrap();
        world
            .add(
                ObjectProperties::fixed("tree", 25.0, 10000.0),
                ObjectLocation::at(Vec3::new(200.0, 0.0, 0.0)),
                false,
            )
            .unwrap();

        for _ in 0..600 {
            assert_eq!(world.tick(DT), 0);
        }
        assert_eq!(world.ball(a).unwrap().position(), Vec3::new(3.0, 0.0, 4.0));
        assert!(world.colliding_pairs().is_empty());
    }

    #[test]
    fn test_disabled_ball_is_skipped() {
        let mut world = flat_world();
        let a = world
            .add(
                dynamic(5.0, 1.0),
                ObjectLocation::moving(Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0)),
                false,
            )
            .unwrap();
        world
            .add(
                ObjectProperties::fixed("post", 5.0, 1.0),
                ObjectLocation::at(Vec3::new(4.0, 0.0, 0.0)),
                false,
            )
            .unwrap();
        world.ball_mut(a).unwrap().disable(true);

        for _ in 0..10 {
            assert_eq!(world.tick(DT), 0);
        }
        let ball = world.ball(a).unwrap();
        assert_eq!(ball.position(), Vec3::ZERO);
        assert_eq!(ball.velocity(), Vec3::new(50.0, 0.0, 0.0));
        assert!(world.colliding_pairs().is_empty());
        assert!(world.future_colliders().is_empty());
    }

    #[test]
    fn test_edge_acts_as_wall() {
        let mut world = flat_world();
        let a = world
            .add(
                dynamic(5.0, 1.0),
                ObjectLocation::moving(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0)),
                false,
            )
            .unwrap();
        world.set_edges(vec![LineSegment::new(
            Vec2::new(10.0, -50.0),
            Vec2::new(10.0, 50.0),
            1.0,
        )]);

        let mut hit_wall = false;
        for _ in 0..60 {
            world.tick(DT);
            hit_wall |= world.colliding_pairs().contains(&(a, BallId::FAKE));
            assert!(world.ball(a).unwrap().position().x <= 4.0 + 1e-2);
        }
        assert!(hit_wall);
        assert!(world.ball(a).unwrap().velocity().x < 0.0);
    }

    #[test]
    fn test_terrain_wall_blocks_ball() {
        let terrain = FnTerrain(|p: Vec3| if p.x > 20.0 { 100.0 } else { 0.0 });
        let mut world =
            BallWorld::new(PhysicsSettings::default(), Box::new(terrain), ObjectDb::new()).unwrap();
        let a = world
            .add(
                dynamic(5.0, 1.0),
                ObjectLocation::moving(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0)),
                false,
            )
            .unwrap();

        for _ in 0..60 {
            world.tick(DT);
            let ball = world.ball(a).unwrap();
            assert!(ball.position().x <= 20.0);
            assert_eq!(ball.position().y, 0.0);
        }
        assert!(world.ball(a).unwrap().velocity().x < 0.0);
    }

    #[test]
    fn test_future_collision_fires_once_per_tick() {
        let mut world = flat_world();
        let kart = world
            .add_with_behavior(
                dynamic(5.0, 100.0),
                ObjectLocation::default(),
                false,
                Box::new(Vehicle::default()),
            )
            .unwrap();
        let tree = world
            .add(
                ObjectProperties::fixed("tree", 5.0, 1000.0),
                ObjectLocation::at(Vec3::new(14.0, 0.0, 0.0)),
                false,
            )
            .unwrap();

        world.tick(DT);
        assert_eq!(world.future_colliders(), &[(kart, tree)]);
        assert!(world.colliding_pairs().is_empty());
        assert_eq!(world.behavior::<Vehicle>(kart).unwrap().threats(), 1);

        world.tick(DT);
        assert_eq!(world.behavior::<Vehicle>(kart).unwrap().threats(), 2);
    }

    #[test]
    fn test_vehicle_drives_through_behavior_handle() {
        let mut world = flat_world();
        let kart = world
            .add_with_behavior(
                dynamic(5.0, 100.0),
                ObjectLocation::default(),
                false,
                Box::new(Vehicle::default()),
            )
            .unwrap();
        world.behavior_mut::<Vehicle>(kart).unwrap().accelerate(1.0);
        assert!(world.behavior_mut::<crate::sim::Passive>(kart).is_none());

        for _ in 0..60 {
            world.tick(DT);
        }
        let ball = world.ball(kart).unwrap();
        assert!(ball.position().x > 10.0);
        assert!(ball.speed() <= 400.0 + 1e-3);
        assert!(ball.is_forward());
    }

    #[test]
    fn test_add_from_db() {
        let mut db = ObjectDb::new();
        db.insert(
            1,
            ObjectProperties::fixed("tree", 75.0, 1000.0),
            ObjectLocation::at(Vec3::new(500.0, 0.0, 500.0)),
        )
        .unwrap();
        let mut world =
            BallWorld::new(PhysicsSettings::default(), Box::new(FlatTerrain::new(0.0)), db).unwrap();

        let tree = world.add_from_db(1, None, false).unwrap();
        assert_eq!(world.ball(tree).unwrap().position(), Vec3::new(500.0, 0.0, 500.0));

        let moved = world
            .add_from_db(1, Some(ObjectLocation::at(Vec3::new(1.0, 0.0, 2.0))), false)
            .unwrap();
        assert_eq!(world.ball(moved).unwrap().position(), Vec3::new(1.0, 0.0, 2.0));

        let err = world.add_from_db(42, None, false).unwrap_err();
        assert!(matches!(err, PhysicsError::UnknownObject(42)));
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_set_height_snaps_to_terrain() {
        let mut world = BallWorld::new(
            PhysicsSettings::default(),
            Box::new(FlatTerrain::new(25.0)),
            ObjectDb::new(),
        )
        .unwrap();
        let a = world
            .add(dynamic(5.0, 1.0), ObjectLocation::at(Vec3::new(1.0, 0.0, 1.0)), true)
            .unwrap();
        let b = world
            .add(dynamic(5.0, 1.0), ObjectLocation::at(Vec3::new(100.0, 3.0, 1.0)), false)
            .unwrap();
        assert_eq!(world.ball(a).unwrap().position().y, 25.0);
        assert_eq!(world.ball(b).unwrap().position().y, 3.0);
    }

    #[test]
    fn test_invalid_profile_not_added() {
        let mut world = flat_world();
        assert!(world.add(dynamic(0.0, 1.0), ObjectLocation::default(), false).is_err());
        assert!(world.add(dynamic(1.0, -2.0), ObjectLocation::default(), false).is_err());
        assert!(world.is_empty());

        // rejected profiles do not consume ids
        let first = world.add(dynamic(5.0, 1.0), ObjectLocation::default(), false).unwrap();
        assert_eq!(first, BallId(0));
    }

    #[test]
    fn test_override_ids_stay_unique() {
        let mut world = flat_world();
        let reserved = world
            .add_with_id(1, dynamic(5.0, 1.0), ObjectLocation::default(), false)
            .unwrap();
        let a = world.add(dynamic(5.0, 1.0), ObjectLocation::default(), false).unwrap();
        let b = world.add(dynamic(5.0, 1.0), ObjectLocation::default(), false).unwrap();
        assert_eq!((reserved, a, b), (BallId(1), BallId(0), BallId(2)));

        let taken = world.add_with_id(2, dynamic(5.0, 1.0), ObjectLocation::default(), false);
        assert!(matches!(taken, Err(PhysicsError::IdUnavailable(2))));
        let fake = world.add_with_id(9999, dynamic(5.0, 1.0), ObjectLocation::default(), false);
        assert!(matches!(fake, Err(PhysicsError::IdUnavailable(9999))));
        assert_eq!(world.len(), 3);

        // a removed id can be claimed again explicitly
        world.remove(reserved).unwrap();
        let again = world
            .add_with_id(1, dynamic(5.0, 1.0), ObjectLocation::default(), false)
            .unwrap();
        assert_eq!(again, BallId(1));
        assert_eq!(world.balls().filter(|b| b.id() == BallId(1)).count(), 1);
    }

    #[test]
    fn test_flying_ball_cannot_climb_cliff() {
        let cliff = FnTerrain(|p: Vec3| if p.x > 20.0 { 200.0 } else { 0.0 });
        let mut world =
            BallWorld::new(PhysicsSettings::default(), Box::new(cliff), ObjectDb::new()).unwrap();
        let a = world
            .add(
                dynamic(5.0, 1.0),
                ObjectLocation::moving(Vec3::new(0.0, 30.0, 0.0), Vec3::new(300.0, 0.0, 0.0)),
                false,
            )
            .unwrap();
        world.ball_mut(a).unwrap().flying = true;

        let mut crashed = false;
        for _ in 0..60 {
            world.tick(DT);
            crashed |= world.colliding_pairs().contains(&(a, BallId::FAKE));
            let ball = world.ball(a).unwrap();
            assert!(ball.position().x <= 20.0);
            assert!(ball.position().y <= 30.0);
        }
        assert!(crashed);
        assert!(world.ball(a).unwrap().velocity().x < 0.0);
    }

    #[test]
    fn test_long_frame_does_not_tunnel_into_wall() {
        let wall = FnTerrain(|p: Vec3| if p.x > 20.0 { 200.0 } else { 0.0 });
        let mut world =
            BallWorld::new(PhysicsSettings::default(), Box::new(wall), ObjectDb::new()).unwrap();
        let a = world
            .add(
                dynamic(5.0, 1.0),
                ObjectLocation::moving(Vec3::new(10.0, 0.0, 0.0), Vec3::new(100.0, 0.0, 0.0)),
                false,
            )
            .unwrap();

        world.tick(0.5);
        let ball = world.ball(a).unwrap();
        assert!(ball.position().x <= 20.0);
        assert_eq!(ball.position().y, 0.0);
        assert!(ball.velocity().x < 0.0);
    }

    #[test]
    fn test_non_positive_elapsed_is_ignored() {
        let mut world = flat_world();
        let a = world
            .add(
                dynamic(5.0, 1.0),
                ObjectLocation::moving(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)),
                false,
            )
            .unwrap();
        assert_eq!(world.tick(0.0), 0);
        assert_eq!(world.tick(-1.0), 0);
        assert_eq!(world.tick(f32::NAN), 0);
        assert_eq!(world.ball(a).unwrap().position(), Vec3::ZERO);
    }

    #[test]
    fn test_snapshot_lists_every_ball() {
        let mut world = flat_world();
        world.add(dynamic(5.0, 1.0), ObjectLocation::default(), false).unwrap();
        world
            .add(ObjectProperties::fixed("tree", 25.0, 1.0), ObjectLocation::default(), false)
            .unwrap();
        let snap = world.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[1].class_name, "tree");
    }
}
