//! Collision response between balls
//!
//! Both functions move positions immediately but only *compute* the new
//! velocities; the world hands those to each ball's behavior so derived
//! objects (karts, AI) can react instead of just accepting them.

use glam::Vec3;

use super::ball::Ball;

/// Result of resolving one contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Contact normal in the XZ plane, pointing from the partner toward the ball
    pub normal: Vec3,
    /// Penetration depth that was removed
    pub penetration: f32,
}

/// Reflect the normal component of `velocity`, scaled by `elasticity`.
/// Only applied when moving into the surface.
#[inline]
pub fn reflect_velocity(velocity: Vec3, normal: Vec3, elasticity: f32) -> Vec3 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return velocity;
    }
    velocity - (1.0 + elasticity) * vn * normal
}

/// Dynamic ball against a static obstacle or wall proxy.
///
/// The ball is pushed out by the full penetration; the obstacle never moves.
/// Returns the contact and the ball's post-collision velocity.
pub fn resolve_static_collision(ball: &mut Ball, target: &Ball) -> (CollisionResult, Vec3) {
    let penetration = ball.penetration(target);
    let normal = ball.separation_normal(target);
    ball.position += ball.calculate_overlap_displacement(target, false);

    let elasticity = ball.properties().elasticity;
    let new_velocity = reflect_velocity(ball.velocity, normal, elasticity);
    (
        CollisionResult {
            normal,
            penetration,
        },
        new_velocity,
    )
}

/// Two dynamic balls.
///
/// Each is displaced apart by the *other's* share of the total mass, so heavier
/// objects move less. Velocities along the line of centers are exchanged with
/// restitution equal to the mean elasticity, conserving momentum; tangential
/// components pass through. Separating pairs keep their velocities.
pub fn resolve_dynamic_collision(b1: &mut Ball, b2: &mut Ball) -> (CollisionResult, Vec3, Vec3) {
    let penetration = b1.penetration(b2);
    let normal = b1.separation_normal(b2);

    let (m1, m2) = (b1.mass(), b2.mass());
    let total = m1 + m2;
    let overlap = b1.radius_sum(b2, false) - b1.distance(b2);
    if overlap > 0.0 {
        b1.position += normal * overlap * (m2 / total);
        b2.position -= normal * overlap * (m1 / total);
    }

    let (v1, v2) = (b1.velocity, b2.velocity);
    let v1n = v1.dot(normal);
    let v2n = v2.dot(normal);
    let approach = v1n - v2n;

    let contact = CollisionResult {
        normal,
        penetration,
    };

    if approach >= 0.0 {
        return (contact, v1, v2);
    }

    let e = 0.5 * (b1.properties().elasticity + b2.properties().elasticity);
    let momentum = m1 * v1n + m2 * v2n;
    let v1n_new = (momentum - m2 * e * approach) / total;
    let v2n_new = (momentum + m1 * e * approach) / total;

    (
        contact,
        v1 + normal * (v1n_new - v1n),
        v2 + normal * (v2n_new - v2n),
    )
}
