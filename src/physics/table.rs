//! Top-down table physics
//!
//! No gravity: dice slide across the board, lose speed to air friction, and
//! bounce off the board edges and each other.

use glam::Vec2;

use super::collision::{bounce_velocity, circle_circle_collision, circle_rect_collision};
use super::{BodyHandle, BodyOptions, BodyShape, PhysicsWorld};

/// Spin gained per unit of off-center impulse
const ANGULAR_IMPULSE_FACTOR: f32 = 0.02;

#[derive(Debug, Clone)]
struct Body {
    handle: BodyHandle,
    shape: BodyShape,
    pos: Vec2,
    vel: Vec2,
    angle: f32,
    angular_vel: f32,
    options: BodyOptions,
}

impl Body {
    fn half_extents(&self) -> Vec2 {
        match self.shape {
            BodyShape::Circle { radius } => Vec2::splat(radius),
            BodyShape::Rect { width, height } => Vec2::new(width, height) / 2.0,
        }
    }
}

/// Simple top-down world holding static edges and dynamic dice
#[derive(Debug, Clone, Default)]
pub struct TableWorld {
    /// Bodies in creation order (stable iteration)
    bodies: Vec<Body>,
    next_id: u32,
}

impl TableWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.iter().find(|b| b.handle == handle)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.handle == handle)
    }

    /// Push dynamic bodies out of static ones and reflect their velocity
    fn resolve_static_contacts(&mut self) {
        let statics: Vec<(Vec2, Vec2)> = self
            .bodies
            .iter()
            .filter(|b| b.options.is_static)
            .map(|b| (b.pos, b.half_extents()))
            .collect();

        for body in self.bodies.iter_mut().filter(|b| !b.options.is_static) {
            let radius = body.shape.bounding_radius();
            for &(center, half) in &statics {
                let hit = circle_rect_collision(body.pos, radius, center, half);
                if hit.hit {
                    body.pos += hit.normal * hit.penetration;
                    body.vel = bounce_velocity(body.vel, hit.normal, body.options.restitution);
                    body.angular_vel = -body.angular_vel * body.options.restitution;
                }
            }
        }
    }

    /// Separate overlapping dynamic bodies and exchange momentum (equal mass)
    fn resolve_dynamic_contacts(&mut self) {
        let count = self.bodies.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (head, tail) = self.bodies.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];
                if a.options.is_static || b.options.is_static {
                    continue;
                }

                let hit = circle_circle_collision(
                    a.pos,
                    a.shape.bounding_radius(),
                    b.pos,
                    b.shape.bounding_radius(),
                );
                if !hit.hit {
                    continue;
                }

                let correction = hit.normal * (hit.penetration / 2.0);
                a.pos += correction;
                b.pos -= correction;

                let relative = (a.vel - b.vel).dot(hit.normal);
                if relative < 0.0 {
                    let restitution = a.options.restitution.min(b.options.restitution);
                    let exchange = hit.normal * (-(1.0 + restitution) * relative / 2.0);
                    a.vel += exchange;
                    b.vel -= exchange;
                }
            }
        }
    }
}

impl PhysicsWorld for TableWorld {
    fn create_body(&mut self, shape: BodyShape, position: Vec2, options: BodyOptions) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.bodies.push(Body {
            handle,
            shape,
            pos: position,
            vel: Vec2::ZERO,
            angle: options.angle,
            angular_vel: 0.0,
            options,
        });
        handle
    }

    fn apply_impulse(&mut self, handle: BodyHandle, point: Vec2, impulse: Vec2) {
        let Some(body) = self.body_mut(handle) else {
            log::warn!("Impulse on unknown body {:?}", handle);
            return;
        };
        if body.options.is_static {
            return;
        }
        body.vel += impulse;
        body.angular_vel += (point - body.pos).perp_dot(impulse) * ANGULAR_IMPULSE_FACTOR;
    }

    fn set_position(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.pos = position;
        }
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.vel = velocity;
            if velocity == Vec2::ZERO {
                body.angular_vel = 0.0;
            }
        }
    }

    fn step(&mut self, dt: f32) {
        for body in self.bodies.iter_mut().filter(|b| !b.options.is_static) {
            body.pos += body.vel * dt;
            body.angle += body.angular_vel * dt;

            // Air friction is specified per 1/60 s frame
            let damping = (1.0 - body.options.friction_air).clamp(0.0, 1.0).powf(dt * 60.0);
            body.vel *= damping;
            body.angular_vel *= damping;
        }

        self.resolve_dynamic_contacts();
        self.resolve_static_contacts();
    }

    fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(|b| b.pos)
    }

    fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(|b| b.vel)
    }

    fn angle(&self, handle: BodyHandle) -> Option<f32> {
        self.body(handle).map(|b| b.angle)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let before = self.bodies.len();
        self.bodies.retain(|b| b.handle != handle);
        self.bodies.len() != before
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn clear(&mut self) {
        self.bodies.clear();
    }
}

/// Add the four solid board edges around a board whose top-left is `origin`
pub fn add_board_edges(
    world: &mut dyn PhysicsWorld,
    origin: Vec2,
    size: Vec2,
    thickness: f32,
) -> [BodyHandle; 4] {
    let rect = |world: &mut dyn PhysicsWorld, x: f32, y: f32, w: f32, h: f32| {
        world.create_body(
            BodyShape::Rect { width: w, height: h },
            Vec2::new(x + w / 2.0, y + h / 2.0),
            BodyOptions::fixed(),
        )
    };

    [
        // Left
        rect(world, origin.x, origin.y, thickness, size.y),
        // Top
        rect(world, origin.x, origin.y, size.x, thickness),
        // Right
        rect(world, origin.x + size.x - thickness, origin.y, thickness, size.y),
        // Bottom
        rect(world, origin.x, origin.y + size.y - thickness, size.x, thickness),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn die_options() -> BodyOptions {
        BodyOptions {
            friction_air: 0.03,
            restitution: 0.6,
            ..Default::default()
        }
    }

    #[test]
    fn test_impulse_then_friction_settles() {
        let mut world = TableWorld::new();
        let die = world.create_body(BodyShape::Circle { radius: 24.0 }, Vec2::ZERO, die_options());
        world.apply_impulse(die, Vec2::ZERO, Vec2::new(800.0, 0.0));
        assert_eq!(world.velocity(die), Some(Vec2::new(800.0, 0.0)));

        for _ in 0..(120 * 5) {
            world.step(1.0 / 120.0);
        }
        let vel = world.velocity(die).unwrap();
        assert!(vel.length() < 10.0, "die should have slowed, vel={vel:?}");
        assert!(world.position(die).unwrap().x > 0.0);
    }

    #[test]
    fn test_board_edges_contain_die() {
        let mut world = TableWorld::new();
        let origin = Vec2::ZERO;
        add_board_edges(&mut world, origin, Vec2::new(1000.0, 1000.0), 80.0);
        let die = world.create_body(
            BodyShape::Rect { width: 48.0, height: 48.0 },
            Vec2::new(500.0, 500.0),
            die_options(),
        );
        world.apply_impulse(die, Vec2::new(500.0, 500.0), Vec2::new(2000.0, 300.0));

        for _ in 0..(120 * 6) {
            world.step(1.0 / 120.0);
            let pos = world.position(die).unwrap();
            assert!(pos.x > 80.0 && pos.x < 920.0, "escaped at {pos:?}");
            assert!(pos.y > 80.0 && pos.y < 920.0, "escaped at {pos:?}");
        }
    }

    #[test]
    fn test_off_center_impulse_spins() {
        let mut world = TableWorld::new();
        let die = world.create_body(BodyShape::Circle { radius: 24.0 }, Vec2::ZERO, die_options());
        world.apply_impulse(die, Vec2::new(0.0, 10.0), Vec2::new(500.0, 0.0));
        world.step(1.0 / 120.0);
        assert!(world.angle(die).unwrap().abs() > 0.0);
    }

    #[test]
    fn test_remove_and_unknown_handles() {
        let mut world = TableWorld::new();
        let a = world.create_body(BodyShape::Circle { radius: 5.0 }, Vec2::ZERO, BodyOptions::default());
        assert_eq!(world.body_count(), 1);
        assert!(world.remove_body(a));
        assert!(!world.remove_body(a));
        assert_eq!(world.position(a), None);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_dice_push_each_other_apart() {
        let mut world = TableWorld::new();
        let a = world.create_body(BodyShape::Circle { radius: 24.0 }, Vec2::ZERO, die_options());
        let b = world.create_body(BodyShape::Circle { radius: 24.0 }, Vec2::new(100.0, 0.0), die_options());
        world.apply_impulse(a, Vec2::ZERO, Vec2::new(600.0, 0.0));
        for _ in 0..60 {
            world.step(1.0 / 120.0);
        }
        let pa = world.position(a).unwrap();
        let pb = world.position(b).unwrap();
        assert!(pb.x - pa.x >= 47.0, "bodies overlap: {pa:?} {pb:?}");
        assert!(world.velocity(b).unwrap().x > 0.0);
    }
}
