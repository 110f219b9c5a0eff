use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Organization,
    User,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 1200.0,
        }
    }
}

impl Canvas {
    const BAND_MARGIN: f32 = 120.0;

    pub fn size(self) -> Vec2 {
        vec2(self.width, self.height)
    }

    fn band(self) -> (f32, f32) {
        let margin = Self::BAND_MARGIN.min(self.height * 0.25);
        (margin, self.height - margin)
    }

    fn column(self, role: NodeRole) -> f32 {
        match role {
            NodeRole::Organization => self.width * 0.75,
            NodeRole::User => self.width * 0.25,
        }
    }
}

// Half-extents of the jitter box for each role.
fn jitter_extent(role: NodeRole) -> Vec2 {
    match role {
        NodeRole::Organization => vec2(60.0, 40.0),
        NodeRole::User => vec2(80.0, 60.0),
    }
}

/// Deterministic pseudo-random value in `[min, max]` derived from `id`.
pub fn seeded(id: i64, min: f32, max: f32) -> f32 {
    let x = (id as f64 * 99_991.0).sin() * 10_000.0;
    let fraction = (x - x.floor()) as f32;
    min + fraction * (max - min)
}

pub fn slot_position(role: NodeRole, id: i64, slot: usize, count: usize, canvas: Canvas) -> Vec2 {
    let count = count.max(1);
    let (top, bottom) = canvas.band();
    let spacing = (bottom - top) / count as f32;
    let extent = jitter_extent(role);

    let x = canvas.column(role) + seeded(id, -extent.x, extent.x);
    let y = top + (slot as f32 + 0.5) * spacing + seeded(id, -extent.y, extent.y);
    vec2(x, y)
}

/// Places one column of nodes. Entries are `(sort_key, id)`; the slot order
/// only depends on the keys, never on the input order.
pub fn layout_column<K: Ord + Copy>(
    role: NodeRole,
    entries: impl IntoIterator<Item = (K, i64)>,
    canvas: Canvas,
) -> HashMap<i64, Vec2> {
    let mut entries = entries.into_iter().collect::<Vec<_>>();
    entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let count = entries.len();
    entries
        .iter()
        .enumerate()
        .map(|(slot, &(_key, id))| (id, slot_position(role, id, slot, count, canvas)))
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkLayout {
    pub orgs: HashMap<i64, Vec2>,
    pub users: HashMap<i64, Vec2>,
}

/// Lays out organizations by id on the right and user wallets, given as
/// `(user_id, wallet_id)`, on the left. Positions are keyed by org id and
/// wallet id.
pub fn layout_network(
    orgs: impl IntoIterator<Item = i64>,
    user_wallets: impl IntoIterator<Item = (i64, i64)>,
    canvas: Canvas,
) -> NetworkLayout {
    NetworkLayout {
        orgs: layout_column(NodeRole::Organization, orgs.into_iter().map(|id| (id, id)), canvas),
        users: layout_column(
            NodeRole::User,
            user_wallets
                .into_iter()
                .map(|(user_id, wallet_id)| ((user_id, wallet_id), wallet_id)),
            canvas,
        ),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn columns_sit_on_opposite_sides() {
        let canvas = Canvas::default();
        let org = slot_position(NodeRole::Organization, 1, 0, 1, canvas);
        let user = slot_position(NodeRole::User, 1, 0, 1, canvas);

        assert!(org.x > canvas.width * 0.5);
        assert!(user.x < canvas.width * 0.5);
    }

    #[test]
    fn input_order_does_not_move_nodes() {
        let canvas = Canvas::default();
        let forward = layout_column(NodeRole::Organization, [(3, 3), (1, 1), (2, 2)], canvas);
        let reversed = layout_column(NodeRole::Organization, [(2, 2), (1, 1), (3, 3)], canvas);

        assert_eq!(forward, reversed);
    }

    #[test]
    fn slots_are_evenly_spread_down_the_band() {
        let canvas = Canvas::default();
        let positions = layout_column(NodeRole::User, [(10, 100), (20, 200), (30, 300)], canvas);

        let slot_centers = [100, 200, 300].map(|id| positions[&id].y - seeded(id, -60.0, 60.0));
        assert!((slot_centers[0] - 280.0).abs() < 0.01);
        assert!((slot_centers[1] - 600.0).abs() < 0.01);
        assert!((slot_centers[2] - 920.0).abs() < 0.01);
    }

    #[test]
    fn users_are_ordered_by_owner_then_wallet() {
        let canvas = Canvas::default();
        let layout = layout_network([2, 1], [(9, 40), (3, 41), (3, 39)], canvas);

        assert_eq!(layout.orgs.len(), 2);
        assert!(layout.orgs[&1].x > canvas.width * 0.5);

        let slot_of = |wallet_id: i64| layout.users[&wallet_id].y - seeded(wallet_id, -60.0, 60.0);
        assert!(slot_of(39) < slot_of(41));
        assert!(slot_of(41) < slot_of(40));
    }

    #[test]
    fn empty_column_is_empty() {
        let positions = layout_column::<i64>(NodeRole::User, [], Canvas::default());
        assert!(positions.is_empty());
    }

    proptest! {
        #[test]
        fn seeded_is_deterministic_and_bounded(
            id in any::<i32>(),
            min in -500.0f32..0.0,
            span in 0.0f32..500.0,
        ) {
            let max = min + span;
            let first = seeded(id as i64, min, max);
            let second = seeded(id as i64, min, max);

            prop_assert_eq!(first.to_bits(), second.to_bits());
            prop_assert!(first >= min - 1e-3 && first <= max + 1e-3);
        }

        #[test]
        fn slot_position_is_pure(id in 0i64..1_000_000, slot in 0usize..64, extra in 0usize..64) {
            let count = slot + 1 + extra;
            let canvas = Canvas::default();
            let a = slot_position(NodeRole::Organization, id, slot, count, canvas);
            let b = slot_position(NodeRole::Organization, id, slot, count, canvas);
            prop_assert_eq!(a, b);
        }
    }
}
