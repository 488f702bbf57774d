//! Room-to-room routing. Which room an exit leads to, and where the player
//! re-enters, is a pure function of the current room and the edge touched.

use glam::IVec2;

use crate::constants::{BOSS_ENTRY, BOTTOM_ENTRY_Y, LEFT_ENTRY_X, RIGHT_ENTRY_X, TOP_ENTRY_Y};
use crate::geometry::Aabb;
use crate::level::RoomId;
use crate::tilemap::TileMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Right,
    Left,
    Top,
    Bottom,
}

/// Which exit markers the player's box touches this step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeContacts {
    pub right: bool,
    pub left: bool,
    pub top: bool,
    pub bottom: bool,
}

impl EdgeContacts {
    pub fn probe(map: &TileMap, hitbox: &Aabb) -> Self {
        Self {
            right: map.test_collision_right(hitbox),
            left: map.test_collision_left(hitbox),
            top: map.test_collision_top(hitbox),
            bottom: map.test_collision_bottom(hitbox),
        }
    }

    /// At most one edge is honoured per step: right, then left, top, bottom.
    pub fn first(&self) -> Option<Edge> {
        if self.right {
            Some(Edge::Right)
        } else if self.left {
            Some(Edge::Left)
        } else if self.top {
            Some(Edge::Top)
        } else if self.bottom {
            Some(Edge::Bottom)
        } else {
            None
        }
    }
}

/// Where the player appears in the new room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    LeftMargin,
    RightMargin,
    TopMargin,
    BottomMargin,
    BossArena,
}

impl Entry {
    /// Margins fix one axis and keep the other from `current`.
    pub fn position(self, current: IVec2) -> IVec2 {
        match self {
            Self::LeftMargin => IVec2::new(LEFT_ENTRY_X, current.y),
            Self::RightMargin => IVec2::new(RIGHT_ENTRY_X, current.y),
            Self::TopMargin => IVec2::new(current.x, TOP_ENTRY_Y),
            Self::BottomMargin => IVec2::new(current.x, BOTTOM_ENTRY_Y),
            Self::BossArena => BOSS_ENTRY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub target: RoomId,
    pub entry: Entry,
    /// One-shot sound played on the way through.
    pub cue: Option<&'static str>,
}

const CASTLE_GATE: RoomId = RoomId::new(3, 0);
const CASTLE_HALL: RoomId = RoomId::new(4, 0);
const HALL_END: RoomId = RoomId::new(7, 0);
const BOSS_ANTEROOM: RoomId = RoomId::new(7, 1);
const BOSS_ROOM: RoomId = RoomId::new(8, 1);

pub fn resolve(room: RoomId, edge: Edge) -> Transition {
    let RoomId { level, floor } = room;
    let go = |target: RoomId, entry: Entry| Transition {
        target,
        entry,
        cue: None,
    };
    match edge {
        Edge::Right => match room {
            BOSS_ANTEROOM => go(BOSS_ROOM, Entry::BossArena),
            HALL_END => go(CASTLE_HALL, Entry::LeftMargin),
            CASTLE_GATE => Transition {
                cue: Some("EnterCastle"),
                ..go(CASTLE_HALL, Entry::LeftMargin)
            },
            _ => go(RoomId::new(level + 1, floor), Entry::LeftMargin),
        },
        Edge::Left => {
            let target = if level == CASTLE_HALL.level { HALL_END.level } else { level - 1 };
            go(RoomId::new(target, floor), Entry::RightMargin)
        }
        Edge::Top => go(RoomId::new(level, floor + 1), Entry::BottomMargin),
        Edge::Bottom => go(RoomId::new(level, floor - 1), Entry::TopMargin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_edge_advances_level_with_left_entry() {
        let t = resolve(RoomId::new(1, 0), Edge::Right);
        assert_eq!(t.target, RoomId::new(2, 0));
        assert_eq!(t.entry, Entry::LeftMargin);
        assert_eq!(t.cue, None);
    }

    #[test]
    fn right_edge_special_routes() {
        let boss = resolve(RoomId::new(7, 1), Edge::Right);
        assert_eq!(boss.target, RoomId::new(8, 1));
        assert_eq!(boss.entry, Entry::BossArena);

        let wrap = resolve(RoomId::new(7, 0), Edge::Right);
        assert_eq!(wrap.target, RoomId::new(4, 0));

        let gate = resolve(RoomId::new(3, 0), Edge::Right);
        assert_eq!(gate.target, RoomId::new(4, 0));
        assert_eq!(gate.cue, Some("EnterCastle"));
    }

    #[test]
    fn left_edge_goes_back_and_hall_wraps() {
        assert_eq!(resolve(RoomId::new(3, 0), Edge::Left).target, RoomId::new(2, 0));
        assert_eq!(resolve(RoomId::new(4, 0), Edge::Left).target, RoomId::new(7, 0));
        assert_eq!(resolve(RoomId::new(4, 1), Edge::Left).target, RoomId::new(7, 1));
        assert_eq!(resolve(RoomId::new(6, 1), Edge::Left).target, RoomId::new(5, 1));
        assert_eq!(resolve(RoomId::new(6, 1), Edge::Left).entry, Entry::RightMargin);
    }

    #[test]
    fn vertical_edges_change_floor() {
        let up = resolve(RoomId::new(5, 0), Edge::Top);
        assert_eq!(up.target, RoomId::new(5, 1));
        assert_eq!(up.entry, Entry::BottomMargin);
        let down = resolve(RoomId::new(7, 1), Edge::Bottom);
        assert_eq!(down.target, RoomId::new(7, 0));
        assert_eq!(down.entry, Entry::TopMargin);
    }

    #[test]
    fn entry_positions_keep_the_free_axis() {
        let here = IVec2::new(120, 99);
        assert_eq!(Entry::LeftMargin.position(here), IVec2::new(19, 99));
        assert_eq!(Entry::RightMargin.position(here), IVec2::new(253, 99));
        assert_eq!(Entry::TopMargin.position(here), IVec2::new(120, 48));
        assert_eq!(Entry::BottomMargin.position(here), IVec2::new(120, 150));
        assert_eq!(Entry::BossArena.position(here), IVec2::new(19, 170));
    }

    #[test]
    fn right_wins_over_every_other_edge() {
        let all = EdgeContacts {
            right: true,
            left: true,
            top: true,
            bottom: true,
        };
        assert_eq!(all.first(), Some(Edge::Right));
        let no_right = EdgeContacts { right: false, ..all };
        assert_eq!(no_right.first(), Some(Edge::Left));
        let vertical = EdgeContacts {
            top: true,
            bottom: true,
            ..EdgeContacts::default()
        };
        assert_eq!(vertical.first(), Some(Edge::Top));
        assert_eq!(EdgeContacts::default().first(), None);
    }
}
