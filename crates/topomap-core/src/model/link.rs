// ── Link domain types ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::Display;

use super::ids;

/// Which way traffic is known to flow across a link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum LinkDirection {
    AsideToZside,
    ZsideToAside,
    Bidirectional,
    #[default]
    Invalid,
}

impl LinkDirection {
    pub(crate) fn separator(self) -> &'static str {
        match self {
            Self::AsideToZside => "->",
            Self::ZsideToAside => "<-",
            Self::Bidirectional => "<->",
            Self::Invalid => "-",
        }
    }

    /// Combine two observations of the same link.
    ///
    /// Agreement keeps the direction; any disagreement means traffic is
    /// seen both ways.
    pub fn merge(self, other: Self) -> Self {
        if self == other { self } else { Self::Bidirectional }
    }
}

/// Operational status of a link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum LinkStatus {
    #[default]
    Up,
    Down,
}

/// A topology edge.
///
/// `aside`/`zside` are either node ids or sub-element property ids (see
/// [`ids::root_id_of`]). A parent link produced by aggregation carries its
/// element-level children in `aggregated`, keyed by child link id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopologyLink {
    pub link_id: String,
    pub aside: String,
    pub zside: String,
    #[serde(default)]
    pub direction: LinkDirection,
    #[serde(default)]
    pub status: LinkStatus,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aggregated: BTreeMap<String, TopologyLink>,
}

impl TopologyLink {
    /// New link that is up, with its id derived from endpoints and direction.
    pub fn new(aside: impl Into<String>, zside: impl Into<String>, direction: LinkDirection) -> Self {
        let aside = aside.into();
        let zside = zside.into();
        Self {
            link_id: ids::link_id(&aside, &zside, direction),
            aside,
            zside,
            direction,
            status: LinkStatus::Up,
            aggregated: BTreeMap::new(),
        }
    }

    /// Link as it appears in a view: endpoints are view keys and the id is
    /// their concatenation.
    pub(crate) fn view(aside: &str, zside: &str, direction: LinkDirection) -> Self {
        Self {
            link_id: ids::view_link_id(aside, zside),
            aside: aside.to_owned(),
            zside: zside.to_owned(),
            direction,
            status: LinkStatus::Up,
            aggregated: BTreeMap::new(),
        }
    }

    pub(crate) fn merge(&mut self, patch: &Self) {
        if !patch.aside.is_empty() {
            self.aside.clone_from(&patch.aside);
        }
        if !patch.zside.is_empty() {
            self.zside.clone_from(&patch.zside);
        }
        if patch.direction != LinkDirection::Invalid {
            self.direction = patch.direction;
        }
        self.status = patch.status;
        if !patch.aggregated.is_empty() {
            self.aggregated.clone_from(&patch.aggregated);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_link_is_up_with_derived_id() {
        let link = TopologyLink::new("a", "b", LinkDirection::Bidirectional);
        assert_eq!(link.link_id, "a<->b");
        assert_eq!(link.status, LinkStatus::Up);
    }

    #[test]
    fn direction_merge() {
        use LinkDirection::{AsideToZside, Bidirectional, ZsideToAside};
        assert_eq!(AsideToZside.merge(AsideToZside), AsideToZside);
        assert_eq!(AsideToZside.merge(ZsideToAside), Bidirectional);
        assert_eq!(Bidirectional.merge(AsideToZside), Bidirectional);
    }

    #[test]
    fn patch_can_take_link_down() {
        let mut link = TopologyLink::new("a", "b", LinkDirection::AsideToZside);
        let mut patch = TopologyLink::new("", "", LinkDirection::Invalid);
        patch.status = LinkStatus::Down;
        link.merge(&patch);
        assert_eq!(link.status, LinkStatus::Down);
        assert_eq!(link.direction, LinkDirection::AsideToZside);
        assert_eq!(link.aside, "a");
    }

    #[test]
    fn empty_aggregation_is_not_serialized() {
        let link = TopologyLink::new("a", "b", LinkDirection::AsideToZside);
        let json = serde_json::to_value(&link).unwrap();
        assert!(json.get("Aggregated").is_none());
        assert_eq!(json["Direction"], "AsideToZside");
    }
}
