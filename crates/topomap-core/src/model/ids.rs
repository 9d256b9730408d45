// ── Id grammar ──
//
// Sub-element ids are property paths: `<kind><<owner>>.<collection><<key>>`,
// e.g. `networkdevice<R1>.port<port-3>`. Owner and key segments may carry a
// `{n}` type prefix (`networkdevice<{24}R1>`), which is stripped when the
// owner is resolved. Plain ids pass through unchanged.

use super::link::LinkDirection;

/// Build the property id of one sub-element under its owner.
pub fn property_id(owner_kind: &str, owner: &str, collection: &str, key: &str) -> String {
    format!("{owner_kind}<{owner}>.{collection}<{key}>")
}

/// Resolve a (possibly property-path) id to the id of its owning node.
pub fn root_id_of(id: &str) -> &str {
    let Some(open) = id.find('<') else {
        return id;
    };
    let Some(close) = id[open..].find('>') else {
        return id;
    };
    let owner = &id[open + 1..open + close];
    match owner.rfind('}') {
        Some(brace) => &owner[brace + 1..],
        None => owner,
    }
}

/// Stable id of an element-level link.
///
/// Identical endpoints and direction always produce the identical id, so
/// re-running discovery overwrites rather than duplicates.
pub fn link_id(aside: &str, zside: &str, direction: LinkDirection) -> String {
    format!("{aside}{}{zside}", direction.separator())
}

/// Id of a link in a view, keyed on the resolved view endpoints only.
pub fn view_link_id(aside: &str, zside: &str) -> String {
    format!("{aside}{zside}")
}

/// Id of a parent link rolling up every element-level link between two owners.
pub fn aggregate_link_id(owner_a: &str, owner_b: &str) -> String {
    format!("{owner_a}::{owner_b}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_of_property_path() {
        assert_eq!(root_id_of("networkdevice<R1>.port<port-3>"), "R1");
        assert_eq!(root_id_of("networkdevice<{24}R1>.port<{24}port-3>"), "R1");
    }

    #[test]
    fn root_of_plain_id_is_identity() {
        assert_eq!(root_id_of("R1"), "R1");
        assert_eq!(root_id_of("broken<R1"), "broken<R1");
    }

    #[test]
    fn property_id_round_trips_through_root() {
        let id = property_id("networkdevice", "SW2", "port", "port-1");
        assert_eq!(id, "networkdevice<SW2>.port<port-1>");
        assert_eq!(root_id_of(&id), "SW2");
    }

    #[test]
    fn link_id_separators() {
        assert_eq!(link_id("a", "b", LinkDirection::AsideToZside), "a->b");
        assert_eq!(link_id("a", "b", LinkDirection::ZsideToAside), "a<-b");
        assert_eq!(link_id("a", "b", LinkDirection::Bidirectional), "a<->b");
        assert_eq!(link_id("a", "b", LinkDirection::Invalid), "a-b");
    }
}
