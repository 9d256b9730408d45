// ── Link matcher ──
//
// Turns sub-elements grouped by owner into a link set in which every
// element takes part in at most one link and no link joins two elements
// of the same owner. Quadratic in the number of elements.

use std::collections::BTreeMap;

use crate::model::ids::{aggregate_link_id, root_id_of};
use crate::model::{LinkDirection, LinkStatus, TopologyLink};

/// Match sub-elements into links.
///
/// `elements_by_owner` maps owner id to element id to element. Its key
/// order fixes the scan order, so an earlier element is always the A side
/// and belongs to the lexicographically lower owner; the same input yields
/// the same link ids. The first positive answer wins for an element; it
/// is not offered again.
pub fn match_links<E, F>(
    elements_by_owner: &BTreeMap<String, BTreeMap<String, E>>,
    is_connected: F,
) -> Vec<TopologyLink>
where
    F: Fn(&E, &E) -> (bool, LinkDirection),
{
    let flat: Vec<(&str, &str, &E)> = elements_by_owner
        .iter()
        .flat_map(|(owner, elements)| {
            elements
                .iter()
                .map(move |(id, element)| (owner.as_str(), id.as_str(), element))
        })
        .collect();

    let mut connected = vec![false; flat.len()];
    let mut links = Vec::new();

    for i in 0..flat.len() {
        if connected[i] {
            continue;
        }
        let (owner_i, id_i, element_i) = flat[i];
        for j in (i + 1)..flat.len() {
            let (owner_j, id_j, element_j) = flat[j];
            if connected[j] || owner_i == owner_j {
                continue;
            }
            let (ok, direction) = is_connected(element_i, element_j);
            if ok {
                connected[i] = true;
                connected[j] = true;
                links.push(TopologyLink::new(id_i, id_j, direction));
                break;
            }
        }
    }

    links
}

/// Roll element-level links up into one parent link per owner pair.
///
/// The parent is keyed `owner_a::owner_b` (owners in lexicographic order)
/// and keeps each child under `aggregated`. Children observed from the
/// opposite side have their direction flipped before being combined, so a
/// parent is `Bidirectional` exactly when its children disagree. A parent is
/// up while any child is up.
pub fn aggregate_links(links: &[TopologyLink]) -> Vec<TopologyLink> {
    let mut parents: BTreeMap<(String, String), TopologyLink> = BTreeMap::new();

    for child in links {
        let a = root_id_of(&child.aside);
        let z = root_id_of(&child.zside);
        let (key, direction) = if a <= z {
            ((a.to_owned(), z.to_owned()), child.direction)
        } else {
            ((z.to_owned(), a.to_owned()), flip(child.direction))
        };

        let parent = parents.entry(key).or_insert_with_key(|(a, z)| TopologyLink {
            link_id: aggregate_link_id(a, z),
            aside: a.clone(),
            zside: z.clone(),
            direction,
            status: LinkStatus::Down,
            aggregated: BTreeMap::new(),
        });
        parent.direction = parent.direction.merge(direction);
        if child.status == LinkStatus::Up {
            parent.status = LinkStatus::Up;
        }
        parent
            .aggregated
            .insert(child.link_id.clone(), child.clone());
    }

    parents.into_values().collect()
}

fn flip(direction: LinkDirection) -> LinkDirection {
    match direction {
        LinkDirection::AsideToZside => LinkDirection::ZsideToAside,
        LinkDirection::ZsideToAside => LinkDirection::AsideToZside,
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::model::ids::property_id;

    fn always(_: &u8, _: &u8) -> (bool, LinkDirection) {
        (true, LinkDirection::Bidirectional)
    }

    fn grouped(entries: &[(&str, &[u8])]) -> BTreeMap<String, BTreeMap<String, u8>> {
        entries
            .iter()
            .map(|(owner, values)| {
                let elements = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (property_id("node", owner, "port", &i.to_string()), *v))
                    .collect();
                ((*owner).to_owned(), elements)
            })
            .collect()
    }

    #[test]
    fn two_owners_pair_up_port_by_port() {
        let input = grouped(&[("R1", &[0, 1]), ("R2", &[0, 1])]);
        let links = match_links(&input, always);
        let ids: Vec<_> = links.iter().map(|l| l.link_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "node<R1>.port<0><->node<R2>.port<0>",
                "node<R1>.port<1><->node<R2>.port<1>",
            ]
        );
    }

    #[test]
    fn single_owner_produces_nothing() {
        let input = grouped(&[("R1", &[0, 1, 2, 3])]);
        assert!(match_links(&input, always).is_empty());
    }

    #[test]
    fn predicate_sees_lower_owner_first() {
        let input = grouped(&[("A", &[1]), ("B", &[2])]);
        let links = match_links(&input, |a, z| {
            assert!(a < z, "aside element must belong to the lower owner");
            (true, LinkDirection::AsideToZside)
        });
        assert_eq!(links.len(), 1);
        assert_eq!(root_id_of(&links[0].aside), "A");
    }

    #[test]
    fn aggregation_disagreeing_children_become_bidirectional() {
        let children = vec![
            TopologyLink::new("node<A>.port<0>", "node<B>.port<0>", LinkDirection::AsideToZside),
            TopologyLink::new("node<A>.port<1>", "node<B>.port<1>", LinkDirection::ZsideToAside),
        ];
        let parents = aggregate_links(&children);
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].link_id, "A::B");
        assert_eq!(parents[0].direction, LinkDirection::Bidirectional);
        assert_eq!(parents[0].aggregated.len(), 2);
    }

    #[test]
    fn aggregation_agreeing_children_keep_direction() {
        let children = vec![
            TopologyLink::new("node<A>.port<0>", "node<B>.port<0>", LinkDirection::AsideToZside),
            // Same flow, observed from B's side.
            TopologyLink::new("node<B>.port<1>", "node<A>.port<1>", LinkDirection::ZsideToAside),
        ];
        let parents = aggregate_links(&children);
        assert_eq!(parents[0].direction, LinkDirection::AsideToZside);
    }

    #[test]
    fn aggregated_parent_is_down_only_when_every_child_is() {
        let mut a = TopologyLink::new("node<A>.port<0>", "node<B>.port<0>", LinkDirection::AsideToZside);
        let mut b = TopologyLink::new("node<A>.port<1>", "node<B>.port<1>", LinkDirection::AsideToZside);
        a.status = LinkStatus::Down;
        assert_eq!(aggregate_links(&[a.clone(), b.clone()])[0].status, LinkStatus::Up);
        b.status = LinkStatus::Down;
        assert_eq!(aggregate_links(&[a, b])[0].status, LinkStatus::Down);
    }

    // ── Properties ──────────────────────────────────────────────────

    fn arb_input() -> impl Strategy<Value = BTreeMap<String, BTreeMap<String, u8>>> {
        prop::collection::btree_map("[a-e]{1,2}", prop::collection::vec(any::<u8>(), 0..6), 0..6)
            .prop_map(|owners| {
                owners
                    .into_iter()
                    .map(|(owner, values)| {
                        let elements = values
                            .into_iter()
                            .enumerate()
                            .map(|(i, v)| (property_id("node", &owner, "port", &i.to_string()), v))
                            .collect();
                        (owner, elements)
                    })
                    .collect()
            })
    }

    fn sometimes(a: &u8, z: &u8) -> (bool, LinkDirection) {
        let direction = if a <= z {
            LinkDirection::AsideToZside
        } else {
            LinkDirection::ZsideToAside
        };
        ((u16::from(*a) + u16::from(*z)) % 3 != 0, direction)
    }

    proptest! {
        #[test]
        fn no_element_is_matched_twice(input in arb_input()) {
            let links = match_links(&input, sometimes);
            let mut seen = HashMap::new();
            for link in &links {
                *seen.entry(link.aside.clone()).or_insert(0) += 1;
                *seen.entry(link.zside.clone()).or_insert(0) += 1;
            }
            prop_assert!(seen.values().all(|&n| n == 1));
        }

        #[test]
        fn no_link_joins_one_owner(input in arb_input()) {
            for link in match_links(&input, sometimes) {
                prop_assert_ne!(root_id_of(&link.aside), root_id_of(&link.zside));
            }
        }

        #[test]
        fn lower_owner_is_always_the_a_side(input in arb_input()) {
            for link in match_links(&input, sometimes) {
                prop_assert!(root_id_of(&link.aside) < root_id_of(&link.zside));
            }
        }

        #[test]
        fn parents_are_bidirectional_iff_children_disagree(input in arb_input()) {
            let links = match_links(&input, sometimes);
            for parent in aggregate_links(&links) {
                let directions: BTreeSet<_> = parent
                    .aggregated
                    .values()
                    .map(|c| {
                        if root_id_of(&c.aside) == parent.aside {
                            c.direction
                        } else {
                            flip(c.direction)
                        }
                    })
                    .map(|d| format!("{d:?}"))
                    .collect();
                let expect_bidi = directions.len() > 1 || directions.contains("Bidirectional");
                prop_assert_eq!(parent.direction == LinkDirection::Bidirectional, expect_bidi);
            }
        }
    }
}
