//! The network table: all reaches of one analysis run.
//!
//! A [`Network`] owns its reaches in table order and keeps an index by
//! `reach_id`, so upstream links resolve directly to the partner reach. The
//! network is immutable once built; per-reach error codes live in
//! [`ErrorCodes`](super::error_codes::ErrorCodes).

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::geometry::engine::GeometryEngine;
use crate::geometry::polyline::Polyline;
use crate::topology::error_codes::ErrorCodes;
use crate::topology::error_kind::ErrorKind;
use crate::topology::query::{Filter, ReachRecord};
use crate::topology::reach::{NodeId, Reach, ReachId};
use crate::topology_error::TopologyError;

/// One line feature of the input dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub reach_id: ReachId,
    #[serde(default)]
    pub geometry: Option<Polyline>,
}

/// One row of the input attribute table.
///
/// A reach at a confluence appears once per upstream reach.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeRow {
    #[serde(rename = "ReachID")]
    pub reach_id: ReachId,
    /// `0` when the reach has no upstream partner.
    #[serde(rename = "UpstreamID", default)]
    pub upstream_id: u64,
    #[serde(rename = "FROM_NODE", default)]
    pub from_node: Option<NodeId>,
    #[serde(rename = "TO_NODE", default)]
    pub to_node: Option<NodeId>,
}

/// All reaches of one run, indexed by id.
#[derive(Clone, Debug, Default)]
pub struct Network {
    reaches: Vec<Reach>,
    index: HashMap<ReachId, usize>,
}

impl Network {
    /// Build a network from reaches in table order.
    ///
    /// # Errors
    /// [`TopologyError::DuplicateReachId`] if two reaches share an id.
    pub fn new(reaches: Vec<Reach>) -> Result<Self, TopologyError> {
        let mut index = HashMap::with_capacity(reaches.len());
        for (pos, reach) in reaches.iter().enumerate() {
            if index.insert(reach.id, pos).is_some() {
                return Err(TopologyError::DuplicateReachId(reach.id));
            }
        }
        let network = Self { reaches, index };
        crate::debug_invariants!(&network, "network construction");
        Ok(network)
    }

    /// Join line features with attribute rows.
    ///
    /// Table order follows the attribute rows; features without a row are
    /// appended afterwards. Repeated rows of the same reach accumulate
    /// upstream links. Rows without a feature yield reaches without geometry.
    ///
    /// # Errors
    /// [`TopologyError::DuplicateReachId`] if two features share an id.
    pub fn from_tables(
        features: Vec<Feature>,
        rows: Vec<AttributeRow>,
    ) -> Result<Self, TopologyError> {
        let mut reaches: Vec<Reach> = Vec::with_capacity(rows.len().max(features.len()));
        let mut index: HashMap<ReachId, usize> = HashMap::new();

        for row in rows {
            let pos = *index.entry(row.reach_id).or_insert_with(|| {
                reaches.push(Reach {
                    id: row.reach_id,
                    geometry: None,
                    upstream: Vec::new(),
                    from_node: row.from_node,
                    to_node: row.to_node,
                });
                reaches.len() - 1
            });
            let reach = &mut reaches[pos];
            if (row.from_node, row.to_node) != (reach.from_node, reach.to_node) {
                log::warn!(
                    "reach {}: conflicting node ids across rows ({:?}, {:?}) vs ({:?}, {:?}); keeping the first",
                    reach.id,
                    reach.from_node,
                    reach.to_node,
                    row.from_node,
                    row.to_node
                );
            }
            if let Some(up) = ReachId::from_link(row.upstream_id) {
                if !reach.upstream.contains(&up) {
                    reach.upstream.push(up);
                }
            }
        }

        let mut seen_features = HashSet::with_capacity(features.len());
        for feature in features {
            if !seen_features.insert(feature.reach_id) {
                return Err(TopologyError::DuplicateReachId(feature.reach_id));
            }
            match index.get(&feature.reach_id) {
                Some(&pos) => reaches[pos].geometry = feature.geometry,
                None => {
                    log::warn!(
                        "feature {} has no attribute row; it carries no linkage",
                        feature.reach_id
                    );
                    index.insert(feature.reach_id, reaches.len());
                    reaches.push(Reach {
                        id: feature.reach_id,
                        geometry: feature.geometry,
                        upstream: Vec::new(),
                        from_node: None,
                        to_node: None,
                    });
                }
            }
        }

        let missing = reaches.iter().filter(|r| r.geometry.is_none()).count();
        if missing > 0 {
            log::warn!("{missing} reaches have no geometry");
        }
        Self::new(reaches)
    }

    pub fn len(&self) -> usize {
        self.reaches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reaches.is_empty()
    }

    /// Reaches in table order.
    pub fn reaches(&self) -> &[Reach] {
        &self.reaches
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reach> {
        self.reaches.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = ReachId> + '_ {
        self.reaches.iter().map(|r| r.id)
    }

    pub fn get(&self, id: ReachId) -> Option<&Reach> {
        self.index.get(&id).map(|&pos| &self.reaches[pos])
    }

    /// Zero-based table row of `id`.
    pub fn position(&self, id: ReachId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: ReachId) -> bool {
        self.index.contains_key(&id)
    }

    /// Upstream partners of `reach` that exist in the network.
    ///
    /// Self-links and links to unknown reaches are skipped.
    pub fn upstream_of<'a>(&'a self, reach: &'a Reach) -> impl Iterator<Item = &'a Reach> + 'a {
        reach.upstream.iter().filter_map(move |&up| {
            if up == reach.id {
                log::debug!("reach {}: ignoring self-referencing upstream link", reach.id);
                return None;
            }
            let partner = self.get(up);
            if partner.is_none() {
                log::debug!("reach {}: upstream reach {} not in network", reach.id, up);
            }
            partner
        })
    }

    /// Reach ids in upstream traversal order.
    ///
    /// Starting at `outflow`, reaches are visited breadth-first along their
    /// upstream links; reaches not reachable from the outlet follow in table
    /// order. Without an outlet the table order is returned.
    ///
    /// # Errors
    /// [`TopologyError::UnknownOutflow`] if `outflow` is not in the network.
    pub fn traversal_order(&self, outflow: Option<ReachId>) -> Result<Vec<ReachId>, TopologyError> {
        let Some(outflow) = outflow else {
            return Ok(self.ids().collect());
        };
        if !self.contains(outflow) {
            return Err(TopologyError::UnknownOutflow(outflow));
        }

        let mut order = Vec::with_capacity(self.len());
        let mut visited = HashSet::with_capacity(self.len());
        let mut queue = VecDeque::from([outflow]);
        visited.insert(outflow);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            if let Some(reach) = self.get(id) {
                for up in self.upstream_of(reach) {
                    if visited.insert(up.id) {
                        queue.push_back(up.id);
                    }
                }
            }
        }

        let unreached = self.len() - order.len();
        if unreached > 0 {
            log::info!(
                "{unreached} reaches are not upstream of outflow {outflow}; visiting them in table order"
            );
            order.extend(self.ids().filter(|id| !visited.contains(id)));
        }
        Ok(order)
    }

    /// `reach_id -> (from_node, to_node)` for every reach.
    pub fn node_index(&self) -> HashMap<ReachId, (Option<NodeId>, Option<NodeId>)> {
        self.reaches
            .iter()
            .map(|r| (r.id, (r.from_node, r.to_node)))
            .collect()
    }

    /// The reaches named by `ids`, resolved through the index, in table
    /// order. Unknown and repeated ids are dropped.
    pub fn subset(&self, ids: &[ReachId]) -> Subset<'_> {
        let mut positions: Vec<usize> = ids.iter().filter_map(|id| self.position(*id)).collect();
        positions.sort_unstable();
        positions.dedup();
        Subset {
            reaches: positions.into_iter().map(|pos| &self.reaches[pos]).collect(),
        }
    }

    /// Reaches matching `filter`, in table order.
    ///
    /// `codes` supplies the `ERROR_CODE` column; without it every reach reads
    /// as [`ErrorKind::NoError`].
    pub fn select<'a>(
        &'a self,
        filter: &Filter,
        engine: &dyn GeometryEngine,
        codes: Option<&ErrorCodes>,
    ) -> Subset<'a> {
        let reaches = self
            .reaches
            .iter()
            .filter(|reach| {
                let code = codes
                    .and_then(|c| c.get(reach.id))
                    .unwrap_or(ErrorKind::NoError);
                filter.matches(&ReachRecord {
                    reach,
                    engine,
                    code,
                })
            })
            .collect();
        Subset { reaches }
    }
}

impl DebugInvariants for Network {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self, "network");
    }

    fn validate_invariants(&self) -> Result<(), TopologyError> {
        if self.index.len() != self.reaches.len() {
            return Err(TopologyError::Invariant(format!(
                "index holds {} ids for {} reaches",
                self.index.len(),
                self.reaches.len()
            )));
        }
        for (pos, reach) in self.reaches.iter().enumerate() {
            if self.index.get(&reach.id) != Some(&pos) {
                return Err(TopologyError::Invariant(format!(
                    "reach {} not indexed at row {pos}",
                    reach.id
                )));
            }
        }
        Ok(())
    }
}

/// A borrowed selection of reaches, dropped with the scope that made it.
#[derive(Clone, Debug, Default)]
pub struct Subset<'a> {
    reaches: Vec<&'a Reach>,
}

impl<'a> Subset<'a> {
    pub fn len(&self) -> usize {
        self.reaches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reaches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Reach> + '_ {
        self.reaches.iter().copied()
    }

    pub fn ids(&self) -> Vec<ReachId> {
        self.reaches.iter().map(|r| r.id).collect()
    }

    /// Usable geometries of the selection, in selection order.
    pub fn geometries(&self) -> Vec<&'a Polyline> {
        self.reaches
            .iter()
            .filter_map(|r| r.valid_geometry())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::engine::PlanarEngine;
    use crate::topology::query::Field;

    fn rid(raw: u64) -> ReachId {
        ReachId::new(raw).unwrap()
    }

    fn row(id: u64, up: u64, from: u64, to: u64) -> AttributeRow {
        AttributeRow {
            reach_id: rid(id),
            upstream_id: up,
            from_node: Some(NodeId(from)),
            to_node: Some(NodeId(to)),
        }
    }

    fn feature(id: u64, pts: &[(f64, f64)]) -> Feature {
        Feature {
            reach_id: rid(id),
            geometry: Some(Polyline::from_xy(pts)),
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let line = Polyline::from_xy(&[(0.0, 0.0), (1.0, 0.0)]);
        let err = Network::new(vec![
            Reach::new(rid(1), line.clone()),
            Reach::new(rid(1), line),
        ])
        .unwrap_err();
        assert_eq!(err, TopologyError::DuplicateReachId(rid(1)));
    }

    #[test]
    fn confluence_rows_accumulate_upstream_links() {
        let net = Network::from_tables(
            vec![
                feature(1, &[(0.0, 0.0), (10.0, 0.0)]),
                feature(2, &[(10.0, 0.0), (20.0, 5.0)]),
                feature(3, &[(10.0, 0.0), (20.0, -5.0)]),
            ],
            vec![
                row(1, 2, 11, 10),
                row(1, 3, 11, 10),
                row(2, 0, 12, 11),
                row(3, 0, 13, 11),
            ],
        )
        .unwrap();
        assert_eq!(net.len(), 3);
        assert_eq!(net.get(rid(1)).unwrap().upstream, vec![rid(2), rid(3)]);
        assert!(net.get(rid(2)).unwrap().upstream.is_empty());
        assert!(net.iter().all(|r| r.geometry.is_some()));
    }

    #[test]
    fn features_without_rows_are_appended() {
        let net = Network::from_tables(
            vec![feature(9, &[(0.0, 0.0), (1.0, 0.0)]), feature(1, &[(1.0, 0.0), (2.0, 0.0)])],
            vec![row(1, 0, 1, 2)],
        )
        .unwrap();
        assert_eq!(net.ids().collect::<Vec<_>>(), vec![rid(1), rid(9)]);
        assert_eq!(net.position(rid(9)), Some(1));
    }

    #[test]
    fn traversal_starts_at_the_outflow() {
        let net = Network::from_tables(
            vec![],
            vec![
                row(5, 0, 50, 51),
                row(1, 2, 11, 10),
                row(2, 3, 12, 11),
                row(3, 0, 13, 12),
            ],
        )
        .unwrap();
        let order = net.traversal_order(Some(rid(1))).unwrap();
        assert_eq!(order, vec![rid(1), rid(2), rid(3), rid(5)]);
        assert_eq!(
            net.traversal_order(Some(rid(77))),
            Err(TopologyError::UnknownOutflow(rid(77)))
        );
        assert_eq!(net.traversal_order(None).unwrap()[0], rid(5));
    }

    #[test]
    fn select_keeps_table_order() {
        let engine = PlanarEngine::default();
        let net = Network::from_tables(
            vec![
                feature(1, &[(0.0, 0.0), (10.0, 0.0)]),
                feature(2, &[(10.0, 0.0), (50.0, 0.0)]),
                feature(3, &[(50.0, 0.0), (55.0, 0.0)]),
            ],
            vec![row(1, 2, 1, 0), row(2, 3, 2, 1), row(3, 0, 3, 2)],
        )
        .unwrap();
        let short = net.select(&Filter::less_than(Field::Length, 30.0), &engine, None);
        assert_eq!(short.ids(), vec![rid(1), rid(3)]);
        let pair = net.select(&Filter::reach_in(&[rid(3), rid(1)]), &engine, None);
        assert_eq!(pair.ids(), vec![rid(1), rid(3)]);
        assert_eq!(pair.geometries().len(), 2);
        let direct = net.subset(&[rid(3), rid(1), rid(3), rid(42)]);
        assert_eq!(direct.ids(), pair.ids());
    }

    #[test]
    fn invariants_hold_after_construction() {
        let net = Network::from_tables(vec![], vec![row(1, 0, 1, 2), row(2, 1, 3, 1)]).unwrap();
        assert!(net.validate_invariants().is_ok());
    }
}
