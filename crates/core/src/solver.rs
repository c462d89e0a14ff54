use super::csr::GraphCSR;
use super::graph::Graph;
use super::traits::ShortestPathSolver;
use common::{
    error::Error,
    numeric_kernel::{WIDE_UNREACHABLE, narrow, relax},
    types::{SolveSummary, VertexId, WideDistance},
};
use std::collections::VecDeque;

/// How (and whether) a run looks for negative cycles after the `V - 1`
/// mandatory passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NegativeLoopDetection {
    /// Only the `V - 1` mandatory passes run; no vertex is ever flagged.
    #[default]
    Disabled,

    /// One extra pass with the same predicate. Every vertex whose distance is
    /// still improved in that pass is flagged. Vertices downstream of a cycle
    /// that happen not to improve in that pass stay unflagged.
    SinglePass,

    /// `SinglePass`, then every vertex reachable from a flagged vertex is
    /// flagged too. This marks all vertices whose distance is unbounded below.
    Propagate,
}

/// Distances and flags produced by [`BellmanFordSolver::run`], indexed by CSR node.
///
/// Distances are still wide here; [`ShortestPathSolver::solve`] narrows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relaxation {
    pub distances: Vec<WideDistance>,
    pub in_negative_loop: Vec<bool>,
    pub summary: SolveSummary,
}

/// Solver implementing the Bellman-Ford algorithm for single-source shortest
/// paths over graphs that may contain negative weights.
///
/// Each run performs exactly `V - 1` passes; there is no early exit on
/// convergence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BellmanFordSolver {
    detection: NegativeLoopDetection,
}

impl BellmanFordSolver {
    pub fn new(detection: NegativeLoopDetection) -> Self {
        Self { detection }
    }

    pub fn detection(&self) -> NegativeLoopDetection {
        self.detection
    }

    /// Every node starts unreachable except `start`, which starts at 0.
    pub fn initial_distances(num_nodes: usize, start: usize) -> Vec<WideDistance> {
        let mut distances = vec![WIDE_UNREACHABLE; num_nodes];
        distances[start] = 0;
        distances
    }

    /// Runs one full relaxation pass over every node in CSR order and, within
    /// a node, over its edges in insertion order.
    ///
    /// The source distance is re-read for every edge, so an improvement made
    /// earlier in the pass is visible to later edges of the same pass. When
    /// `in_negative_loop` is given, every target improved by this pass is
    /// flagged in it.
    ///
    /// Returns the number of successful relaxations.
    pub fn relax_pass(
        graph: &GraphCSR,
        distances: &mut [WideDistance],
        mut in_negative_loop: Option<&mut [bool]>,
    ) -> usize {
        let mut relaxations = 0;

        for u in 0..graph.num_nodes {
            for i in graph.out_edges(u) {
                let v = graph.edge_targets[i];
                if let Some(improved) = relax(distances[u], graph.edge_weights[i], distances[v]) {
                    distances[v] = improved;
                    relaxations += 1;

                    if let Some(flags) = in_negative_loop.as_deref_mut() {
                        flags[v] = true;
                    }
                }
            }
        }

        relaxations
    }

    /// Flags every node reachable from an already-flagged node.
    fn propagate_flags(graph: &GraphCSR, in_negative_loop: &mut [bool]) {
        let mut queue: VecDeque<usize> = in_negative_loop
            .iter()
            .enumerate()
            .filter_map(|(u, &flagged)| flagged.then_some(u))
            .collect();

        while let Some(u) = queue.pop_front() {
            for i in graph.out_edges(u) {
                let v = graph.edge_targets[i];
                if !in_negative_loop[v] {
                    in_negative_loop[v] = true;
                    queue.push_back(v);
                }
            }
        }
    }

    /// Runs Bellman-Ford on a CSR view from node index `start`.
    ///
    /// `start` must be a valid node index of `graph`.
    pub fn run(&self, graph: &GraphCSR, start: usize) -> Relaxation {
        let num_nodes = graph.num_nodes;
        let mut distances = Self::initial_distances(num_nodes, start);
        let mut in_negative_loop = vec![false; num_nodes];
        let mut summary = SolveSummary::default();

        for _ in 0..num_nodes.saturating_sub(1) {
            summary.relaxations += Self::relax_pass(graph, &mut distances, None);
            summary.passes += 1;
        }

        if self.detection != NegativeLoopDetection::Disabled {
            summary.relaxations +=
                Self::relax_pass(graph, &mut distances, Some(in_negative_loop.as_mut_slice()));
            summary.passes += 1;

            if self.detection == NegativeLoopDetection::Propagate {
                Self::propagate_flags(graph, &mut in_negative_loop);
            }
        }

        summary.flagged = in_negative_loop.iter().filter(|&&flagged| flagged).count();

        Relaxation {
            distances,
            in_negative_loop,
            summary,
        }
    }
}

impl ShortestPathSolver for BellmanFordSolver {
    /// Validates the start vertex and every edge target, then runs the
    /// relaxation and writes distances and flags back onto the vertices.
    ///
    /// # Errors
    /// - `Error::InvalidStartVertex` if `start` is not in `graph`.
    /// - `Error::DanglingEdge` if any edge targets a missing vertex.
    ///
    /// In both cases no vertex is modified.
    fn solve(&self, graph: &mut Graph, start: VertexId) -> Result<SolveSummary, Error> {
        let start_index = graph
            .index_of(start)
            .ok_or(Error::InvalidStartVertex(start))?;
        let csr = GraphCSR::from_graph(graph)?;

        let relaxation = self.run(&csr, start_index);

        let results = relaxation
            .distances
            .iter()
            .zip(&relaxation.in_negative_loop);
        for (vertex, (&distance, &flagged)) in graph.vertices_mut().iter_mut().zip(results) {
            vertex.set_distance_from_start(narrow(distance));
            if flagged {
                vertex.mark_in_negative_loop();
            }
        }

        Ok(relaxation.summary)
    }
}

#[cfg(test)]
mod bellman_ford_tests {
    use super::*;
    use common::types::{Distance, UNREACHABLE, Weight};

    fn build_graph(ids: &[VertexId], edges: &[(VertexId, Weight, VertexId)]) -> Graph {
        let mut graph = Graph::new();
        for &id in ids {
            graph.add_vertex(id).unwrap();
        }
        for &(from, weight, to) in edges {
            graph.add_edge(from, weight, to).unwrap();
        }
        graph
    }

    fn distances(graph: &Graph) -> Vec<(VertexId, Distance)> {
        graph
            .vertices()
            .iter()
            .map(|v| (v.id(), v.distance_from_start()))
            .collect()
    }

    fn flagged(graph: &Graph) -> Vec<VertexId> {
        graph
            .vertices()
            .iter()
            .filter(|v| v.in_negative_loop())
            .map(|v| v.id())
            .collect()
    }

    /// 0 -> 1 -> 2 -> 1 with every edge at -5.
    fn self_reachable_negative_cycle() -> Graph {
        build_graph(&[0, 1, 2], &[(0, -5, 1), (1, -5, 2), (2, -5, 1)])
    }

    #[test]
    fn negative_edge_without_cycle() {
        let mut graph = build_graph(&[0, 1, 2], &[(0, 6, 1), (0, 7, 2), (2, -11, 1)]);

        let summary = BellmanFordSolver::default().solve(&mut graph, 0).unwrap();

        assert_eq!(distances(&graph), vec![(0, 0), (1, -4), (2, 7)]);
        assert!(flagged(&graph).is_empty());
        assert_eq!(summary.passes, 2);
        assert_eq!(summary.relaxations, 3);
    }

    #[test]
    fn negative_edge_without_cycle_is_not_flagged_by_detection() {
        let mut graph = build_graph(&[0, 1, 2], &[(0, 6, 1), (0, 7, 2), (2, -11, 1)]);

        let solver = BellmanFordSolver::new(NegativeLoopDetection::SinglePass);
        let summary = solver.solve(&mut graph, 0).unwrap();

        assert_eq!(distances(&graph), vec![(0, 0), (1, -4), (2, 7)]);
        assert!(!summary.has_negative_loop());
        assert_eq!(summary.passes, 3);
    }

    #[test]
    fn detection_pass_flags_reachable_negative_cycle() {
        let mut graph = self_reachable_negative_cycle();

        let solver = BellmanFordSolver::new(NegativeLoopDetection::SinglePass);
        let summary = solver.solve(&mut graph, 0).unwrap();

        assert!(summary.has_negative_loop());
        assert_eq!(flagged(&graph), vec![1, 2]);
        assert!(!graph.get_vertex(0).unwrap().in_negative_loop());
        assert_eq!(graph.get_vertex(0).unwrap().distance_from_start(), 0);
    }

    #[test]
    fn disabled_detection_never_flags() {
        let mut graph = self_reachable_negative_cycle();

        let summary = BellmanFordSolver::default().solve(&mut graph, 0).unwrap();

        assert!(flagged(&graph).is_empty());
        assert_eq!(summary.flagged, 0);
        // Two passes: 1 -> -5, 2 -> -10, 1 -> -15, then 2 -> -20, 1 -> -25.
        assert_eq!(distances(&graph), vec![(0, 0), (1, -25), (2, -20)]);
    }

    #[test]
    fn single_pass_misses_vertex_held_down_by_another_path() {
        // 3 is downstream of the cycle 1 <-> 2 but keeps its -1000 from the
        // direct edge during the extra pass.
        let edges = [(0, 0, 1), (0, -1000, 3), (1, 1, 2), (2, -2, 1), (2, 100, 3)];

        let mut single = build_graph(&[0, 1, 2, 3], &edges);
        BellmanFordSolver::new(NegativeLoopDetection::SinglePass)
            .solve(&mut single, 0)
            .unwrap();
        assert_eq!(flagged(&single), vec![1, 2]);

        let mut propagated = build_graph(&[0, 1, 2, 3], &edges);
        let summary = BellmanFordSolver::new(NegativeLoopDetection::Propagate)
            .solve(&mut propagated, 0)
            .unwrap();
        assert_eq!(flagged(&propagated), vec![1, 2, 3]);
        assert_eq!(summary.flagged, 3);
    }

    #[test]
    fn unreachable_negative_cycle_is_never_flagged() {
        let mut graph = build_graph(&[0, 1, 3, 4], &[(0, 2, 1), (3, -5, 4), (4, -5, 3)]);

        let solver = BellmanFordSolver::new(NegativeLoopDetection::Propagate);
        solver.solve(&mut graph, 0).unwrap();

        assert!(flagged(&graph).is_empty());
        assert_eq!(
            distances(&graph),
            vec![(0, 0), (1, 2), (3, UNREACHABLE), (4, UNREACHABLE)]
        );
    }

    #[test]
    fn negative_self_loop_on_single_vertex() {
        let mut graph = build_graph(&[0], &[(0, -1, 0)]);

        let solver = BellmanFordSolver::new(NegativeLoopDetection::SinglePass);
        let summary = solver.solve(&mut graph, 0).unwrap();

        // No mandatory pass for V = 1; the detection pass relaxes the loop once.
        assert_eq!(summary.passes, 1);
        assert_eq!(flagged(&graph), vec![0]);
        assert_eq!(graph.get_vertex(0).unwrap().distance_from_start(), -1);
    }

    #[test]
    fn missing_start_vertex_leaves_graph_untouched() {
        let mut graph = build_graph(&[0, 1], &[(0, 1, 1)]);
        let before = graph.clone();

        let result = BellmanFordSolver::default().solve(&mut graph, 7);

        assert_eq!(result, Err(Error::InvalidStartVertex(7)));
        assert_eq!(graph, before);
    }

    #[test]
    fn empty_graph_has_no_valid_start() {
        let mut graph = Graph::new();

        let result = BellmanFordSolver::default().solve(&mut graph, 0);
        assert_eq!(result, Err(Error::InvalidStartVertex(0)));
    }

    #[test]
    fn dangling_edge_fails_before_any_mutation() {
        let mut graph = build_graph(&[0, 1], &[(0, 1, 1), (1, 1, 5)]);
        let before = graph.clone();

        let result = BellmanFordSolver::default().solve(&mut graph, 0);

        assert_eq!(result, Err(Error::DanglingEdge { from: 1, to: 5 }));
        assert_eq!(graph, before);
    }

    #[test]
    fn isolated_vertex_keeps_sentinel() {
        let mut graph = build_graph(&[0, 1, 2], &[(0, 3, 1)]);

        BellmanFordSolver::new(NegativeLoopDetection::SinglePass)
            .solve(&mut graph, 0)
            .unwrap();

        let isolated = graph.get_vertex(2).unwrap();
        assert_eq!(isolated.distance_from_start(), UNREACHABLE);
        assert!(!isolated.in_negative_loop());
    }

    #[test]
    fn start_is_zero_before_relaxation() {
        let distances = BellmanFordSolver::initial_distances(4, 2);
        assert_eq!(
            distances,
            vec![WIDE_UNREACHABLE, WIDE_UNREACHABLE, 0, WIDE_UNREACHABLE]
        );
    }

    #[test]
    fn rerun_on_fresh_copy_is_identical() {
        let template = build_graph(
            &[3, 1, 0, 2],
            &[(0, 4, 1), (0, 1, 2), (2, -2, 1), (1, 3, 3), (3, -1, 2)],
        );
        let solver = BellmanFordSolver::new(NegativeLoopDetection::SinglePass);

        let mut first = template.clone();
        let mut second = template.clone();
        let first_summary = solver.solve(&mut first, 0).unwrap();
        let second_summary = solver.solve(&mut second, 0).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_summary, second_summary);
    }

    #[test]
    fn rerun_on_same_graph_reinitializes_distances() {
        let mut graph = build_graph(&[0, 1, 2], &[(0, 2, 1), (1, 2, 2)]);
        let solver = BellmanFordSolver::default();

        solver.solve(&mut graph, 0).unwrap();
        solver.solve(&mut graph, 1).unwrap();

        assert_eq!(distances(&graph), vec![(0, UNREACHABLE), (1, 0), (2, 2)]);
    }

    #[test]
    fn relaxation_order_follows_vertex_order() {
        // Listed in reverse, the chain 0 -> 1 -> 2 -> 3 needs every mandatory pass.
        let graph = build_graph(&[3, 2, 1, 0], &[(0, 1, 1), (1, 1, 2), (2, 1, 3)]);
        let csr = GraphCSR::from_graph(&graph).unwrap();
        let start = graph.index_of(0).unwrap();

        let mut distances = BellmanFordSolver::initial_distances(csr.num_nodes, start);
        let per_pass: Vec<usize> = (0..3)
            .map(|_| BellmanFordSolver::relax_pass(&csr, &mut distances, None))
            .collect();

        assert_eq!(per_pass, vec![1, 1, 1]);
        assert_eq!(distances, vec![3, 2, 1, 0]);
    }

    #[test]
    fn distances_never_increase_between_passes() {
        let graph = build_graph(
            &[0, 1, 2, 3],
            &[(0, 5, 1), (0, 2, 2), (2, 1, 1), (1, -3, 3), (2, 10, 3)],
        );
        let csr = GraphCSR::from_graph(&graph).unwrap();
        let mut distances = BellmanFordSolver::initial_distances(csr.num_nodes, 0);

        for _ in 0..csr.num_nodes {
            let before = distances.clone();
            BellmanFordSolver::relax_pass(&csr, &mut distances, None);
            for (old, new) in before.iter().zip(&distances) {
                assert!(new <= old);
            }
        }
        assert_eq!(distances, vec![0, 3, 2, 0]);
    }

    #[test]
    fn extreme_weights_clamp_on_write_back() {
        let mut graph = build_graph(
            &[0, 1, 2],
            &[(0, Weight::MIN, 1), (1, Weight::MIN, 2), (0, Weight::MAX, 2)],
        );

        BellmanFordSolver::default().solve(&mut graph, 0).unwrap();

        assert_eq!(graph.get_vertex(1).unwrap().distance_from_start(), Distance::MIN);
        assert_eq!(graph.get_vertex(2).unwrap().distance_from_start(), Distance::MIN);
    }

    #[test]
    fn cycle_below_distance_min_is_still_flagged() {
        let edges = [(0, Weight::MIN, 1), (1, -1, 2), (2, -1, 1)];

        let mut single = build_graph(&[0, 1, 2], &edges);
        let summary = BellmanFordSolver::new(NegativeLoopDetection::SinglePass)
            .solve(&mut single, 0)
            .unwrap();

        assert_eq!(flagged(&single), vec![1, 2]);
        assert_eq!(summary.flagged, 2);
        assert_eq!(
            distances(&single),
            vec![(0, 0), (1, Distance::MIN), (2, Distance::MIN)]
        );

        let mut propagated = build_graph(&[0, 1, 2], &edges);
        BellmanFordSolver::new(NegativeLoopDetection::Propagate)
            .solve(&mut propagated, 0)
            .unwrap();
        assert_eq!(flagged(&propagated), vec![1, 2]);
    }

    #[test]
    fn chained_minimum_weights_keep_improving_in_detection_pass() {
        // Each lap of 1 -> 2 -> 1 lowers the distance by 2^32.
        let edges = [(0, -1, 1), (1, Weight::MIN, 2), (2, Weight::MIN, 1)];
        let graph = build_graph(&[0, 1, 2], &edges);
        let csr = GraphCSR::from_graph(&graph).unwrap();

        let relaxation = BellmanFordSolver::new(NegativeLoopDetection::SinglePass).run(&csr, 0);

        assert_eq!(relaxation.in_negative_loop, vec![false, true, true]);
        assert!(relaxation.distances[1] < WideDistance::from(Distance::MIN));
    }
}
