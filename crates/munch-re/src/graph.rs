use petgraph::graph::{Graph, NodeIndex};

use crate::dfa::Dfa;

impl Dfa {
    /// Builds a petgraph view of the automaton for rendering with
    /// `petgraph::dot::Dot`. Node `i` is DFA state `i`; accepting states are
    /// labelled with their token (or `accept` for untagged automata) and the
    /// start state is prefixed with `->`.
    pub fn to_graph(&self) -> Graph<String, char> {
        let mut graph: Graph<String, char> = Graph::with_capacity(self.len(), self.len());

        for (id, state) in self.states() {
            let mut label = id.to_string();
            if id == self.start() {
                label = format!("-> {}", label);
            }
            if state.is_accepting() {
                let token = state.token_type().map_or("accept", |t| t.name());
                label = format!("{} [{}]", label, token);
            }
            graph.add_node(label);
        }

        for (id, state) in self.states() {
            for (c, next) in state.transitions() {
                graph.add_edge(NodeIndex::new(id.index()), NodeIndex::new(next.index()), *c);
            }
        }

        graph
    }
}
