//! Mermaid rendering of the workflow graph.

use std::fmt::Write;

use manus_protocol::Goto;
use manus_protocol::NodeId;
use manus_protocol::TeamMember;
use manus_protocol::nodes::END;
use strum::IntoEnumIterator;

use crate::validation::is_allowed_handoff;

const START: &str = "__start__";

/// Renders every node and hand-off edge. Supervisor edges are limited to
/// `team_members`; conditional edges are dotted.
pub fn mermaid(team_members: &[TeamMember]) -> String {
    let targets: Vec<Goto> = NodeId::iter()
        .map(Goto::Node)
        .chain(std::iter::once(Goto::End))
        .collect();
    let reachable = |from: NodeId, to: Goto| {
        is_allowed_handoff(from, to)
            && match (from, to) {
                (NodeId::Supervisor, Goto::Node(node)) => {
                    team_members.iter().any(|member| member.node() == node)
                }
                _ => true,
            }
    };

    let mut out = String::from("graph TD;\n");
    let _ = writeln!(out, "\t{START}([<p>{START}</p>]):::first");
    for node in NodeId::iter() {
        let _ = writeln!(out, "\t{node}({node})");
    }
    let _ = writeln!(out, "\t{END}([<p>{END}</p>]):::last");
    let _ = writeln!(out, "\t{START} --> {};", NodeId::Coordinator);

    for from in NodeId::iter() {
        let edges: Vec<Goto> = targets
            .iter()
            .copied()
            .filter(|to| reachable(from, *to))
            .collect();
        let arrow = if edges.len() > 1 { "-.->" } else { "-->" };
        for to in edges {
            let _ = writeln!(out, "\t{from} {arrow} {to};");
        }
    }

    out.push_str("\tclassDef default fill:#f2f0ff,line-height:1.2\n");
    out.push_str("\tclassDef first fill-opacity:0\n");
    out.push_str("\tclassDef last fill:#bfb6fc\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_has_every_edge() {
        let graph = mermaid(&TeamMember::all());
        assert!(graph.starts_with("graph TD;\n"));
        assert!(graph.contains("\t__start__ --> coordinator;\n"));
        assert!(graph.contains("\tcoordinator -.-> planner;\n"));
        assert!(graph.contains("\tcoordinator -.-> __end__;\n"));
        assert!(graph.contains("\tplanner -.-> supervisor;\n"));
        assert!(graph.contains("\tsupervisor -.-> browser;\n"));
        assert!(graph.contains("\tsupervisor -.-> __end__;\n"));
        assert!(graph.contains("\tresearcher --> supervisor;\n"));
        assert!(graph.contains("\treporter --> supervisor;\n"));
    }

    #[test]
    fn supervisor_edges_follow_the_team() {
        let graph = mermaid(&[TeamMember::Reporter]);
        assert!(graph.contains("\tsupervisor -.-> reporter;\n"));
        assert!(!graph.contains("supervisor -.-> coder"));
    }
}
