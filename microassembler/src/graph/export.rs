//! Read-only dumps of the graph for debugging.
use super::Graph;
use std::io::Write;

impl Graph {
    /// Graphviz. Each edge is written once, from its smaller endpoint.
    pub fn write_dot<W: Write>(&self, mut wtr: W) -> std::io::Result<()> {
        writeln!(wtr, "digraph G {{")?;
        for (id, node) in self.alive_nodes() {
            let color = if node.is_source {
                "green"
            } else if node.is_sink {
                "red"
            } else if node.is_ref {
                "gray"
            } else if node.is_tumor_only() {
                "orange"
            } else {
                "white"
            };
            writeln!(
                wtr,
                "  {} [label=\"{}:{}:{:.1}\" style=filled fillcolor={}];",
                id,
                id,
                node.len(),
                node.mean_cov(),
                color
            )?;
        }
        for (id, node) in self.alive_nodes() {
            for edge in node.edges.iter().filter(|e| id <= e.to) {
                writeln!(
                    wtr,
                    "  {} -> {} [label=\"{}:{}\"];",
                    id, edge.to, edge.dir, edge.count
                )?;
            }
        }
        writeln!(wtr, "}}")
    }
    pub fn write_fasta<W: Write>(&self, mut wtr: W) -> std::io::Result<()> {
        for (id, node) in self.alive_nodes() {
            writeln!(
                wtr,
                ">{}_{} len={} cov={:.2} comp={}",
                self.ref_name,
                id,
                node.len(),
                node.mean_cov(),
                node.component
            )?;
            writeln!(wtr, "{}", String::from_utf8_lossy(node.seq()))?;
        }
        Ok(())
    }
    /// One line per mate pair: name, read ids, and the component of each mate (`-` if none).
    pub fn write_pairs<W: Write>(&self, mut wtr: W) -> std::io::Result<()> {
        let comp = |id: usize| match self.read_component(id) {
            Some(comp) => comp.to_string(),
            None => "-".to_string(),
        };
        for (id, read) in self.reads.iter() {
            if let Some(mate) = read.mate.filter(|&mate| id < mate) {
                writeln!(
                    wtr,
                    "{}\t{}\t{}\t{}\t{}",
                    read.name,
                    id,
                    mate,
                    comp(id),
                    comp(mate)
                )?;
            }
        }
        Ok(())
    }
}
