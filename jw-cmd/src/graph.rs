//! Text rendering of the ecological knowledge graph.

use std::collections::HashMap;

use jw_client::MonitorClient;
use jw_graph::NodeCategory;
use jw_model::GraphData;

pub async fn run_graph(client: &MonitorClient) -> anyhow::Result<()> {
    let graph = client.graph().await?;

    println!(
        "Knowledge graph: {} nodes, {} relations",
        graph.nodes.len(),
        graph.links.len()
    );

    for (category, members) in grouped_names(&graph) {
        println!("\n{} ({})", category.display_name(), members.len());
        for name in members {
            println!("  {name}");
        }
    }

    if graph.links.is_empty() {
        return Ok(());
    }

    // Endpoints referencing ids absent from the node list render as "?";
    // the row is still worth showing.
    let names: HashMap<i64, &str> = graph.nodes.iter().map(|n| (n.id, n.name.as_str())).collect();
    println!("\nRelations ({})", graph.links.len());
    for link in &graph.links {
        println!(
            "  {} -[{}]-> {}",
            names.get(&link.source).copied().unwrap_or("?"),
            link.relation,
            names.get(&link.target).copied().unwrap_or("?"),
        );
    }
    Ok(())
}

/// Node names bucketed by category, in legend order with `Other` last.
/// Empty categories are omitted.
fn grouped_names(graph: &GraphData) -> Vec<(NodeCategory, Vec<&str>)> {
    let groups = [
        NodeCategory::Species,
        NodeCategory::Factor,
        NodeCategory::Consequence,
        NodeCategory::Other,
    ];
    groups
        .into_iter()
        .filter_map(|category| {
            let members: Vec<&str> = graph
                .nodes
                .iter()
                .filter(|n| NodeCategory::from_label(&n.label) == category)
                .map(|n| n.name.as_str())
                .collect();
            (!members.is_empty()).then_some((category, members))
        })
        .collect()
}
