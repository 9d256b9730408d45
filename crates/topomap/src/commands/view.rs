//! `topomap view`: discover, then print a laid-out view.

use std::fmt::Write as _;

use tabled::Tabled;

use topomap_core::{Topology, TopologyQuery};

use crate::cli::{GlobalOpts, ViewArgs};
use crate::error::CliError;
use crate::output::{self, heading, render_table, should_color};

use super::build_service;

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    node_type: String,
    #[tabled(rename = "Count")]
    count: u32,
    #[tabled(rename = "X")]
    x: String,
    #[tabled(rename = "Y")]
    y: String,
}

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Link")]
    id: String,
    #[tabled(rename = "A side")]
    aside: String,
    #[tabled(rename = "Z side")]
    zside: String,
    #[tabled(rename = "Direction")]
    direction: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn node_rows(topology: &Topology) -> Vec<NodeRow> {
    topology
        .nodes
        .iter()
        .map(|(key, node)| {
            let (x, y) = topology
                .locations
                .get(key)
                .map_or((0.0, 0.0), |l| (l.svg_x, l.svg_y));
            NodeRow {
                key: key.clone(),
                name: node.name.clone(),
                node_type: node.node_type.to_string(),
                count: node.count,
                x: format!("{x:.1}"),
                y: format!("{y:.1}"),
            }
        })
        .collect()
}

fn link_rows(topology: &Topology) -> Vec<LinkRow> {
    topology
        .links
        .values()
        .map(|link| LinkRow {
            id: link.link_id.clone(),
            aside: link.aside.clone(),
            zside: link.zside.clone(),
            direction: link.direction.to_string(),
            status: link.status.to_string(),
        })
        .collect()
}

fn detail(topology: &Topology, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} nodes)",
        heading(&format!("Nodes: {}", topology.name), color),
        topology.nodes.len()
    );
    let _ = writeln!(out, "{}", render_table(&node_rows(topology)));
    if !topology.links.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", heading("Links", color));
        let _ = write!(out, "{}", render_table(&link_rows(topology)));
    }
    out
}

pub async fn handle(args: ViewArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let service = build_service(global, &args.source)?;
    service.discover_now().await?;

    let mut query = TopologyQuery::new(args.layout);
    if let Some(b) = args.bbox {
        query = query.with_bbox(b.x, b.y, b.x1, b.y1);
    }
    let topology = service.get(&query).await?;

    let color = should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &topology,
        |t| detail(t, color),
        |t| t.nodes.keys().cloned().collect::<Vec<_>>().join("\n"),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
