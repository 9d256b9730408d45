//! `topomap discover`: one discovery cycle, summarized.

use std::fmt::Write as _;

use serde::Serialize;

use crate::cli::{DiscoverArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::build_service;

#[derive(Debug, Serialize)]
struct Summary {
    topology: String,
    service: String,
    area: u8,
    nodes: usize,
    locations: usize,
    links: usize,
    finished_at: String,
}

fn detail(s: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Topology:   {} ({} area {})", s.topology, s.service, s.area);
    let _ = writeln!(out, "Nodes:      {}", s.nodes);
    let _ = writeln!(out, "Locations:  {}", s.locations);
    let _ = writeln!(out, "Links:      {}", s.links);
    let _ = write!(out, "Finished:   {}", s.finished_at);
    out
}

pub async fn handle(args: DiscoverArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let service = build_service(global, &args.source)?;
    let report = service.discover_now().await?;
    let metadata = service.metadata();

    let summary = Summary {
        topology: metadata.name,
        service: metadata.service_name,
        area: metadata.service_area,
        nodes: report.nodes,
        locations: report.locations,
        links: report.links,
        finished_at: report.finished_at.to_rfc3339(),
    };
    let out = output::render_single(&global.output, &summary, detail, |s| {
        format!("{} {} {}", s.nodes, s.locations, s.links)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
