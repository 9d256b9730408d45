//! `topomap project` and `topomap city`: the geo helpers on their own.

use serde::Serialize;

use topomap_core::geo::{CityLookup, CityTable, project as project_point};

use crate::cli::{CityArgs, GlobalOpts, ProjectArgs};
use crate::error::CliError;
use crate::output;

use super::load_config;

#[derive(Debug, Serialize)]
struct Projection {
    latitude: f64,
    longitude: f64,
    svg_x: f32,
    svg_y: f32,
}

impl Projection {
    fn of(latitude: f64, longitude: f64) -> Self {
        let (svg_x, svg_y) = project_point(latitude, longitude);
        Self {
            latitude,
            longitude,
            svg_x,
            svg_y,
        }
    }
}

fn detail(p: &Projection) -> String {
    format!(
        "lat {:.4}, lon {:.4} -> x {:.1}, y {:.1}",
        p.latitude, p.longitude, p.svg_x, p.svg_y
    )
}

fn plain(p: &Projection) -> String {
    format!("{} {}", p.svg_x, p.svg_y)
}

pub fn project(args: &ProjectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if !(-90.0..=90.0).contains(&args.latitude) || !(-180.0..=180.0).contains(&args.longitude) {
        return Err(CliError::Validation {
            field: "coordinates".into(),
            reason: format!(
                "latitude must be within ±90 and longitude within ±180, got {}, {}",
                args.latitude, args.longitude
            ),
        });
    }
    let projection = Projection::of(args.latitude, args.longitude);
    let out = output::render_single(&global.output, &projection, detail, plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Debug, Serialize)]
struct City {
    key: String,
    #[serde(flatten)]
    projection: Projection,
}

pub fn city(args: CityArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let dataset = match args.dataset {
        Some(path) => path,
        None => load_config(global)?
            .defaults
            .city_dataset
            .ok_or(CliError::NoCityDataset)?,
    };

    let table = CityTable::load(&dataset)?;
    let (longitude, latitude) = table
        .coordinates(&args.key)
        .ok_or_else(|| CliError::CityNotFound {
            key: args.key.clone(),
        })?;

    let city = City {
        key: args.key,
        projection: Projection::of(latitude, longitude),
    };
    let out = output::render_single(
        &global.output,
        &city,
        |c| format!("{}: {}", c.key, detail(&c.projection)),
        |c| plain(&c.projection),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
