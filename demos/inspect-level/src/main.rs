/*
 * Copyright (C) Oscar Shrimpton 2020
 *
 * This program is free software: you can redistribute it and/or modify it
 * under the terms of the GNU General Public License as published by the Free
 * Software Foundation, either version 3 of the License, or (at your option)
 * any later version.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
 * FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
 * more details.
 *
 * You should have received a copy of the GNU General Public License along
 * with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Loads a level and prints what the runtime structures make of it.
//!
//! Usage: `inspect-level <map.bsp> [--config <config.json>] [x y z]`
//! The point is in world units.

use aldgate_levels::traits::tree::LeafFlags;
use aldgate_scene::error::full_error_display;
use aldgate_scene::{LevelConfig, LevelContext};
use aldgate_types::Vector3;

use anyhow::{bail, Context, Result};
use log::info;
use std::path::PathBuf;

struct Args {
    map: PathBuf,
    config: Option<PathBuf>,
    point: Option<Vector3>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut map = None;
    let mut config = None;
    let mut coords = vec![];

    while let Some(arg) = args.next() {
        if arg == "--config" {
            config = Some(args.next().context("--config needs a file")?.into());
        } else if map.is_none() {
            map = Some(PathBuf::from(arg));
        } else {
            coords.push(
                arg.parse::<f32>()
                    .with_context(|| format!("Invalid coordinate {}", arg))?,
            );
        }
    }

    let point = match coords[..] {
        [] => None,
        [x, y, z] => Some(Vector3::new(x, y, z)),
        _ => bail!("Expected 3 coordinates, got {}", coords.len()),
    };

    Ok(Args {
        map: map.context("Usage: inspect-level <map.bsp> [--config <config.json>] [x y z]")?,
        config,
        point,
    })
}

fn load_config(path: &Option<PathBuf>) -> Result<LevelConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Error reading config {}", path.display()))?;
            serde_json::from_str(&text).context("Error parsing config")
        }
        None => Ok(LevelConfig::default()),
    }
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{}", full_error_display(&err));
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    // Initialise logger
    simplelog::TermLogger::init(
        log::LevelFilter::Debug,
        simplelog::ConfigBuilder::new()
            .set_max_level(log::LevelFilter::Debug)
            .set_thread_mode(simplelog::ThreadLogMode::Names)
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .context("Error initialising logger")?;

    let args = parse_args()?;
    let config = load_config(&args.config)?;

    let mut ctx = LevelContext::new(config);
    ctx.load_file(&args.map)?;
    let level = ctx.level().context("Level went missing after loading")?;

    println!("VBSP version {}, map revision {}", level.version(), level.map_revision());
    println!("{} entities", level.entities().len());
    println!(
        "{} world leaves, {} clusters, PVS {}",
        level.tree().world_leaves().len(),
        level.tree().num_clusters(),
        if ctx.has_visibility() { "complete" } else { "missing" }
    );
    println!(
        "{} ambient probes, {} lights",
        level.lighting().probes().len(),
        level.lighting().lights().len()
    );

    let point = match args.point {
        Some(point) => point,
        None => return Ok(()),
    };

    let leaf = ctx.find_leaf(&point);
    let cluster = ctx.leaf_cluster(leaf);
    println!();
    println!("Point {:?} is in leaf {} (cluster {})", point.as_slice(), leaf, cluster);

    ctx.update_visibility(&point);
    let visible = ctx.visible_leaves();
    let sky = visible
        .leaves()
        .iter()
        .filter(|l| l.flags.intersects(LeafFlags::SKY | LeafFlags::SKY2D))
        .count();
    println!("{} leaves potentially visible, {} of them see the sky", visible.len(), sky);
    info!("{} faces potentially visible", visible.visible_faces(level.map()).len());

    let sample = ctx.get_lighting(&point, Some(leaf));
    match sample.probe {
        Some(probe) => println!("Ambient from probe {}: {:?}", probe, sample.ambient.average().as_slice()),
        None => println!("Ambient (default): {:?}", sample.ambient.average().as_slice()),
    }
    for light in sample.lights.iter() {
        println!(
            "  light {}: colour {:?} from {:?}",
            light.light,
            light.color.as_slice(),
            light.direction.as_slice()
        );
    }

    Ok(())
}
