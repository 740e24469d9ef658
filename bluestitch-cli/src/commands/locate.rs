//! Locate command - convert world block positions to tile indices.

use clap::Args;

use bluestitch::coord::{block_to_tile, range_from_blocks, tile_to_block, BLOCKS_PER_TILE};

use crate::error::CliError;

/// Arguments for the locate command.
#[derive(Debug, Args)]
pub struct LocateArgs {
    /// Block X position
    #[arg(long, allow_negative_numbers = true)]
    pub x: i32,

    /// Block Z position
    #[arg(long, allow_negative_numbers = true)]
    pub z: i32,

    /// Block X of the opposite corner, to locate a whole area
    #[arg(long, allow_negative_numbers = true, requires = "to_z")]
    pub to_x: Option<i32>,

    /// Block Z of the opposite corner
    #[arg(long, allow_negative_numbers = true, requires = "to_x")]
    pub to_z: Option<i32>,
}

/// Run the locate command.
pub fn run(args: LocateArgs) -> Result<(), CliError> {
    for line in describe(&args) {
        println!("{}", line);
    }
    Ok(())
}

fn describe(args: &LocateArgs) -> Vec<String> {
    let (tile_x, tile_z) = (block_to_tile(args.x), block_to_tile(args.z));
    let mut lines = vec![format!(
        "Block ({}, {}) is in tile ({}, {}), covering blocks x {}..={} z {}..={}",
        args.x,
        args.z,
        tile_x,
        tile_z,
        tile_to_block(tile_x),
        tile_to_block(tile_x) + BLOCKS_PER_TILE as i64 - 1,
        tile_to_block(tile_z),
        tile_to_block(tile_z) + BLOCKS_PER_TILE as i64 - 1,
    )];

    if let (Some(to_x), Some(to_z)) = (args.to_x, args.to_z) {
        let range = range_from_blocks(args.x, args.z, to_x, to_z);
        lines.push(format!(
            "Area covers tiles {} ({} tiles)",
            range,
            range.tile_count()
        ));
        lines.push(format!(
            "Render with: --start-x={} --start-z={} --end-x={} --end-z={}",
            range.start.x, range.start.z, range.end.x, range.end.z
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_position() {
        let lines = describe(&LocateArgs {
            x: -1,
            z: 1024,
            to_x: None,
            to_z: None,
        });

        assert_eq!(
            lines,
            vec!["Block (-1, 1024) is in tile (-1, 2), covering blocks x -512..=-1 z 1024..=1535"]
        );
    }

    #[test]
    fn test_area() {
        let lines = describe(&LocateArgs {
            x: 600,
            z: -513,
            to_x: Some(-10),
            to_z: Some(0),
        });

        assert_eq!(lines[1], "Area covers tiles (-1, -2)..=(1, 0) (9 tiles)");
        assert_eq!(
            lines[2],
            "Render with: --start-x=-1 --start-z=-2 --end-x=1 --end-z=0"
        );
    }
}
