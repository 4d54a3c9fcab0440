use std::path::PathBuf;

use clap::Parser;

/// Create and format a slowfs image file.
#[derive(Parser)]
pub struct Cli {
    /// Path of the image file to create (overwritten if present)
    pub image: PathBuf,

    /// Volume size in 4096-byte blocks
    #[arg(long, default_value_t = 64)]
    pub blocks: u64,

    /// Blocks reserved for the inode table (16 inode slots each)
    #[arg(long, default_value_t = 5)]
    pub inode_table_blocks: u32,
}
