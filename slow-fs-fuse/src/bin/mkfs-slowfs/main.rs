mod cli;

use std::error::Error;
use std::fs::OpenOptions;
use std::sync::Arc;

use clap::Parser;
use slow_fs::{SlowFileSystem, BLOCK_SIZE};
use slow_fs_fuse::BlockFile;

use cli::Cli;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let fd = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&cli.image)?;
    fd.set_len(cli.blocks * BLOCK_SIZE as u64)?;

    let device = Arc::new(BlockFile::new(fd)?);
    SlowFileSystem::format(device, cli.inode_table_blocks)?;

    println!(
        "{}: {} blocks of {} bytes, {} inode slots",
        cli.image.display(),
        cli.blocks,
        BLOCK_SIZE,
        cli.inode_table_blocks * 16,
    );
    Ok(())
}
