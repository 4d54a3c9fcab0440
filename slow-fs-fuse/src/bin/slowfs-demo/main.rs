//! End-to-end walk through the stack: format an image, mount it,
//! create files and directories through a process, detach, remount
//! and check everything came back.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use kernel::{start_kernel, OpenFlag, Process, Whence};
use slow_fs::{SlowFileSystem, BLOCK_SIZE};
use slow_fs_fuse::BlockFile;

/// Exercise a slowfs image through the whole kernel stack.
#[derive(Parser)]
struct Cli {
    /// Image file to create and play with
    #[arg(default_value = "slowfs.img")]
    image: PathBuf,

    /// Volume size in 4096-byte blocks
    #[arg(long, default_value_t = 64)]
    blocks: u64,
}

fn open_image(cli: &Cli, truncate: bool) -> Result<Arc<BlockFile>, Box<dyn Error>> {
    let fd = OpenOptions::new()
        .read(true)
        .write(true)
        .create(truncate)
        .truncate(truncate)
        .open(&cli.image)?;
    if truncate {
        fd.set_len(cli.blocks * BLOCK_SIZE as u64)?;
    }
    Ok(Arc::new(BlockFile::new(fd)?))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    // Build the filesystem on a fresh image, then boot a kernel and
    // hand its syscall table to a process.
    let volume = SlowFileSystem::format(open_image(&cli, true)?, 5)?;
    let kernel = start_kernel();
    let mut proc = Process::new(kernel.clone());
    proc.mount("/", volume)?;

    let fd = proc.open("/file", OpenFlag::CREATE | OpenFlag::RDWR, 0o644)?;
    proc.write(fd, b"Hello world").map_err(|p| p.reason)?;
    proc.seek(fd, 0, Whence::Set)?;
    println!("read back: {:?}", String::from_utf8(proc.read(fd, 11)?)?);
    proc.seek(fd, 6, Whence::Set)?;
    assert_eq!(proc.read(fd, 5)?, b"world");
    proc.close(fd)?;

    proc.mkdir("/mydir", 0o755)?;
    let fd = proc.open("/mydir/file", OpenFlag::CREATE | OpenFlag::RDWR, 0o644)?;
    proc.write(fd, b"Im in a subdir").map_err(|p| p.reason)?;
    proc.close(fd)?;

    for entry in proc.listdir("/")? {
        let stat = proc.stat(&format!("/{}", entry.name))?;
        println!("{:10} ino={} size={}", entry.name, entry.ino, stat.size);
    }

    // Detach, reopen the same image, and prove it all persisted.
    proc.unmount("/")?;
    let mut proc = Process::new(kernel);
    proc.mount("/", SlowFileSystem::mount(open_image(&cli, false)?)?)?;

    let fd = proc.open("/mydir/file", OpenFlag::read_only(), 0o644)?;
    let back = proc.read(fd, 14)?;
    proc.close(fd)?;
    println!("after remount: {:?}", String::from_utf8(back)?);

    Ok(())
}
