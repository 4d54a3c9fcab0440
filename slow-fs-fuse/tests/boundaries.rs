//! Edge-of-contract tests: name limits, the direct-pointer ceiling,
//! sparse files and descriptor lifetimes.

mod common;

use kernel::{OpenFlag, Whence};
use slow_fs::layout::MAX_FILE_SIZE;
use slow_fs::BLOCK_SIZE;
use vfs::Error;

use common::booted;

#[test]
fn filename_length_limits() {
    let dir = tempfile::tempdir().unwrap();
    let proc = booted(&dir.path().join("fs.img"), 64);

    proc.mkdir("/a", 0o755).unwrap();
    proc.mkdir(&format!("/{}", "n".repeat(27)), 0o755).unwrap();
    assert_eq!(
        proc.mkdir(&format!("/{}", "n".repeat(28)), 0o755).unwrap_err(),
        Error::InvalidName
    );
    assert_eq!(proc.mkdir("/héllo", 0o755).unwrap_err(), Error::InvalidName);
}

#[test]
fn a_file_can_fill_every_direct_pointer_but_not_more() {
    let dir = tempfile::tempdir().unwrap();
    // 128 blocks so the data region can hold all 60 file blocks.
    let mut proc = booted(&dir.path().join("fs.img"), 128);

    let fd = proc
        .open("/big", OpenFlag::CREATE | OpenFlag::RDWR, 0o644)
        .unwrap();

    // Exactly the maximum size is fine...
    proc.seek(fd, MAX_FILE_SIZE as i64 - 1, Whence::Set).unwrap();
    assert_eq!(proc.write(fd, b"z").unwrap(), 1);
    assert_eq!(proc.stat("/big").unwrap().size as usize, MAX_FILE_SIZE);

    // ...one byte past it is not.
    let partial = proc.write(fd, b"z").unwrap_err();
    assert_eq!(partial.reason, Error::FileTooBig);
    assert_eq!(partial.written, 0);
    proc.close(fd).unwrap();
}

#[test]
fn an_oversized_write_stops_at_the_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let mut proc = booted(&dir.path().join("fs.img"), 128);

    let fd = proc
        .open("/big", OpenFlag::CREATE | OpenFlag::WRONLY, 0o644)
        .unwrap();
    let payload = vec![0xAB; MAX_FILE_SIZE + 1];
    let partial = proc.write(fd, &payload).unwrap_err();
    assert_eq!(partial.written, MAX_FILE_SIZE);
    assert_eq!(partial.reason, Error::FileTooBig);
    assert_eq!(proc.stat("/big").unwrap().size as usize, MAX_FILE_SIZE);
}

#[test]
fn sparse_files_read_zeros_in_the_gap() {
    let dir = tempfile::tempdir().unwrap();
    let mut proc = booted(&dir.path().join("fs.img"), 64);

    let fd = proc
        .open("/sparse", OpenFlag::CREATE | OpenFlag::RDWR, 0o644)
        .unwrap();
    let gap = 10 * BLOCK_SIZE;
    proc.seek(fd, gap as i64, Whence::Set).unwrap();
    proc.write(fd, b"x").unwrap();
    assert_eq!(proc.stat("/sparse").unwrap().size as usize, gap + 1);

    proc.seek(fd, 0, Whence::Set).unwrap();
    let data = proc.read(fd, gap + 1).unwrap();
    assert_eq!(data.len(), gap + 1);
    assert!(data[..gap].iter().all(|&b| b == 0));
    assert_eq!(data[gap], b'x');
}

#[test]
fn seek_variants() {
    let dir = tempfile::tempdir().unwrap();
    let mut proc = booted(&dir.path().join("fs.img"), 64);

    let fd = proc
        .open("/f", OpenFlag::CREATE | OpenFlag::RDWR, 0o644)
        .unwrap();
    proc.write(fd, b"0123456789").unwrap();

    assert_eq!(proc.seek(fd, 2, Whence::Set).unwrap(), 2);
    assert_eq!(proc.seek(fd, 3, Whence::Cur).unwrap(), 5);
    assert_eq!(proc.seek(fd, -4, Whence::Cur).unwrap(), 1);
    assert_eq!(proc.seek(fd, -1, Whence::End).unwrap(), 9);
    assert_eq!(proc.read(fd, 1).unwrap(), b"9");

    // Past the end is allowed; before the start is not.
    assert_eq!(proc.seek(fd, 100, Whence::End).unwrap(), 110);
    assert_eq!(
        proc.seek(fd, -11, Whence::Set).unwrap_err(),
        Error::InvalidSeek
    );
}

#[test]
fn descriptor_reuse_and_double_close() {
    let dir = tempfile::tempdir().unwrap();
    let mut proc = booted(&dir.path().join("fs.img"), 64);

    let fd = proc
        .open("/f", OpenFlag::CREATE | OpenFlag::RDWR, 0o644)
        .unwrap();
    proc.close(fd).unwrap();
    assert_eq!(proc.close(fd).unwrap_err(), Error::BadFd);

    // The freed slot is handed out again; the stale value stays dead
    // only until then.
    let fd2 = proc.open("/f", OpenFlag::read_only(), 0o644).unwrap();
    assert_eq!(fd2, fd);
    proc.close(fd2).unwrap();
}

#[test]
fn overwrites_do_not_grow_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut proc = booted(&dir.path().join("fs.img"), 64);

    let fd = proc
        .open("/f", OpenFlag::CREATE | OpenFlag::RDWR, 0o644)
        .unwrap();
    proc.write(fd, b"Hello world").unwrap();
    proc.seek(fd, 0, Whence::Set).unwrap();
    proc.write(fd, b"Howdy").unwrap();

    assert_eq!(proc.stat("/f").unwrap().size, 11);
    proc.seek(fd, 0, Whence::Set).unwrap();
    assert_eq!(proc.read(fd, 11).unwrap(), b"Howdy world");
}

#[test]
fn truncate_empties_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut proc = booted(&dir.path().join("fs.img"), 64);

    let fd = proc
        .open("/f", OpenFlag::CREATE | OpenFlag::WRONLY, 0o644)
        .unwrap();
    proc.write(fd, &vec![1u8; 2 * BLOCK_SIZE]).unwrap();
    proc.close(fd).unwrap();

    let fd = proc
        .open("/f", OpenFlag::TRUNC | OpenFlag::RDWR, 0o644)
        .unwrap();
    assert_eq!(proc.stat("/f").unwrap().size, 0);
    assert_eq!(proc.read(fd, 1).unwrap(), b"");
    proc.write(fd, b"tiny").unwrap();
    assert_eq!(proc.stat("/f").unwrap().size, 4);
}
