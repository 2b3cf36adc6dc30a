#![allow(unused)]

mod common;

use jumbo::*;
use tempfile::TempDir;

const DISK_BLOCKS: usize = 80;

#[test]
fn test_mount_image_creates_and_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("jumbo.img");

    let mut fs = FileSystem::mount_image(&path).unwrap();
    assert_eq!(
        std::fs::metadata(&path).unwrap().len(),
        (DEFAULT_NUM_BLOCKS * BLOCK_SIZE) as u64
    );
    assert_eq!(fs.free_blocks(), DEFAULT_NUM_BLOCKS - 2);

    fs.mkdir("a").unwrap();
    fs.chdir(Some("a")).unwrap();
    fs.creat("f").unwrap();
    let data: Vec<u8> = (0..3 * BLOCK_SIZE + 17).map(|i| (i % 251) as u8).collect();
    fs.write("f", &data).unwrap();
    log!("File System initialized:\n{}", fs.dump().unwrap());
    fs.unmount().unwrap();

    // Following mount finds the same tree.
    let mut fs = FileSystem::mount_image(&path).unwrap();
    assert_eq!(fs.cwd(), fs.root());
    assert_eq!(fs.ls().unwrap().directories, vec!["a"]);
    fs.chdir(Some("a")).unwrap();
    let mut buf = vec![0u8; data.len() + 1];
    assert_eq!(fs.read("f", &mut buf).unwrap(), data.len());
    assert_eq!(&buf[..data.len()], &data[..]);
    log!("File System mounted:\n{}", fs.dump().unwrap());
}

#[test]
fn test_file_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("small.img");

    let disk = FileDisk::create(&path, DISK_BLOCKS).unwrap();
    let mut fs = FileSystem::format(disk).unwrap();
    assert_eq!(fs.free_blocks(), DISK_BLOCKS - 2);
    fs.creat("f").unwrap();
    fs.write("f", b"on disk").unwrap();
    fs.unmount().unwrap();

    let disk = FileDisk::open(&path).unwrap();
    assert_eq!(disk.num_blocks(), DISK_BLOCKS);
    let fs = FileSystem::mount(disk).unwrap();
    assert_eq!(fs.free_blocks(), DISK_BLOCKS - 4);
    let mut buf = [0u8; 16];
    let n = fs.read("f", &mut buf).unwrap();
    assert_eq!(&buf[..n], b"on disk");

    let mut block = Box::new([0u8; BLOCK_SIZE]);
    assert!(matches!(
        fs.store().device().read_block(DISK_BLOCKS, &mut block),
        Err(Error::InvalidBlockId(_))
    ));
}

#[test]
fn test_mount_garbage_image() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.img");
    std::fs::write(&path, vec![0xAB; 8 * BLOCK_SIZE]).unwrap();

    let result = FileSystem::mount_image(&path);
    assert!(matches!(result, Err(Error::InvalidSuperBlock)));
}
