use std::io;
use std::path::Path;

pub trait DiskSpace: Send + Sync {
    /// Free bytes available to this process on the filesystem holding `path`.
    fn available(&self, path: &Path) -> io::Result<u64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDiskSpace;

impl DiskSpace for SystemDiskSpace {
    fn available(&self, path: &Path) -> io::Result<u64> {
        fs4::available_space(path)
    }
}
