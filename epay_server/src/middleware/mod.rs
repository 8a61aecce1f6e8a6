mod checksum;

pub use checksum::{ChecksumMiddlewareFactory, ChecksumMiddlewareService};
