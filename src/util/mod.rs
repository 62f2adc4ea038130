// Utility Module
// Key file armor and on-disk artifacts

pub mod encoding;
pub mod file_ops;
