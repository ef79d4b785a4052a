use std::path::{Path, PathBuf};

use crate::task::TaskHandle;

/// Prefix shared by every downloaded model file.
pub const MODEL_FILE_PREFIX: &str = "meshy_model";

/// File name for the model produced by a task: `meshy_model_<id>.glb`.
pub fn model_file_name(handle: &TaskHandle) -> String {
    format!("{}_{}.glb", MODEL_FILE_PREFIX, handle)
}

/// Full destination path inside the output directory.
pub fn model_path(output_dir: &Path, handle: &TaskHandle) -> PathBuf {
    output_dir.join(model_file_name(handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_file_name() {
        let handle = TaskHandle::new("0193bfc5-ee4f");
        assert_eq!(model_file_name(&handle), "meshy_model_0193bfc5-ee4f.glb");
    }

    #[test]
    fn test_model_path() {
        let path = model_path(Path::new("/tmp/out"), &TaskHandle::new("x"));
        assert_eq!(path, PathBuf::from("/tmp/out/meshy_model_x.glb"));
    }
}
