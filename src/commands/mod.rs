use std::path::{
    Path,
    PathBuf,
};

pub mod convert;
pub mod vacuum;
pub mod pot;
pub mod slabfreeze;
pub mod interpolate;
pub mod neighbors;
pub mod angles;


/// Default output path for commands that rewrite a single file:
/// `<stem>_<op><suffix>` next to the input.
pub(crate) fn default_output(input: &Path, output: Option<&PathBuf>, op: &str) -> PathBuf {
    match output {
        Some(o) => o.clone(),
        None => {
            let stem = input.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let suffix = input.extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            input.with_file_name(format!("{}_{}{}", stem, op, suffix))
        },
    }
}
