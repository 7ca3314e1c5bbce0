use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::logging::build_dispatch;
use crate::pipeline::Pipeline;
use crate::settings::load_settings;

pub fn run(
    query_file: &Path,
    output_dir: Option<PathBuf>,
    threshold: Option<f64>,
    config: Option<&Path>,
) -> Result<()> {
    let settings = load_settings(config)?.with_overrides(output_dir, threshold)?;
    let (dispatch, _guard) = build_dispatch(&settings)?;

    let result = Pipeline::new(settings, dispatch.clone()).run(query_file);
    if let Err(e) = &result {
        tracing::dispatcher::with_default(&dispatch, || tracing::error!("Analysis aborted: {e}"));
    }
    result.map(|_| ())
}
