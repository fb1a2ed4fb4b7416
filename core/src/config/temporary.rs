use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::dotdict::DotDict;
use crate::errors::CollectionError;
use crate::mapping::Mapping;
use crate::value::Value;


/// Config overrides that undo themselves when dropped.
///
/// Derefs to the overridden config, so guards nest: pass `&mut guard` to
/// another `set_temporary_config` call and each level restores its own
/// snapshot in turn.
pub struct TemporaryConfig<'a> {
    config: &'a mut DotDict,
    saved: Option<DotDict>,
}

/// Apply dotted-path overrides (`"worker.concurrency"`) to `config`,
/// creating missing sections, until the returned guard is dropped.
///
/// If an override cannot be applied the config is restored before the
/// error is returned.
pub fn set_temporary_config<'a, I, S, V>(
    config: &'a mut DotDict,
    overrides: I,
) -> Result<TemporaryConfig<'a>, CollectionError>
where
    I: IntoIterator<Item = (S, V)>,
    S: AsRef<str>,
    V: Into<Value>,
{
    let saved = config.copy();
    for (path, value) in overrides {
        if let Err(e) = config.set_path(path.as_ref(), value) {
            *config = saved;
            return Err(e);
        }
    }
    debug!(keys = config.len(), "temporary config applied");
    Ok(TemporaryConfig {
        config,
        saved: Some(saved),
    })
}

impl Deref for TemporaryConfig<'_> {
    type Target = DotDict;

    fn deref(&self) -> &DotDict {
        &*self.config
    }
}

impl DerefMut for TemporaryConfig<'_> {
    fn deref_mut(&mut self) -> &mut DotDict {
        &mut *self.config
    }
}

impl Drop for TemporaryConfig<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            *self.config = saved;
            debug!("temporary config restored");
        }
    }
}
