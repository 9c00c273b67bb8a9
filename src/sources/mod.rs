pub mod example_directory;

use std::sync::Arc;

use crate::source::Source;

pub use example_directory::ExampleDirectory;

pub fn builtin() -> Vec<Arc<dyn Source>> {
    vec![
        Arc::new(ExampleDirectory::new()),
        // Register further sources here.
    ]
}
