//! Shared fixture: a synthetic minimal JDK on the bootclasspath.

use std::rc::Rc;

use javelin_binder::{bind, BindError, BindOptions, BoundUnits, SourceFile};
use javelin_classpath::Classpath;

pub struct Fixture {
    _dir: tempfile::TempDir,
    pub boot: Rc<Classpath>,
}

impl Fixture {
    pub fn new() -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let jar = dir.path().join("jdk.jar");
        javelin_testkit::write_minimal_jdk_jar(&jar).expect("write jdk jar");
        let boot = Rc::new(Classpath::open(&[jar]).expect("open jdk jar"));
        Fixture { _dir: dir, boot }
    }

    pub fn bind(&self, sources: &[(&str, &str)]) -> Result<BoundUnits, BindError> {
        let sources: Vec<SourceFile> = sources
            .iter()
            .map(|(path, text)| SourceFile {
                path: path.to_string(),
                text: text.to_string(),
            })
            .collect();
        let empty = Rc::new(Classpath::open(&[]).expect("empty classpath"));
        bind(&sources, self.boot.clone(), empty, &BindOptions::default())
    }

    pub fn bind_ok(&self, sources: &[(&str, &str)]) -> BoundUnits {
        match self.bind(sources) {
            Ok(units) => units,
            Err(err) => panic!("expected successful bind, got:\n{err}"),
        }
    }

    pub fn bind_err(&self, sources: &[(&str, &str)]) -> BindError {
        match self.bind(sources) {
            Ok(_) => panic!("expected bind error"),
            Err(err) => err,
        }
    }
}
