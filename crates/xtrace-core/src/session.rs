use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use xtrace_map::TraceIndex;
use xtrace_model::{ProducingLocation, TraceEntry, TracedIssue};

use crate::pipeline::PipelineRun;

/// Latest pipeline run per document, owned by the caller.
///
/// Editors keep one of these for the lifetime of a workspace so that later
/// requests (diagnostics refresh, "jump to cause") can reuse the last run
/// for a document without re-running the transformation.
#[derive(Debug, Clone, Default)]
pub struct TraceSession {
    runs: BTreeMap<PathBuf, PipelineRun>,
}

impl TraceSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `run` as the latest for `key`, returning the one it replaces.
    pub fn record(&mut self, key: impl Into<PathBuf>, run: PipelineRun) -> Option<PipelineRun> {
        let key = key.into();
        debug!(
            document = %key.display(),
            issues = run.issues.len(),
            entries = run.entries.len(),
            "recorded pipeline run"
        );
        self.runs.insert(key, run)
    }

    pub fn run_for(&self, key: &Path) -> Option<&PipelineRun> {
        self.runs.get(key)
    }

    /// Traced issues of the latest run; empty when the document is unknown.
    pub fn issues_for(&self, key: &Path) -> &[TracedIssue] {
        self.runs
            .get(key)
            .map(|run| run.issues.as_slice())
            .unwrap_or_default()
    }

    /// Program location that produced `output_line` of the document's clean
    /// output, via the nearest preceding trace entry.
    pub fn producing_location(&self, key: &Path, output_line: usize) -> Option<ProducingLocation> {
        let run = self.runs.get(key)?;
        TraceIndex::new(&run.entries)
            .nearest_preceding(output_line)
            .map(TraceEntry::producing_location)
    }

    pub fn forget(&mut self, key: &Path) -> Option<PipelineRun> {
        self.runs.remove(key)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Path> {
        self.runs.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with_entries(lines: &[(usize, usize)]) -> PipelineRun {
        PipelineRun {
            clean_text: String::new(),
            entries: lines
                .iter()
                .map(|&(output_line, source_line)| TraceEntry {
                    output_line,
                    source_file: PathBuf::from("/work/map.xsl"),
                    source_line,
                    element_name: "cbc:ID".to_string(),
                })
                .collect(),
            issues: Vec::new(),
        }
    }

    #[test]
    fn record_replaces_and_forget_removes() {
        let mut session = TraceSession::new();
        let doc = Path::new("/work/in.xml");
        assert!(session.record(doc, run_with_entries(&[(1, 3)])).is_none());
        let previous = session.record(doc, run_with_entries(&[(3, 10), (7, 20), (12, 30)]));
        assert_eq!(previous.map(|run| run.entries.len()), Some(1));
        assert_eq!(session.len(), 1);

        let cause = session.producing_location(doc, 9).unwrap();
        assert_eq!(cause.line, 20);
        assert_eq!(session.producing_location(doc, 2), None);

        assert!(session.forget(doc).is_some());
        assert!(session.is_empty());
        assert!(session.issues_for(doc).is_empty());
        assert!(session.run_for(doc).is_none());
    }

    #[test]
    fn documents_are_independent() {
        let mut session = TraceSession::new();
        session.record("/a.xml", run_with_entries(&[(1, 1)]));
        session.record("/b.xml", run_with_entries(&[(1, 2)]));
        assert_eq!(
            session.producing_location(Path::new("/a.xml"), 5).map(|p| p.line),
            Some(1)
        );
        assert_eq!(
            session.producing_location(Path::new("/b.xml"), 5).map(|p| p.line),
            Some(2)
        );
        assert_eq!(session.documents().count(), 2);
    }
}
